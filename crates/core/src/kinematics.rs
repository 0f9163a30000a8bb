//! Bounded point kinematics shared by the particle and blob fields.
//!
//! One [`Kinematics::step`] integrates position by velocity, reflects
//! velocity off the nominal bounds, clamps position into the overscan range,
//! applies friction and re-energizes bodies that have slowed below the
//! configured floor. Forces (pointer attraction) are applied by the caller
//! to `Body::vel` before stepping.

use glam::DVec2;

use crate::prng::Xorshift64;

/// Speeds below this are treated as standing still when picking a heading.
const STILL_EPSILON: f64 = 1e-12;
/// Weight of the random component when biasing an impulse along the heading.
const IMPULSE_JITTER: f64 = 0.5;

/// A moving point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Velocity being blended toward during a below-floor episode.
    pub recovery_target: Option<DVec2>,
}

impl Body {
    pub fn new(pos: DVec2, vel: DVec2) -> Self {
        Self {
            pos,
            vel,
            recovery_target: None,
        }
    }

    pub fn speed(&self) -> f64 {
        self.vel.length()
    }
}

/// Axis-aligned nominal bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// `[0, width] × [0, height]`.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(DVec2::ZERO, DVec2::new(width, height))
    }

    /// Percentage space, `[0, 100]` on both axes.
    pub fn percent() -> Self {
        Self::from_size(100.0, 100.0)
    }

    /// True when `p` lies inside the bounds extended by `overscan`.
    pub fn contains(&self, p: DVec2, overscan: f64) -> bool {
        let lo = self.min - DVec2::splat(overscan);
        let hi = self.max + DVec2::splat(overscan);
        p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y
    }
}

/// How a body below the speed floor is brought back up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recovery {
    /// Add an impulse of magnitude `strength · U(0.5, 1)` every below-floor
    /// tick, pointed along the current heading with some random spread.
    Impulse { strength: f64 },
    /// Blend velocity toward a target picked once per below-floor episode,
    /// with magnitude in `[min_factor, max_factor] × floor`.
    Blend {
        rate: f64,
        min_factor: f64,
        max_factor: f64,
    },
}

/// Integration settings for one family of bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub bounds: Bounds,
    /// Allowed excursion beyond `bounds`; positions are clamped to it.
    pub overscan: f64,
    /// Fraction of speed kept by a reflected velocity component.
    pub restitution: f64,
    /// Per-tick velocity multiplier.
    pub friction: f64,
    /// Minimum speed; 0 disables recovery.
    pub floor: f64,
    pub recovery: Recovery,
}

impl Kinematics {
    /// Same settings over different bounds.
    pub fn with_bounds(self, bounds: Bounds) -> Self {
        Self { bounds, ..self }
    }

    /// Advances `body` by one tick.
    pub fn step(&self, body: &mut Body, rng: &mut Xorshift64) {
        body.pos += body.vel;
        self.reflect(body);
        self.clamp(body);
        body.vel *= self.friction;
        self.recover(body, rng);
    }

    /// Inverts (and damps) each velocity component that is carrying the body
    /// further outside the nominal bounds. The recovery target is mirrored
    /// with it so an ongoing recovery does not steer back into the wall.
    fn reflect(&self, body: &mut Body) {
        let Bounds { min, max } = self.bounds;
        for axis in 0..2 {
            let outward = (body.pos[axis] < min[axis] && body.vel[axis] < 0.0)
                || (body.pos[axis] > max[axis] && body.vel[axis] > 0.0);
            if outward {
                body.vel[axis] = -body.vel[axis] * self.restitution;
                if let Some(target) = body.recovery_target.as_mut() {
                    target[axis] = -target[axis];
                }
            }
        }
    }

    fn clamp(&self, body: &mut Body) {
        let lo = self.bounds.min - DVec2::splat(self.overscan);
        let hi = self.bounds.max + DVec2::splat(self.overscan);
        // max/min rather than clamp: degenerate bounds must not panic.
        body.pos = body.pos.max(lo).min(hi);
    }

    fn recover(&self, body: &mut Body, rng: &mut Xorshift64) {
        let speed = body.speed();
        if speed >= self.floor {
            body.recovery_target = None;
            return;
        }
        match self.recovery {
            Recovery::Impulse { strength } => {
                let heading = if speed > STILL_EPSILON {
                    body.vel / speed
                } else {
                    rng.next_direction()
                };
                let direction = (heading + rng.next_direction() * IMPULSE_JITTER)
                    .try_normalize()
                    .unwrap_or(heading);
                body.vel += direction * strength * rng.next_range(0.5, 1.0);
            }
            Recovery::Blend {
                rate,
                min_factor,
                max_factor,
            } => {
                let floor = self.floor;
                let target = *body.recovery_target.get_or_insert_with(|| {
                    rng.next_direction() * floor * rng.next_range(min_factor, max_factor)
                });
                body.vel += (target - body.vel) * rate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_like(speed: f64) -> Kinematics {
        Kinematics {
            bounds: Bounds::from_size(100.0, 100.0),
            overscan: 0.0,
            restitution: 1.0,
            friction: 0.99,
            floor: 0.5 * speed,
            recovery: Recovery::Impulse {
                strength: 0.1 * speed,
            },
        }
    }

    fn blob_like(speed: f64) -> Kinematics {
        Kinematics {
            bounds: Bounds::percent(),
            overscan: 10.0,
            restitution: 0.9,
            friction: 0.985,
            floor: 0.05 * speed,
            recovery: Recovery::Blend {
                rate: 0.05,
                min_factor: 2.0,
                max_factor: 3.0,
            },
        }
    }

    #[test]
    fn integrates_then_applies_friction() {
        let k = Kinematics {
            floor: 0.0,
            ..particle_like(1.0)
        };
        let mut body = Body::new(DVec2::new(10.0, 10.0), DVec2::new(2.0, -1.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert_eq!(body.pos, DVec2::new(12.0, 9.0));
        assert!((body.vel - DVec2::new(1.98, -0.99)).length() < 1e-12);
    }

    #[test]
    fn outward_component_is_reflected_and_damped() {
        let k = Kinematics {
            floor: 0.0,
            ..blob_like(1.0)
        };
        let mut body = Body::new(DVec2::new(105.0, 50.0), DVec2::new(1.0, 0.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert!(body.vel.x < 0.0);
        assert!((body.vel.x + 0.9 * 0.985).abs() < 1e-12);
        assert!(body.pos.x <= 110.0);
    }

    #[test]
    fn inward_component_outside_bounds_is_not_flipped() {
        let k = Kinematics {
            floor: 0.0,
            ..blob_like(1.0)
        };
        let mut body = Body::new(DVec2::new(106.0, 50.0), DVec2::new(-0.5, 0.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert!(body.vel.x < 0.0);
        assert_eq!(body.pos.x, 105.5);
    }

    #[test]
    fn position_clamped_to_overscan() {
        let k = Kinematics {
            floor: 0.0,
            ..blob_like(1.0)
        };
        let mut body = Body::new(DVec2::new(109.0, -9.0), DVec2::new(5.0, -5.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert_eq!(body.pos, DVec2::new(110.0, -10.0));
    }

    #[test]
    fn zero_overscan_clamps_to_edges() {
        let k = particle_like(1.0);
        let mut body = Body::new(DVec2::new(99.0, 1.0), DVec2::new(3.0, -3.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert_eq!(body.pos, DVec2::new(100.0, 0.0));
        assert!(body.vel.x < 0.0 && body.vel.y > 0.0);
    }

    #[test]
    fn degenerate_bounds_do_not_panic() {
        let k = particle_like(1.0).with_bounds(Bounds::from_size(-5.0, 0.0));
        let mut body = Body::new(DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert!(body.pos.is_finite());
    }

    #[test]
    fn impulse_kicks_a_still_body() {
        let k = particle_like(1.0);
        let mut body = Body::new(DVec2::new(50.0, 50.0), DVec2::ZERO);
        k.step(&mut body, &mut Xorshift64::new(9));
        let s = body.speed();
        assert!((0.05..=0.1).contains(&s), "speed {s}");
    }

    #[test]
    fn impulse_speeds_up_along_heading() {
        let k = particle_like(1.0);
        let mut rng = Xorshift64::new(4);
        for _ in 0..100 {
            let mut body = Body::new(DVec2::new(50.0, 50.0), DVec2::new(0.2, 0.0));
            k.step(&mut body, &mut rng);
            assert!(body.speed() > 0.2 * 0.99, "speed {}", body.speed());
        }
    }

    #[test]
    fn blend_target_is_kept_during_episode_and_cleared_after() {
        let k = blob_like(1.0);
        let mut rng = Xorshift64::new(5);
        let mut body = Body::new(DVec2::new(50.0, 50.0), DVec2::ZERO);
        k.step(&mut body, &mut rng);
        let target = body.recovery_target.expect("target picked below floor");
        let magnitude = target.length();
        assert!((0.1..=0.15).contains(&magnitude), "target magnitude {magnitude}");
        k.step(&mut body, &mut rng);
        assert_eq!(body.recovery_target, Some(target));
        for _ in 0..200 {
            k.step(&mut body, &mut rng);
            if body.speed() >= k.floor {
                break;
            }
        }
        assert!(body.speed() >= k.floor);
        assert_eq!(body.recovery_target, None);
    }

    #[test]
    fn zero_floor_disables_recovery() {
        let k = Kinematics {
            floor: 0.0,
            ..particle_like(0.0)
        };
        let mut body = Body::new(DVec2::new(1.0, 1.0), DVec2::ZERO);
        k.step(&mut body, &mut Xorshift64::new(1));
        assert_eq!(body.vel, DVec2::ZERO);
    }

    #[test]
    fn reflection_mirrors_recovery_target() {
        let k = blob_like(1.0);
        let mut body = Body::new(DVec2::new(100.0, 50.0), DVec2::new(0.01, 0.0));
        body.recovery_target = Some(DVec2::new(0.12, 0.0));
        k.step(&mut body, &mut Xorshift64::new(1));
        assert!(body.recovery_target.is_some_and(|t| t.x < 0.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn longest_below_floor_run(k: &Kinematics, body: &mut Body, rng: &mut Xorshift64, ticks: usize) -> usize {
            let mut run = 0;
            let mut longest = 0;
            for _ in 0..ticks {
                k.step(body, rng);
                if body.speed() < k.floor {
                    run += 1;
                    longest = longest.max(run);
                } else {
                    run = 0;
                }
            }
            longest
        }

        proptest! {
            #[test]
            fn bodies_stay_within_overscan(
                seed: u64,
                x in -20.0_f64..120.0,
                y in -20.0_f64..120.0,
                vx in -8.0_f64..8.0,
                vy in -8.0_f64..8.0,
            ) {
                let mut rng = Xorshift64::new(seed);
                for k in [particle_like(2.0), blob_like(2.0)] {
                    let mut body = Body::new(DVec2::new(x, y), DVec2::new(vx, vy));
                    for _ in 0..300 {
                        k.step(&mut body, &mut rng);
                        prop_assert!(k.bounds.contains(body.pos, k.overscan), "{:?}", body.pos);
                    }
                }
            }

            #[test]
            fn impulse_recovery_is_bounded(seed: u64, speed in 0.1_f64..5.0) {
                let k = particle_like(speed);
                let mut rng = Xorshift64::new(seed);
                let mut body = Body::new(DVec2::new(50.0, 50.0), DVec2::ZERO);
                prop_assert!(longest_below_floor_run(&k, &mut body, &mut rng, 1000) <= 60);
            }

            #[test]
            fn blend_recovery_is_bounded(seed: u64, speed in 0.1_f64..5.0) {
                let k = blob_like(speed);
                let mut rng = Xorshift64::new(seed);
                let mut body = Body::new(DVec2::new(50.0, 50.0), DVec2::ZERO);
                prop_assert!(longest_below_floor_run(&k, &mut body, &mut rng, 1000) <= 120);
            }
        }
    }
}
