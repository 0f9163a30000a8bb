#![deny(unsafe_code)]
//! Particle network effect.
//!
//! A fixed number of points drift across the surface, bouncing off its
//! edges. Every pair closer than the connection distance is joined by an
//! edge whose opacity falls off linearly with distance. When interactive,
//! particles within the pointer radius are pulled toward the pointer.
//!
//! Particle positions are in surface pixels. The field is placed lazily on
//! the first tick with a non-empty surface, so it always fills the surface it
//! is actually shown on.

use backdrop_core::color::Rgba;
use backdrop_core::kinematics::{Body, Bounds, Kinematics, Recovery};
use backdrop_core::params::{param_bool, param_color, param_magnitude, param_usize};
use backdrop_core::pointer::PointerSource;
use backdrop_core::prng::Xorshift64;
use backdrop_core::surface::{Rect, Surface};
use backdrop_core::Effect;
use glam::DVec2;
use serde_json::{json, Value};

/// Registry name.
pub const NAME: &str = "particle-network";

const DEFAULT_COUNT: usize = 100;
const DEFAULT_SPEED: f64 = 0.5;
const DEFAULT_PARTICLE_SIZE: f64 = 2.0;
const DEFAULT_CONNECTION_DISTANCE: f64 = 150.0;
const DEFAULT_POINTER_RADIUS: f64 = 150.0;
const DEFAULT_PARTICLE_COLOR: Rgba = Rgba::new(99.0 / 255.0, 102.0 / 255.0, 241.0 / 255.0, 0.8);
const DEFAULT_LINE_COLOR: Rgba = Rgba::new(99.0 / 255.0, 102.0 / 255.0, 241.0 / 255.0, 0.2);

/// Acceleration at the pointer itself, falling linearly to 0 at the radius.
const ATTRACTION_GAIN: f64 = 0.2;
const FRICTION: f64 = 0.99;
/// Minimum speed as a fraction of the `speed` parameter.
const FLOOR_FACTOR: f64 = 0.5;
/// Re-energizing impulse strength as a fraction of the `speed` parameter.
const IMPULSE_FACTOR: f64 = 0.1;
/// Edge alpha multiplier applied on top of the distance falloff.
const LINE_OPACITY: f64 = 0.5;
const LINE_WIDTH: f64 = 1.0;

/// Construction parameters for [`ParticleField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleParams {
    pub count: usize,
    /// Initial velocity scale; also sets the speed floor.
    pub speed: f64,
    /// Disc radius in pixels.
    pub particle_size: f64,
    /// Maximum separation, in pixels, at which two particles are joined.
    pub connection_distance: f64,
    /// Radius of pointer attraction in pixels.
    pub pointer_radius: f64,
    pub interactive: bool,
    pub particle_color: Rgba,
    pub line_color: Rgba,
    /// Fill drawn under everything; transparent by default.
    pub background: Rgba,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            speed: DEFAULT_SPEED,
            particle_size: DEFAULT_PARTICLE_SIZE,
            connection_distance: DEFAULT_CONNECTION_DISTANCE,
            pointer_radius: DEFAULT_POINTER_RADIUS,
            interactive: true,
            particle_color: DEFAULT_PARTICLE_COLOR,
            line_color: DEFAULT_LINE_COLOR,
            background: Rgba::TRANSPARENT,
        }
    }
}

impl ParticleParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        Self {
            count: param_usize(params, "particle_count", DEFAULT_COUNT),
            speed: param_magnitude(params, "speed", DEFAULT_SPEED),
            particle_size: param_magnitude(params, "particle_size", DEFAULT_PARTICLE_SIZE),
            connection_distance: param_magnitude(
                params,
                "connection_distance",
                DEFAULT_CONNECTION_DISTANCE,
            ),
            pointer_radius: param_magnitude(params, "pointer_radius", DEFAULT_POINTER_RADIUS),
            interactive: param_bool(params, "interactive", true),
            particle_color: param_color(params, "particle_color", DEFAULT_PARTICLE_COLOR),
            line_color: param_color(params, "line_color", DEFAULT_LINE_COLOR),
            background: param_color(params, "background", Rgba::TRANSPARENT),
        }
    }

    fn kinematics(&self) -> Kinematics {
        Kinematics {
            bounds: Bounds::from_size(0.0, 0.0),
            overscan: 0.0,
            restitution: 1.0,
            friction: FRICTION,
            floor: self.speed * FLOOR_FACTOR,
            recovery: Recovery::Impulse {
                strength: self.speed * IMPULSE_FACTOR,
            },
        }
    }
}

/// One point of the network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub body: Body,
    pub radius: f64,
}

impl Particle {
    pub fn new(pos: DVec2, vel: DVec2, radius: f64) -> Self {
        Self {
            body: Body::new(pos, vel),
            radius,
        }
    }

    pub fn pos(&self) -> DVec2 {
        self.body.pos
    }
}

/// An edge between particles `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// Distance falloff in [0, 1], before the line-opacity factor.
    pub opacity: f64,
}

/// Edge opacity for two particles `distance` apart.
///
/// `1 − distance / max_distance`, exactly 1 at distance 0 and exactly 0 at
/// or beyond `max_distance`. A non-positive `max_distance` links nothing.
pub fn connection_opacity(distance: f64, max_distance: f64) -> f64 {
    let linked = max_distance > 0.0 && distance < max_distance;
    if !linked {
        return 0.0;
    }
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Waiting for the first non-empty surface.
    Uninitialized,
    Running,
    Disposed,
}

/// The particle network.
pub struct ParticleField {
    params: ParticleParams,
    kinematics: Kinematics,
    particles: Vec<Particle>,
    rng: Xorshift64,
    pointer: Option<Box<dyn PointerSource>>,
    state: FieldState,
}

impl ParticleField {
    /// Creates an uninitialized field; particles are placed on the first
    /// tick with a non-empty surface.
    pub fn new(params: ParticleParams, seed: u64) -> Self {
        tracing::debug!(count = params.count, seed, "particle field created");
        Self {
            kinematics: params.kinematics(),
            params,
            particles: Vec::new(),
            rng: Xorshift64::new(seed),
            pointer: None,
            state: FieldState::Uninitialized,
        }
    }

    pub fn from_json(params: &Value, seed: u64) -> Self {
        Self::new(ParticleParams::from_json(params), seed)
    }

    /// Creates a running field from explicit particles.
    ///
    /// `params.count` is replaced by the number of particles given.
    pub fn from_particles(params: ParticleParams, seed: u64, particles: Vec<Particle>) -> Self {
        let params = ParticleParams {
            count: particles.len(),
            ..params
        };
        let mut field = Self::new(params, seed);
        field.particles = particles;
        field.state = FieldState::Running;
        field
    }

    /// Places `count` particles uniformly within `width × height`, with each
    /// velocity component uniform in `±speed / 2`.
    pub fn init(&mut self, width: f64, height: f64) {
        let speed = self.params.speed;
        let radius = self.params.particle_size;
        let rng = &mut self.rng;
        self.particles = (0..self.params.count)
            .map(|_| {
                let pos = DVec2::new(rng.next_f64() * width, rng.next_f64() * height);
                let vel = rng.next_centered_vec() * speed;
                Particle::new(pos, vel, radius)
            })
            .collect();
        self.state = FieldState::Running;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn config(&self) -> &ParticleParams {
        &self.params
    }

    /// All edges of the current frame.
    pub fn connections(&self) -> Vec<Connection> {
        let max = self.params.connection_distance;
        let mut edges = Vec::new();
        if max <= 0.0 {
            return edges;
        }
        for (a, pa) in self.particles.iter().enumerate() {
            for (offset, pb) in self.particles[a + 1..].iter().enumerate() {
                let opacity = connection_opacity(pa.pos().distance(pb.pos()), max);
                if opacity > 0.0 {
                    edges.push(Connection {
                        a,
                        b: a + 1 + offset,
                        opacity,
                    });
                }
            }
        }
        edges
    }

    fn attract(&self, body: &mut Body, pointer: DVec2) {
        let radius = self.params.pointer_radius;
        let delta = pointer - body.pos;
        let distance = delta.length();
        if distance > 0.0 && distance < radius {
            let force = (radius - distance) / radius;
            body.vel += delta / distance * force * ATTRACTION_GAIN;
        }
    }
}

impl Effect for ParticleField {
    fn name(&self) -> &'static str {
        NAME
    }

    fn update(&mut self, bounds: Rect) {
        if self.state == FieldState::Disposed || bounds.is_empty() {
            return;
        }
        if self.state == FieldState::Uninitialized {
            self.init(bounds.width, bounds.height);
        }
        let pointer = if self.params.interactive {
            self.pointer
                .as_mut()
                .and_then(|p| p.read())
                .map(|s| s.local(&bounds))
        } else {
            None
        };
        let kinematics = self
            .kinematics
            .with_bounds(Bounds::from_size(bounds.width, bounds.height));

        let mut particles = std::mem::take(&mut self.particles);
        for particle in &mut particles {
            if let Some(p) = pointer {
                self.attract(&mut particle.body, p);
            }
            kinematics.step(&mut particle.body, &mut self.rng);
        }
        self.particles = particles;
    }

    fn render(&self, surface: &mut dyn Surface) {
        if self.state == FieldState::Disposed || surface.bounds().is_empty() {
            return;
        }
        surface.clear(self.params.background);

        for edge in self.connections() {
            let color = self.params.line_color.fade(edge.opacity * LINE_OPACITY);
            surface.stroke_line(
                self.particles[edge.a].pos(),
                self.particles[edge.b].pos(),
                LINE_WIDTH,
                color,
            );
        }
        for particle in &self.particles {
            surface.fill_circle(particle.pos(), particle.radius, self.params.particle_color);
        }
    }

    fn attach_pointer(&mut self, source: Box<dyn PointerSource>) -> bool {
        if !self.params.interactive || self.state == FieldState::Disposed {
            return false;
        }
        self.pointer = Some(source);
        true
    }

    fn params(&self) -> Value {
        json!({
            "particle_count": self.params.count,
            "speed": self.params.speed,
            "particle_size": self.params.particle_size,
            "connection_distance": self.params.connection_distance,
            "pointer_radius": self.params.pointer_radius,
            "interactive": self.params.interactive,
            "particle_color": self.params.particle_color.to_css(),
            "line_color": self.params.line_color.to_css(),
            "background": self.params.background.to_css(),
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "particle_count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 0,
                "max": 1000,
                "description": "Number of particles"
            },
            "speed": {
                "type": "number",
                "default": DEFAULT_SPEED,
                "min": 0.0,
                "max": 10.0,
                "description": "Initial velocity scale in px per tick; half of it is the speed floor"
            },
            "particle_size": {
                "type": "number",
                "default": DEFAULT_PARTICLE_SIZE,
                "min": 0.0,
                "max": 20.0,
                "description": "Particle disc radius in px"
            },
            "connection_distance": {
                "type": "number",
                "default": DEFAULT_CONNECTION_DISTANCE,
                "min": 0.0,
                "max": 1000.0,
                "description": "Maximum distance in px at which particles are joined"
            },
            "pointer_radius": {
                "type": "number",
                "default": DEFAULT_POINTER_RADIUS,
                "min": 0.0,
                "max": 1000.0,
                "description": "Radius of pointer attraction in px"
            },
            "interactive": {
                "type": "boolean",
                "default": true,
                "description": "Attract particles toward the pointer"
            },
            "particle_color": {
                "type": "color",
                "default": DEFAULT_PARTICLE_COLOR.to_css(),
                "description": "Particle fill color"
            },
            "line_color": {
                "type": "color",
                "default": DEFAULT_LINE_COLOR.to_css(),
                "description": "Edge stroke color before distance falloff"
            },
            "background": {
                "type": "color",
                "default": Rgba::TRANSPARENT.to_css(),
                "description": "Background fill"
            }
        })
    }

    fn dispose(&mut self) {
        self.pointer = None;
        self.state = FieldState::Disposed;
        tracing::debug!(count = self.particles.len(), "particle field disposed");
    }

    fn is_disposed(&self) -> bool {
        self.state == FieldState::Disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backdrop_core::pointer::{PointerHub, ScriptedPointer};
    use backdrop_core::surface::{DrawCommand, RecordingSurface};

    fn still(params: ParticleParams, positions: &[(f64, f64)]) -> ParticleField {
        let particles = positions
            .iter()
            .map(|&(x, y)| Particle::new(DVec2::new(x, y), DVec2::ZERO, 2.0))
            .collect();
        ParticleField::from_particles(params, 1, particles)
    }

    fn quiet() -> ParticleParams {
        ParticleParams {
            interactive: false,
            ..ParticleParams::default()
        }
    }

    #[test]
    fn from_json_uses_defaults_for_empty_json() {
        assert_eq!(ParticleParams::from_json(&json!({})), ParticleParams::default());
    }

    #[test]
    fn from_json_extracts_custom_values() {
        let p = ParticleParams::from_json(&json!({
            "particle_count": 12,
            "speed": 1.5,
            "connection_distance": 80,
            "interactive": false,
            "line_color": "#ffffff"
        }));
        assert_eq!(p.count, 12);
        assert_eq!(p.speed, 1.5);
        assert_eq!(p.connection_distance, 80.0);
        assert!(!p.interactive);
        assert_eq!(p.line_color, Rgba::WHITE);
    }

    #[test]
    fn from_json_rejects_negative_and_non_numeric_scalars() {
        let p = ParticleParams::from_json(&json!({
            "speed": -2.0,
            "pointer_radius": "wide",
            "particle_count": -5
        }));
        assert_eq!(p.speed, DEFAULT_SPEED);
        assert_eq!(p.pointer_radius, DEFAULT_POINTER_RADIUS);
        assert_eq!(p.count, DEFAULT_COUNT);
    }

    #[test]
    fn params_round_trip_through_json() {
        let field = ParticleField::from_json(&json!({"particle_count": 7, "speed": 2.0}), 1);
        let again = ParticleParams::from_json(&field.params());
        assert_eq!(again.count, 7);
        assert_eq!(again.speed, 2.0);
        assert_eq!(again.particle_color, DEFAULT_PARTICLE_COLOR);
    }

    #[test]
    fn param_schema_covers_every_param() {
        let field = ParticleField::new(ParticleParams::default(), 1);
        let schema = field.param_schema();
        for key in field.params().as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
            assert!(schema[key].get("default").is_some(), "{key} missing default");
        }
    }

    #[test]
    fn first_non_empty_tick_initializes_within_bounds() {
        let mut field = ParticleField::new(quiet(), 42);
        field.update(Rect::sized(0.0, 0.0));
        assert_eq!(field.state(), FieldState::Uninitialized);
        assert!(field.particles().is_empty());

        field.init(320.0, 200.0);
        assert_eq!(field.particles().len(), DEFAULT_COUNT);
        for p in field.particles() {
            assert!((0.0..320.0).contains(&p.pos().x));
            assert!((0.0..200.0).contains(&p.pos().y));
            assert!(p.body.vel.x.abs() <= DEFAULT_SPEED / 2.0);
            assert!(p.body.vel.y.abs() <= DEFAULT_SPEED / 2.0);
            assert_eq!(p.radius, DEFAULT_PARTICLE_SIZE);
        }
    }

    #[test]
    fn count_never_changes() {
        let mut field = ParticleField::new(quiet(), 3);
        for _ in 0..50 {
            field.update(Rect::sized(100.0, 100.0));
            assert_eq!(field.particles().len(), DEFAULT_COUNT);
        }
    }

    #[test]
    fn edge_opacity_half_at_half_distance() {
        let params = ParticleParams {
            connection_distance: 100.0,
            ..quiet()
        };
        let mut field = still(params, &[(0.0, 0.0), (50.0, 0.0)]);
        field.update(Rect::sized(200.0, 200.0));
        let edges = field.connections();
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].a, edges[0].b), (0, 1));
        assert!((edges[0].opacity - 0.5).abs() < 1e-12);
    }

    #[test]
    fn render_draws_edges_before_particles() {
        let params = ParticleParams {
            connection_distance: 100.0,
            ..quiet()
        };
        let field = still(params, &[(0.0, 0.0), (50.0, 0.0)]);
        let mut surface = RecordingSurface::new(Rect::sized(200.0, 200.0));
        field.render(&mut surface);
        let commands = surface.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0], DrawCommand::Clear(Rgba::TRANSPARENT));
        match &commands[1] {
            DrawCommand::Line { color, width, .. } => {
                assert!((color.a - 0.2 * 0.5 * 0.5).abs() < 1e-12);
                assert_eq!(*width, 1.0);
            }
            other => panic!("expected a line, got {other:?}"),
        }
        assert!(matches!(commands[2], DrawCommand::Circle { .. }));
        assert!(matches!(commands[3], DrawCommand::Circle { .. }));
    }

    #[test]
    fn render_skips_zero_area_surface() {
        let field = still(quiet(), &[(0.0, 0.0), (5.0, 0.0)]);
        let mut surface = RecordingSurface::new(Rect::sized(0.0, 0.0));
        field.render(&mut surface);
        assert_eq!(surface.draw_call_count(), 0);
    }

    #[test]
    fn zero_connection_distance_links_nothing() {
        let params = ParticleParams {
            connection_distance: 0.0,
            ..quiet()
        };
        let field = still(params, &[(0.0, 0.0), (0.0, 0.0)]);
        assert!(field.connections().is_empty());
    }

    #[test]
    fn zero_count_field_runs_empty() {
        let params = ParticleParams { count: 0, ..quiet() };
        let mut field = ParticleField::new(params, 1);
        field.update(Rect::sized(50.0, 50.0));
        let mut surface = RecordingSurface::new(Rect::sized(50.0, 50.0));
        field.render(&mut surface);
        assert_eq!(surface.draw_call_count(), 1);
    }

    #[test]
    fn pointer_pulls_particle_toward_it() {
        let mut field = still(ParticleParams::default(), &[(100.0, 100.0)]);
        assert!(field.attach_pointer(Box::new(ScriptedPointer::fixed(150.0, 100.0))));
        field.update(Rect::sized(400.0, 400.0));
        assert!(field.particles()[0].body.vel.x > 0.0);
    }

    #[test]
    fn pointer_is_converted_with_current_rect_origin() {
        let mut offset = still(ParticleParams::default(), &[(100.0, 100.0)]);
        offset.attach_pointer(Box::new(ScriptedPointer::fixed(250.0, 130.0)));
        offset.update(Rect::new(100.0, 30.0, 400.0, 400.0));

        let mut origin = still(ParticleParams::default(), &[(100.0, 100.0)]);
        origin.attach_pointer(Box::new(ScriptedPointer::fixed(150.0, 100.0)));
        origin.update(Rect::sized(400.0, 400.0));

        assert_eq!(offset.particles(), origin.particles());
    }

    #[test]
    fn pointer_on_top_of_particle_does_not_produce_nan() {
        let mut field = still(ParticleParams::default(), &[(100.0, 100.0)]);
        field.attach_pointer(Box::new(ScriptedPointer::fixed(100.0, 100.0)));
        field.update(Rect::sized(400.0, 400.0));
        assert!(field.particles()[0].body.vel.is_finite());
    }

    #[test]
    fn zero_pointer_radius_disables_attraction() {
        let params = ParticleParams {
            pointer_radius: 0.0,
            ..ParticleParams::default()
        };
        let mut with_pointer = still(params, &[(100.0, 100.0)]);
        with_pointer.attach_pointer(Box::new(ScriptedPointer::fixed(101.0, 100.0)));
        let mut without = still(params, &[(100.0, 100.0)]);
        for _ in 0..10 {
            with_pointer.update(Rect::sized(400.0, 400.0));
            without.update(Rect::sized(400.0, 400.0));
        }
        assert_eq!(with_pointer.particles(), without.particles());
    }

    #[test]
    fn non_interactive_field_attaches_no_listener() {
        let hub = PointerHub::new();
        let mut field = ParticleField::new(quiet(), 1);
        assert!(!field.attach_pointer(Box::new(hub.subscribe())));
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn dispose_detaches_and_freezes() {
        let hub = PointerHub::new();
        let mut field = ParticleField::new(ParticleParams::default(), 8);
        field.attach_pointer(Box::new(hub.subscribe()));
        field.update(Rect::sized(300.0, 300.0));
        assert_eq!(hub.listener_count(), 1);

        field.dispose();
        assert!(field.is_disposed());
        assert_eq!(hub.listener_count(), 0);

        let frozen = field.particles().to_vec();
        hub.dispatch(10.0, 10.0);
        field.update(Rect::sized(300.0, 300.0));
        assert_eq!(field.particles(), frozen.as_slice());

        let mut surface = RecordingSurface::new(Rect::sized(300.0, 300.0));
        field.render(&mut surface);
        assert_eq!(surface.draw_call_count(), 0);
        assert!(!field.attach_pointer(Box::new(hub.subscribe())));
    }

    #[test]
    fn same_seed_and_pointer_script_replay_identically() {
        let path: Vec<(f64, f64)> = (0..100).map(|i| (i as f64 * 3.0, 200.0 - i as f64)).collect();
        let mut a = ParticleField::new(ParticleParams::default(), 77);
        let mut b = ParticleField::new(ParticleParams::default(), 77);
        a.attach_pointer(Box::new(ScriptedPointer::path(path.clone())));
        b.attach_pointer(Box::new(ScriptedPointer::path(path)));
        for tick in 0..100 {
            a.update(Rect::sized(300.0, 200.0));
            b.update(Rect::sized(300.0, 200.0));
            assert_eq!(a.particles(), b.particles(), "diverged at tick {tick}");
        }
    }

    #[test]
    fn different_seeds_differ() {
        let mut a = ParticleField::new(quiet(), 1);
        let mut b = ParticleField::new(quiet(), 2);
        a.update(Rect::sized(300.0, 200.0));
        b.update(Rect::sized(300.0, 200.0));
        assert_ne!(a.particles(), b.particles());
    }

    #[test]
    fn no_particle_stays_below_floor_for_long() {
        let params = ParticleParams {
            count: 40,
            speed: 1.0,
            ..quiet()
        };
        let floor = params.speed * FLOOR_FACTOR;
        let mut field = ParticleField::new(params, 2024);
        let mut runs = vec![0usize; params.count];
        for _ in 0..600 {
            field.update(Rect::sized(200.0, 150.0));
            for (run, p) in runs.iter_mut().zip(field.particles()) {
                if p.body.speed() < floor {
                    *run += 1;
                    assert!(*run <= 60, "particle below floor for {run} ticks");
                } else {
                    *run = 0;
                }
            }
        }
    }

    #[test]
    fn effect_is_object_safe() {
        let mut effect: Box<dyn Effect> = Box::new(ParticleField::new(quiet(), 1));
        effect.update(Rect::sized(64.0, 64.0));
        assert_eq!(effect.name(), NAME);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn opacity_is_monotone_and_bounded(
                d1 in 0.0_f64..500.0,
                d2 in 0.0_f64..500.0,
                max in 0.0_f64..400.0,
            ) {
                let (near, far) = if d1 <= d2 { (d1, d2) } else { (d2, d1) };
                let a = connection_opacity(near, max);
                let b = connection_opacity(far, max);
                prop_assert!((0.0..=1.0).contains(&a));
                prop_assert!(a >= b);
                if far >= max {
                    prop_assert_eq!(b, 0.0);
                }
            }

            #[test]
            fn opacity_endpoints(max in 0.001_f64..1000.0) {
                prop_assert_eq!(connection_opacity(0.0, max), 1.0);
                prop_assert_eq!(connection_opacity(max, max), 0.0);
            }

            #[test]
            fn particles_stay_on_surface(
                seed: u64,
                count in 0_usize..30,
                speed in 0.0_f64..8.0,
                w in 10.0_f64..400.0,
                h in 10.0_f64..400.0,
                px in -100.0_f64..500.0,
                py in -100.0_f64..500.0,
            ) {
                let params = ParticleParams { count, speed, ..ParticleParams::default() };
                let mut field = ParticleField::new(params, seed);
                field.attach_pointer(Box::new(ScriptedPointer::fixed(px, py)));
                for tick in 0..200 {
                    // Shrink halfway through, as a resize would.
                    let (tw, th) = if tick < 100 { (w, h) } else { (w / 2.0, h / 2.0) };
                    field.update(Rect::sized(tw, th));
                    for p in field.particles() {
                        prop_assert!(p.pos().x >= 0.0 && p.pos().x <= tw);
                        prop_assert!(p.pos().y >= 0.0 && p.pos().y <= th);
                    }
                }
            }
        }
    }
}
