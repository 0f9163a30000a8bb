#![deny(unsafe_code)]
//! Headless CLI for backdrop.
//!
//! Subcommands:
//! - `render <effect>`: run an effect for N ticks, write a PNG of the last frame
//! - `list`: print available effects and palettes

mod error;

use backdrop_core::{Palette, Scene};
use backdrop_effects::EffectKind;
use clap::{Parser, Subcommand};
use error::CliError;
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "backdrop", about = "Procedural background animation renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log to stderr; repeat for more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an effect for N ticks and write a PNG of the final frame.
    Render {
        /// Effect name (e.g. "aurora-waves"). Not needed with --scene.
        effect: Option<String>,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// Number of ticks to run.
        #[arg(short, long, default_value_t = 120)]
        ticks: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Effect parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Named palette used as the `colors` parameter unless --params sets it.
        #[arg(short, long)]
        palette: Option<String>,

        /// Pointer position in surface pixels, held for the whole run.
        #[arg(long, value_parser = parse_pointer)]
        pointer: Option<(f64, f64)>,

        /// Load effect, size, seed, params and ticks from a scene JSON file.
        #[arg(long, conflicts_with_all = ["effect", "palette"])]
        scene: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List available effects and palettes.
    List,
}

fn parse_pointer(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite())
            .ok_or_else(|| format!("invalid coordinate {v:?}"))
    };
    Ok((coord(x)?, coord(y)?))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_scene(path: &Path) -> Result<Scene, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text).map_err(|e| CliError::Input(format!("invalid scene file: {e}")))
}

fn build_scene(
    effect: Option<String>,
    width: usize,
    height: usize,
    ticks: usize,
    seed: u64,
    params: &str,
    palette: Option<String>,
) -> Result<Scene, CliError> {
    let effect = effect.ok_or_else(|| CliError::Input("an effect name or --scene is required".into()))?;
    let mut params: serde_json::Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !params.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    if let Some(name) = palette {
        let palette = Palette::from_name(&name).map_err(|e| CliError::Input(e.to_string()))?;
        if let Some(map) = params.as_object_mut() {
            map.entry("colors").or_insert_with(|| palette.to_css().into());
        }
    }
    let mut scene = Scene::new(&effect, width, height, seed);
    scene.params = params;
    scene.ticks = ticks;
    Ok(scene)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let effects = EffectKind::list_effects();
            let palettes = Palette::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "effects": effects,
                    "palettes": palettes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Effects:");
                for name in effects {
                    println!("  {name}");
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
            }
        }
        Command::Render {
            effect,
            width,
            height,
            ticks,
            seed,
            params,
            palette,
            pointer,
            scene,
            output,
        } => {
            let scene = match scene {
                Some(path) => load_scene(&path)?,
                None => build_scene(effect, width, height, ticks, seed, &params, palette)?,
            };

            let surface = backdrop_effects::render_scene(&scene, pointer)?;
            backdrop_effects::snapshot::write_png(&surface, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "scene": scene,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {} ticks, seed {}) -> {}",
                    scene.effect,
                    scene.width,
                    scene.height,
                    scene.ticks,
                    scene.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_pointer_accepts_pairs() {
        assert_eq!(parse_pointer("12.5, 40"), Ok((12.5, 40.0)));
        assert!(parse_pointer("12").is_err());
        assert!(parse_pointer("a,b").is_err());
        assert!(parse_pointer("inf,0").is_err());
    }

    #[test]
    fn build_scene_requires_an_effect() {
        let err = build_scene(None, 10, 10, 1, 1, "{}", None).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn build_scene_rejects_non_object_params() {
        let err = build_scene(Some("fluid-blobs".into()), 10, 10, 1, 1, "[1]", None).unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn palette_fills_colors_unless_params_set_them() {
        let scene =
            build_scene(Some("fluid-blobs".into()), 10, 10, 1, 1, "{}", Some("mono".into())).unwrap();
        assert_eq!(scene.params["colors"], serde_json::json!(Palette::mono().to_css()));

        let scene = build_scene(
            Some("fluid-blobs".into()),
            10,
            10,
            1,
            1,
            r##"{"colors": ["#000000"]}"##,
            Some("mono".into()),
        )
        .unwrap();
        assert_eq!(scene.params["colors"], serde_json::json!(["#000000"]));
    }

    #[test]
    fn unknown_palette_is_input_error() {
        let err = build_scene(Some("fluid-blobs".into()), 10, 10, 1, 1, "{}", Some("plaid".into()))
            .unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn render_parses_scene_flag() {
        let cli = Cli::try_parse_from(["backdrop", "render", "--scene", "s.json", "-o", "x.png"]).unwrap();
        match cli.command {
            Command::Render { scene, effect, .. } => {
                assert_eq!(scene, Some(PathBuf::from("s.json")));
                assert!(effect.is_none());
            }
            Command::List => panic!("expected render"),
        }
    }
}
