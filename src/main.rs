use clap::{Parser, Subcommand};
use image_squeeze::config::{self, SqueezeConfig};
use image_squeeze::imaging::{RustBackend, get_dimensions, plan_transcode, preview};
use image_squeeze::output::{self, TranscodeReport};
use image_squeeze::presets::find_preset;
use image_squeeze::{RawFields, naming, transcode_with_backend, validate};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Transcode knobs shared by `transcode` and `plan`.
///
/// Values stay as strings so the library's lenient parsing applies: an
/// unknown format falls back to JPEG, a non-numeric size means no bound.
#[derive(clap::Args, Clone)]
struct KnobArgs {
    /// Image to re-encode
    input: PathBuf,

    /// Output format: jpeg, png, webp, avif
    #[arg(long)]
    format: Option<String>,

    /// Quality 10-100 (out-of-range values are clamped)
    #[arg(long, allow_hyphen_values = true)]
    quality: Option<String>,

    /// Maximum output width in pixels
    #[arg(long)]
    max_width: Option<String>,

    /// Maximum output height in pixels
    #[arg(long)]
    max_height: Option<String>,

    /// How both bounds are applied: inside, cover, fill
    #[arg(long)]
    fit: Option<String>,

    /// Named size preset (see `presets`); --max-width/--max-height win
    #[arg(long)]
    preset: Option<String>,
}

#[derive(Parser)]
#[command(name = "image-squeeze")]
#[command(about = "Re-encode and downscale a single image")]
#[command(long_about = "\
Re-encode and downscale a single image

Turns a format, a quality (10-100) and optional size bounds into concrete
encoder settings, then writes optimized-<name>.<ext>.

Per-format settings derived from quality:
  webp  quality as given, slowest/smallest method
  avif  quality - 15 (never below 10)
  png   deflate level round((100 - q) / 11); palette when q < 80
  jpeg  mozjpeg; 4:4:4 chroma when q >= 90, else 4:2:0

Without bounds, output is capped at 1920px wide. Inside and cover never
enlarge; fill stretches to the exact bounds unless the image already fits.

Run 'image-squeeze gen-config' to generate a documented squeeze.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./squeeze.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log decisions at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-encode an image and write the result
    Transcode {
        #[command(flatten)]
        knobs: KnobArgs,

        /// Directory to write the optimized file to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the resize plan and encoder settings without encoding
    Plan(KnobArgs),
    /// List named size presets
    Presets,
    /// Print a stock squeeze.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Transcode {
            knobs,
            output_dir,
            json,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let bytes = std::fs::read(&knobs.input)?;
            let request = validate(build_fields(&knobs, &config, bytes)?)?;

            let backend = RustBackend::new();
            let source_dimensions = get_dimensions(&backend, &request.image_bytes).ok();
            let result = transcode_with_backend(&backend, &request)?;

            let dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.output.directory));
            std::fs::create_dir_all(&dir)?;
            let out_path = dir.join(&result.suggested_filename);
            std::fs::write(&out_path, &result.output_bytes)?;

            let report = TranscodeReport::new(
                &request.source_filename,
                &result,
                request.format,
                request.quality,
                source_dimensions,
                Some(out_path.display().to_string()),
            );
            if json {
                output::print_transcode_json(&report)?;
            } else {
                output::print_transcode_output(&report);
            }
        }
        Command::Plan(knobs) => {
            let config = load_config(cli.config.as_deref())?;
            let bytes = std::fs::read(&knobs.input)?;
            let request = validate(build_fields(&knobs, &config, bytes)?)?;

            let source = get_dimensions(&RustBackend::new(), &request.image_bytes)?;
            let plan = plan_transcode(&request);
            let (op, _) = preview(source, &plan);
            let filename =
                naming::suggested_filename(&request.source_filename, plan.encode.file_extension);
            output::print_plan_output(&request.source_filename, source, &plan, op, &filename);
        }
        Command::Presets => {
            output::print_presets();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `--config`, or `./squeeze.toml` if it exists, or stock defaults.
fn load_config(path: Option<&Path>) -> Result<SqueezeConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) if !p.exists() => Err(format!("config file not found: {}", p.display()).into()),
        Some(p) => Ok(config::load_config(p)?),
        None => Ok(config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?),
    }
}

/// Size bounds by precedence: CLI bounds > CLI preset > config bounds/preset.
fn resolve_bounds(
    knobs: &KnobArgs,
    config: &SqueezeConfig,
) -> Result<(Option<String>, Option<String>), String> {
    if knobs.max_width.is_some() || knobs.max_height.is_some() {
        return Ok((knobs.max_width.clone(), knobs.max_height.clone()));
    }
    let (w, h) = match &knobs.preset {
        Some(name) => {
            let preset = find_preset(name).ok_or_else(|| format!("unknown preset '{name}'"))?;
            (preset.max_width, preset.max_height)
        }
        None => config.defaults.bounds(),
    };
    Ok((w.map(|v| v.to_string()), h.map(|v| v.to_string())))
}

/// Merge CLI flags over config defaults into the raw fields the validator reads.
fn build_fields(
    knobs: &KnobArgs,
    config: &SqueezeConfig,
    bytes: Vec<u8>,
) -> Result<RawFields, String> {
    let (max_width, max_height) = resolve_bounds(knobs, config)?;
    let filename = knobs
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let defaults = &config.defaults;

    Ok(RawFields {
        image: Some(bytes),
        filename,
        format: knobs
            .format
            .clone()
            .or_else(|| Some(defaults.format.name().to_string())),
        quality: knobs
            .quality
            .clone()
            .or_else(|| Some(defaults.quality.to_string())),
        max_width,
        max_height,
        fit: knobs
            .fit
            .clone()
            .or_else(|| Some(defaults.fit.name().to_string())),
    })
}
