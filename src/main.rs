use clap::{Parser, Subcommand};
use env_logger::Env;
use media_workflow::batch::{self, BatchSummary};
use media_workflow::config::{self, ToolConfig};
use media_workflow::imaging::{
    RustBackend, TargetSize, identify_all, supported_input_extensions,
};
use media_workflow::inputs;
use media_workflow::output;
use media_workflow::types::{BannerKind, BannerOptions, BatchJob, JobMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "media-workflow")]
#[command(about = "Batch PSD conversion, exact resizing, and banner compositing")]
#[command(long_about = "\
Batch PSD conversion, exact resizing, and banner compositing

Every output is a JPEG at quality 100 with full-resolution chroma, carrying
the source's DPI (72x72 when the source has none). Results are written into
a folder created next to each source:

  shoots/
  ├── ad.psd
  ├── photo.jpg
  ├── shoe.png
  ├── Converted/ad.jpg                          # convert
  ├── Resized/photo_286x410.jpg                 # resize --size 286x410
  └── Banner/SummerShoe_2DayBanner_286x410.jpg  # banner --rename shoe.png=SummerShoe

Directory arguments expand to the supported files directly inside them.
A file that fails is reported and skipped; the rest of the batch continues.

Run 'media-workflow gen-config' to generate a documented media-workflow.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./media-workflow.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON instead of progress lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flatten PSD documents to JPEG at their native size
    Convert {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Stretch images to an exact WIDTHxHEIGHT
    Resize {
        /// Target size, e.g. 286x410 (default from config)
        #[arg(long)]
        size: Option<TargetSize>,
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Composite images onto the 286x410 banner overlay
    Banner {
        /// Overlay to use: 2day or 3day
        #[arg(long, default_value = "2day")]
        kind: BannerKind,
        /// Base name for every output, numbered when there are several files
        #[arg(long)]
        title: Option<String>,
        /// Per-file base name, as FILE=NAME (repeatable)
        #[arg(long, value_parser = parse_rename)]
        rename: Vec<(PathBuf, String)>,
        /// Directory holding the overlay templates
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show dimensions, format, colour mode, size, and DPI of images
    Info {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List the configured resize presets
    Presets,
    /// Print a stock media-workflow.toml with all options documented
    GenConfig,
}

fn parse_rename(s: &str) -> Result<(PathBuf, String), String> {
    let (file, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FILE=NAME, got {s:?}"))?;
    if file.is_empty() {
        return Err(format!("missing FILE in {s:?}"));
    }
    Ok((PathBuf::from(file), name.to_string()))
}

fn load_config(cli: &Cli) -> Result<ToolConfig, config::ConfigError> {
    match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(&std::env::current_dir()?),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Presets => {
            let config = load_config(&cli)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&config.resize)?);
            } else {
                output::print_presets(&config.resize.presets, config.resize.default_size);
            }
        }
        Command::Info { paths } => {
            let sources =
                inputs::collect_with_extensions(paths, supported_input_extensions())?;
            let (infos, failures) = identify_all(&RustBackend::new(), &sources);
            for (source, e) in &failures {
                log::warn!("{}: {e}", source.display());
            }
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&infos)?);
            } else {
                for (i, info) in infos.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    output::print_file_info(info);
                }
            }
            if !failures.is_empty() {
                std::process::exit(2);
            }
        }
        Command::Convert { paths } => {
            let config = load_config(&cli)?;
            let summary = run_job(JobMode::Convert, paths, config, cli.json)?;
            exit_on_failures(&summary);
        }
        Command::Resize { size, paths } => {
            let config = load_config(&cli)?;
            let size = size.unwrap_or(config.resize.default_size);
            let summary = run_job(JobMode::Resize(size), paths, config, cli.json)?;
            exit_on_failures(&summary);
        }
        Command::Banner {
            kind,
            title,
            rename,
            templates,
            paths,
        } => {
            let mut config = load_config(&cli)?;
            if let Some(dir) = templates {
                config.banner.template_dir = Some(dir.clone());
            }
            let mut options = BannerOptions::new(*kind);
            options.title = title.clone();
            let mode = JobMode::Banner(options);

            let sources = inputs::collect_inputs(paths, &mode)?;
            let (renames, unmatched) = inputs::match_renames(&sources, rename);
            for file in unmatched {
                log::warn!("--rename {} matches no input file", file.display());
            }
            let mode = match mode {
                JobMode::Banner(mut options) => {
                    options.renames = renames;
                    JobMode::Banner(options)
                }
                other => other,
            };
            let summary = run_sources(mode, sources, config, cli.json)?;
            exit_on_failures(&summary);
        }
    }

    Ok(())
}

/// Collect inputs for `mode` and run the job.
fn run_job(
    mode: JobMode,
    paths: &[PathBuf],
    config: ToolConfig,
    json: bool,
) -> Result<BatchSummary, Box<dyn std::error::Error>> {
    let sources = inputs::collect_inputs(paths, &mode)?;
    run_sources(mode, sources, config, json)
}

/// Run the job on the worker thread while this thread renders its progress.
fn run_sources(
    mode: JobMode,
    sources: Vec<PathBuf>,
    config: ToolConfig,
    json: bool,
) -> Result<BatchSummary, Box<dyn std::error::Error>> {
    let job = BatchJob { mode, sources };
    let handle = batch::spawn_batch(RustBackend::new(), job, config);
    for event in handle.events() {
        if !json {
            output::print_batch_event(&event);
        }
    }
    let summary = handle.join()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(summary)
}

/// Exit with status 2 when any file failed, so scripts can tell.
fn exit_on_failures(summary: &BatchSummary) {
    if summary.failed > 0 {
        std::process::exit(2);
    }
}
