use asset_crop::batch::{self, BackupAction, FolderSelection};
use asset_crop::config::{self, ToolConfig};
use asset_crop::imaging::RustBackend;
use asset_crop::{analyze, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Match predicate overrides, shared by `crop` and `analyze`.
#[derive(clap::Args, Clone)]
struct MatchArgs {
    /// Only match images exactly this wide (default: any width)
    #[arg(long)]
    width: Option<u32>,

    /// Only match images exactly this high
    #[arg(long)]
    height: Option<u32>,

    /// Rows to remove from the bottom edge
    #[arg(long)]
    remove_bottom: Option<u32>,
}

/// Flags that override the `[crop]` table for one run.
#[derive(clap::Args, Clone)]
struct CropArgs {
    #[command(flatten)]
    predicate: MatchArgs,

    /// JPEG re-encode quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Process only this folder under the root (ignores the exclusion list)
    #[arg(long)]
    folder: Option<String>,

    /// Leave a failed write as-is instead of copying the backup back
    #[arg(long)]
    no_restore: bool,
}

/// Folder filter shared by backup maintenance commands.
#[derive(clap::Args, Clone)]
struct FolderArgs {
    /// Process only this folder under the root (ignores the exclusion list)
    #[arg(long)]
    folder: Option<String>,
}

#[derive(Parser)]
#[command(name = "asset-crop")]
#[command(about = "Crop the bottom rows off game image assets, with backups")]
#[command(long_about = "\
Crop the bottom rows off game image assets, with backups

Every immediate subfolder of the asset root is processed, except the ones
in the exclusion list. Images whose dimensions match exactly are cropped in
place; a verified <name>.backup is written next to each one first.

Asset structure:

  assets/images/
  ├── rural_kenya/
  │   ├── house_1.jpg              # 1024x768 → cropped to 1024x735
  │   ├── house_1.jpg.backup       # Original bytes, never processed
  │   └── house_2.jpg              # 1024x700 → skipped
  └── mogul_avatars/               # Excluded by default

Typical workflow:
  asset-crop crop                  # crop, keep backups
  asset-crop analyze               # list images that were skipped
  asset-crop clean                 # once the results look right
  asset-crop restore               # or, to undo

Run 'asset-crop gen-config' to generate a documented crop.toml.")]
#[command(version)]
struct Cli {
    /// Asset root (overrides `root` in the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop matching images in place, writing a backup of each first
    Crop(CropArgs),
    /// Delete every .backup file under the root
    Clean(FolderArgs),
    /// Copy every .backup file back over its image
    Restore(FolderArgs),
    /// Write a JSON report of images the crop predicate skips
    Analyze {
        #[command(flatten)]
        predicate: MatchArgs,

        /// Directory for the report (overrides `analyze.report_dir`)
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Print a stock crop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the run output; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let backend = RustBackend::new();

    match cli.command {
        Command::Crop(args) => {
            let mut config = load_config(&cli.config, cli.root)?;
            apply_crop_args(&mut config, &args)?;
            println!(
                "Cropping {} images under {} (removing {} rows)",
                config.crop.to_spec().target_label(),
                config.root.display(),
                config.crop.remove_from_bottom
            );
            let summary = batch::run_crop(&backend, &config, selection(&args.folder), |event| {
                output::print_crop_event(&event)
            })?;
            output::print_crop_summary(&summary);
        }
        Command::Clean(args) => {
            let config = load_config(&cli.config, cli.root)?;
            let summary = batch::run_cleanup(&config, selection(&args.folder), |event| {
                output::print_backup_event(BackupAction::Remove, &event)
            })?;
            output::print_backup_summary(&summary);
        }
        Command::Restore(args) => {
            let config = load_config(&cli.config, cli.root)?;
            let summary = batch::run_restore(&config, selection(&args.folder), |event| {
                output::print_backup_event(BackupAction::Restore, &event)
            })?;
            output::print_backup_summary(&summary);
        }
        Command::Analyze {
            predicate,
            report_dir,
        } => {
            let mut config = load_config(&cli.config, cli.root)?;
            apply_match_args(&mut config, &predicate)?;
            let report = analyze::analyze_tree(&backend, &config, |folder| {
                println!("{}", output::format_analyze_folder(folder))
            })?;
            let dir = report_dir.unwrap_or_else(|| config.analyze.report_dir.clone());
            let path = analyze::write_report(&report, &dir)?;
            output::print_analysis(&report, &path);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `crop.toml` (or stock defaults) and apply `--root`.
fn load_config(path: &Path, root: Option<PathBuf>) -> Result<ToolConfig, config::ConfigError> {
    let mut config = config::load_config(path)?;
    if let Some(root) = root {
        config.root = root;
    }
    Ok(config)
}

/// Apply predicate overrides to the `[crop]` table and re-validate.
fn apply_match_args(config: &mut ToolConfig, args: &MatchArgs) -> Result<(), config::ConfigError> {
    if let Some(width) = args.width {
        config.crop.match_width = Some(width);
    }
    if let Some(height) = args.height {
        config.crop.match_height = height;
    }
    if let Some(rows) = args.remove_bottom {
        config.crop.remove_from_bottom = rows;
    }
    config.validate()
}

/// Apply every `crop` override to the `[crop]` table and re-validate.
fn apply_crop_args(config: &mut ToolConfig, args: &CropArgs) -> Result<(), config::ConfigError> {
    apply_match_args(config, &args.predicate)?;
    if let Some(quality) = args.quality {
        config.crop.quality = quality;
    }
    if args.no_restore {
        config.crop.restore_on_failure = false;
    }
    config.validate()
}

fn selection(folder: &Option<String>) -> FolderSelection<'_> {
    match folder {
        Some(name) => FolderSelection::Only(name),
        None => FolderSelection::All,
    }
}
