//! Lineage Reader CLI Application
//!
//! This is the command-line interface for the lineage export reader.
//! It uses the lineage-decoder library and adds:
//! - TOML configuration with command-line overrides
//! - Calibration from the companion settings file
//! - Summary report of the reconstructed forest
//! - CSV cell matrix and JSON track export

use anyhow::{bail, Context, Result};
use clap::Parser;
use lineage_decoder::{LineageReader, Settings};
use std::io;
use std::path::PathBuf;

mod config;
mod export;
mod report;

use config::AppConfig;
use export::TrackOptions;

/// Lineage Reader - Rebuild cell lineages from tracking exports
#[derive(Parser, Debug)]
#[command(name = "lineage-cli")]
#[command(about = "Rebuild cell lineage trees from tracking exports (.sbd/.sbc)", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the lineage export (.sbd)
    #[arg(short = 'd', long, value_name = "FILE")]
    sbd: Option<PathBuf>,

    /// Path to the companion settings file (.sbc)
    #[arg(short = 's', long, value_name = "FILE")]
    sbc: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the cell matrix as CSV
    #[arg(long, value_name = "FILE")]
    matrix: Option<PathBuf>,

    /// Write calibrated, interpolated tracks as JSON
    #[arg(long, value_name = "FILE")]
    tracks: Option<PathBuf>,

    /// Only export descendants of this cell (e.g. AB)
    #[arg(long, value_name = "NAME")]
    lineage: Option<String>,

    /// Interpolation density in (0, 1]
    #[arg(long, value_name = "FRACTION")]
    fraction: Option<f64>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Lineage Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", lineage_decoder::VERSION);

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    apply_overrides(&mut config, &args);

    run(&config, args.quiet)
}

/// Command-line flags win over the configuration file
fn apply_overrides(config: &mut AppConfig, args: &Args) {
    if let Some(sbd) = &args.sbd {
        config.input.sbd = Some(sbd.clone());
    }
    if let Some(sbc) = &args.sbc {
        config.input.sbc = Some(sbc.clone());
    }
    if let Some(matrix) = &args.matrix {
        config.export.matrix = Some(matrix.clone());
    }
    if let Some(tracks) = &args.tracks {
        config.export.tracks = Some(tracks.clone());
    }
    if let Some(lineage) = &args.lineage {
        config.export.lineage = Some(lineage.clone());
    }
    if let Some(fraction) = args.fraction {
        config.export.fraction = fraction;
    }
}

fn run(config: &AppConfig, quiet: bool) -> Result<()> {
    let Some(sbd_path) = &config.input.sbd else {
        bail!("No lineage export given; use --sbd <FILE> or set input.sbd in config.toml");
    };

    let reader = LineageReader::new(config.parser.clone());
    let forest = reader
        .read_file(sbd_path)
        .with_context(|| format!("Failed to read lineage export: {:?}", sbd_path))?;

    if !quiet {
        report::write_summary(&forest, &mut io::stdout().lock())?;
    }

    if let Some(matrix_path) = &config.export.matrix {
        report::write_matrix(&forest, matrix_path)?;
    }

    if let Some(tracks_path) = &config.export.tracks {
        let calibration = match &config.input.sbc {
            Some(sbc_path) => {
                let settings = Settings::from_file(sbc_path)
                    .with_context(|| format!("Failed to read settings: {:?}", sbc_path))?;
                settings
                    .calibration_factor(config.export.reference_width)
                    .with_context(|| format!("No usable calibration in {:?}", sbc_path))?
            }
            None => {
                log::warn!("No settings file given, exporting uncalibrated pixel coordinates");
                1.0
            }
        };

        let options = TrackOptions {
            fraction: config.export.fraction,
            calibration,
            z_scale: config.export.z_scale,
            lineage: config.export.lineage.clone(),
        };
        let tracks = export::build_tracks(&forest, &options)?;
        export::write_tracks(&tracks, tracks_path)?;
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let args = Args::parse_from([
            "lineage-cli",
            "--sbd",
            "a.sbd",
            "--fraction",
            "0.25",
            "--lineage",
            "CD",
        ]);
        let mut config = AppConfig::default();
        config.input.sbc = Some(PathBuf::from("kept.sbc"));
        apply_overrides(&mut config, &args);

        assert_eq!(config.input.sbd, Some(PathBuf::from("a.sbd")));
        assert_eq!(config.input.sbc, Some(PathBuf::from("kept.sbc")));
        assert_eq!(config.export.fraction, 0.25);
        assert_eq!(config.export.lineage.as_deref(), Some("CD"));
    }

    #[test]
    fn test_run_without_input_fails() {
        assert!(run(&AppConfig::default(), true).is_err());
    }
}
