//! ffa-cell-diagram: draw the layout of one FFA lattice cell

use anyhow::{Context, Result};
use clap::Parser;
use ffa_cell::{default_params, fieldmap_dir, make_diagram, DiagramConfig, LatticeParams};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ffa-cell-diagram")]
#[command(about = "Draw the magnet layout of one FFA lattice cell")]
#[command(version)]
struct Args {
    /// Lattice parameter file (JSON); the built-in defaults when omitted
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Directory receiving the figure files (must already exist)
    #[arg(short, long, default_value = "figs")]
    output_dir: PathBuf,

    /// Do not write figure files
    #[arg(long)]
    no_save: bool,

    /// Do not print the layout report
    #[arg(long)]
    no_show: bool,

    /// Print the parameter set as JSON and exit
    #[arg(long)]
    dump_params: bool,

    /// Print the field-map directory from settings.json and exit
    #[arg(long)]
    fieldmap_dir: bool,

    /// Verbosity: -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.fieldmap_dir {
        let dir = fieldmap_dir().context("Failed to read field-map directory")?;
        println!("{}", dir);
        return Ok(());
    }

    let params = match &args.params {
        Some(path) => LatticeParams::load(path)
            .with_context(|| format!("Failed to load parameters: {:?}", path))?,
        None => default_params(),
    };

    if args.dump_params {
        println!("{}", params.to_json()?);
        return Ok(());
    }

    let config = DiagramConfig {
        output_dir: args.output_dir,
        save: !args.no_save,
        show: !args.no_show,
        ..DiagramConfig::default()
    };

    let (_, written) = make_diagram(&params, &config).context("Diagram failed")?;
    for path in &written {
        info!("Generated figure: {:?}", path);
    }

    Ok(())
}
