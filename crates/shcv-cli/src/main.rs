//! shcv - Sync Helm chart values with the parameters used in templates

use clap::Parser;
use shcv_core::{Chart, ChartOptions};
use tracing_subscriber::EnvFilter;

mod error;
mod exit_codes;
mod report;

use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "shcv")]
#[command(version)]
#[command(about = "Sync Helm chart values with the parameters used in templates", long_about = None)]
struct Cli {
    /// Chart directory
    chart_dir: String,

    /// Print the references found and the files updated
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let code = match run(&cli) {
        Ok(()) => exit_codes::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

/// Log to stderr; `RUST_LOG` overrides the flags
fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        "debug"
    } else if verbose {
        "warn,shcv_core=info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug)
        .try_init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = ChartOptions::default();
    tracing::debug!(chart = %cli.chart_dir, "processing chart");

    let mut chart =
        Chart::new(&cli.chart_dir, options).map_err(|source| CliError::CreateChart { source })?;

    chart
        .load_values_files()
        .map_err(|source| CliError::LoadValues { source })?;

    chart
        .find_templates()
        .map_err(|source| CliError::FindTemplates { source })?;
    if cli.verbose {
        report::print_templates(chart.templates().len());
    }

    chart
        .parse_templates()
        .map_err(|source| CliError::ParseTemplates { source })?;
    if cli.verbose {
        report::print_references(chart.references());
    }

    let warnings = chart.process_references();
    if cli.verbose {
        report::print_warnings(&warnings);
    }

    let updated = chart
        .update_values_files()
        .map_err(|source| CliError::UpdateValues { source })?;
    if cli.verbose {
        for path in &updated {
            report::print_updated(path);
        }
    }

    Ok(())
}
