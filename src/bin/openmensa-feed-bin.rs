use openmensa_berlin_rs::constants::CAFENERO_PDF_URL;
use openmensa_berlin_rs::shared_main::{logger_init, run, RunConfig};

use clap::Parser;
use log::log_enabled;
use std::{path::PathBuf, process::ExitCode};

/// Scrapes the Studierendenwerk Berlin and Cafenero menus and writes
/// OpenMensa v2 feeds, one file per canteen.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML file with the [canteens.<key>] tables
    #[arg(short, long, env = "CANTEENS_FILE", default_value = "canteens.toml")]
    canteens: PathBuf,
    /// Directory the feeds are written to
    #[arg(short, long, env = "OUTPUT_DIR", default_value = "feeds")]
    output_dir: PathBuf,
    /// Number of days requested per stw.berlin canteen, starting today
    #[arg(short, long, default_value_t = 15)]
    days: u32,
    /// Pause between two upstream requests in milliseconds (plus jitter)
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
    /// Only process the canteen with this key
    #[arg(long)]
    only: Option<String>,
    /// Also write the parsed menus as <key>.json
    #[arg(long)]
    json: bool,
    /// Location of the Cafenero weekly menu
    #[arg(long, env = "CAFENERO_PDF_URL", default_value = CAFENERO_PDF_URL)]
    cafenero_pdf_url: String,
    /// Enable verbose logging (mostly performance metrics){n}[SETS env: RUST_LOG=debug]
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }

    logger_init(module_path!());
    log::info!("Starting feed run...");

    if !(log_enabled!(log::Level::Debug) || log_enabled!(log::Level::Trace)) {
        log::info!("Enable verbose logging for performance metrics");
    }

    let config = RunConfig {
        canteens_file: args.canteens,
        output_dir: args.output_dir,
        days: args.days,
        delay_ms: args.delay_ms,
        only: args.only,
        json: args.json,
        pdf_url: args.cafenero_pdf_url,
    };

    let today = chrono::Local::now().date_naive();
    let failed = run(&config, today).await?;

    if failed > 0 {
        log::error!("{} canteen(s) failed", failed);
        return Ok(ExitCode::FAILURE);
    }

    log::info!("Done, feeds in {}", config.output_dir.display());
    Ok(ExitCode::SUCCESS)
}
