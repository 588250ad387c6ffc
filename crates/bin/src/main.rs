//! Sectorlens CLI binary.
//!
//! Builds the Debt/EBITDA and P/E workbooks from the smart-lab sector tables.

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use sectorlens::{Pipeline, ReportPlan, RunSummary, SectorCatalog};
use sectorlens_data::fetch::{ChromeSession, DEFAULT_BASE_URL, HttpSession};
use sectorlens_data::{PageSession, SectorFetcher};
use sectorlens_output::ReportBuilder;
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sectorlens")]
#[command(about = "Sector fundamentals reports from smart-lab.ru", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Debt/EBITDA per sector
    DebtEbitda(RunArgs),

    /// P/E by year per sector, plus companies with 0 < P/E < 15 below their sector average
    Pe(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Output workbook (default: the report's file on the desktop)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON sector list replacing the built-in catalog
    #[arg(long)]
    sectors: Option<PathBuf>,

    /// How pages are loaded; `http` only sees tables present in the
    /// server-rendered HTML, use `chrome` when they are built by scripts
    #[arg(long, value_enum, default_value_t = Engine::Http)]
    engine: Engine,

    /// Site root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// List the sectors and exit
    #[arg(long)]
    list_sectors: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Engine {
    /// Plain HTTP requests; the tables must be in the server-rendered HTML
    Http,
    /// Headless Chrome, for pages that render the table with scripts
    Chrome,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (plan, args) = match cli.command {
        Commands::DebtEbitda(args) => (ReportPlan::debt_ebitda(), args),
        Commands::Pe(args) => (ReportPlan::pe(), args),
    };

    let catalog = match &args.sectors {
        Some(path) => SectorCatalog::from_json_file(path)?,
        None => SectorCatalog::builtin(),
    };

    if args.list_sectors {
        list_all_sectors(&catalog);
        return Ok(());
    }

    let output = args.output.clone().unwrap_or_else(|| default_output(&plan));

    let summary = match args.engine {
        Engine::Http => report(HttpSession::new()?, &args, &catalog, plan, output).await?,
        Engine::Chrome => {
            let session = tokio::task::spawn_blocking(ChromeSession::launch).await??;
            report(session, &args, &catalog, plan, output).await?
        }
    };

    println!("\n{summary}");
    println!("\nDone.");
    Ok(())
}

/// Run `plan` over `catalog` and save the workbook to `output`.
async fn report<S: PageSession>(
    session: S,
    args: &RunArgs,
    catalog: &SectorCatalog,
    plan: ReportPlan,
    output: PathBuf,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    // Fails before any page is loaded when the directory is missing.
    let mut builder = ReportBuilder::create(output)?;
    let mut fetcher = SectorFetcher::new(session).with_base_url(args.base_url.as_str());

    info!(report = plan.title, output = %builder.path().display(), "building report");

    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    let mut summary = Pipeline::new(&mut fetcher, plan)
        .with_progress(pb.clone())
        .run(catalog, &mut builder)
        .await;
    pb.finish_with_message(format!("{} sheets", summary.sheets.len()));

    summary.save(builder)?;
    Ok(summary)
}

fn default_output(plan: &ReportPlan) -> PathBuf {
    dirs::desktop_dir()
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(plan.file_name)
}

fn list_all_sectors(catalog: &SectorCatalog) {
    println!("Sectors:");
    println!("========\n");

    for sector in catalog {
        println!("{:2} - {}", sector.id, sector.display_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pe_defaults() {
        let cli = Cli::try_parse_from(["sectorlens", "pe"]).unwrap();
        let Commands::Pe(args) = cli.command else {
            panic!("expected pe subcommand");
        };
        assert!(matches!(args.engine, Engine::Http));
        assert_eq!(args.base_url, DEFAULT_BASE_URL);
        assert!(args.output.is_none());
        assert!(!args.list_sectors);
    }

    #[test]
    fn test_engine_help_names_rendering_limit() {
        let mut cli = Cli::command();
        let pe = cli.find_subcommand_mut("pe").unwrap();
        let engine = pe
            .get_arguments()
            .find(|arg| arg.get_id() == "engine")
            .unwrap();
        let help = engine.get_help().unwrap().to_string();
        assert!(help.contains("server-rendered"));
        assert!(help.contains("chrome"));
    }

    #[test]
    fn test_default_output_file_name() {
        let path = default_output(&ReportPlan::debt_ebitda());
        assert!(path.ends_with("debt_ebitda_all_sectors.xlsx"));
    }
}
