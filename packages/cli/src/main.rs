#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for scraping drug approval data.
//!
//! Every subcommand writes its table as CSV to stdout, or to the file
//! given with `--output`. Logging goes through
//! [`drug_nme_cli_utils::init_logger`] so log lines and progress bars
//! share the terminal.

mod output;
mod summary;

use std::path::{Path, PathBuf};

use chrono::Datelike as _;
use clap::{Parser, Subcommand, ValueEnum};
use drug_nme_approval_models::{AggregatedTable, LigandApproval, SubmissionRecord};
use drug_nme_cli_utils::{IndicatifProgress, MultiProgress};
use drug_nme_normalize::APPROVAL_DATE;
use drug_nme_report::table_rows;
use drug_nme_scraper::HttpFetcher;
use drug_nme_source::fda::FdaScraper;
use drug_nme_source::json_table::records_to_table;
use drug_nme_source::location::DataLocation;
use drug_nme_source::openfda::OpenFdaFetcher;
use drug_nme_source::pharmacology::{PharmacologyFetcher, parse_agencies};
use drug_nme_source::target::{TargetFetcher, TargetQuery, parse_species};
use drug_nme_source::{SourceConfig, SourceError};

#[derive(Parser)]
#[command(name = "drug_nme", about = "Drug approval data scraper")]
struct Cli {
    /// TOML file overriding the built-in endpoints and settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write CSV here instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the yearly NME report links
    Links,
    /// Extract the yearly NME reports (all years unless `--year` is given)
    Nme {
        /// Only this year's report
        #[arg(long)]
        year: Option<i32>,
    },
    /// Download the CSV compilation of all NME and new biologic approvals
    Compilation,
    /// Scrape one year's "Novel Drug Approvals" page
    Current {
        /// Year to scrape (default: the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Scrape the "Novel Drug Approvals" pages for a range of years
    Novel {
        /// First year
        #[arg(long)]
        start: i32,
        /// Last year (default: the current year)
        #[arg(long)]
        end: Option<i32>,
    },
    /// Approved ligands from the Guide to Pharmacology
    Ligands {
        /// Agencies to extract approvals for (e.g. "fda,ema")
        #[arg(long, default_value = "fda", value_delimiter = ',')]
        agency: Vec<String>,
        /// Relabel kinase inhibitors
        #[arg(long)]
        kinase: bool,
        /// Read ligands from this URL or JSON file instead
        #[arg(long)]
        path: Option<String>,
    },
    /// New Molecular Entity submissions from openFDA
    Openfda {
        /// Read the drugsfda data from this URL or file instead
        #[arg(long)]
        path: Option<String>,
    },
    /// Protein targets from the Guide to Pharmacology
    Targets {
        /// HGNC gene symbol (e.g. "CATSPER4")
        #[arg(long, conflicts_with = "name")]
        gene: Option<String>,
        /// Target name (e.g. "HER3")
        #[arg(long)]
        name: Option<String>,
    },
    /// Protein target families from the Guide to Pharmacology
    TargetFamilies,
    /// `ChEMBL`, Ensembl and `UniProtKB` identifiers for targets
    TargetIds {
        /// Human, Mouse, Rat or All
        #[arg(long, default_value = "Human")]
        species: String,
        /// Guide to Pharmacology target ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Print text charts of a data set; `--output` receives the counts
    Summary {
        /// Data set to summarize
        #[arg(long, value_enum, default_value_t = Dataset::Ligands)]
        source: Dataset,
        /// Field to break the counts down by (e.g. "type",
        /// "`review_priority`" or a report column)
        #[arg(long)]
        by: Option<String>,
        /// Agencies, for ligands
        #[arg(long, default_value = "fda", value_delimiter = ',')]
        agency: Vec<String>,
        /// Relabel kinase inhibitors, for ligands
        #[arg(long)]
        kinase: bool,
        /// Read the data from this URL or file instead, for ligands and
        /// openFDA
        #[arg(long)]
        path: Option<String>,
        /// Chart width in characters
        #[arg(long, default_value = "50")]
        width: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Dataset {
    /// Guide to Pharmacology approved ligands
    Ligands,
    /// openFDA NME submissions
    Openfda,
    /// Yearly FDA NME reports
    Nme,
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn load_config(path: Option<&Path>) -> Result<SourceConfig, SourceError> {
    path.map_or_else(|| Ok(SourceConfig::default()), SourceConfig::load)
}

async fn ligands(
    config: &SourceConfig,
    multi: &MultiProgress,
    agency: &[String],
    kinase: bool,
    path: Option<String>,
) -> Result<Vec<LigandApproval>, SourceError> {
    let agencies = parse_agencies(agency)?;
    let mut fetcher = PharmacologyFetcher::new(HttpFetcher::with_headers(&config.headers)?, config);
    if let Some(path) = path {
        let location = path.parse::<DataLocation>().unwrap_or_else(|e| match e {});
        fetcher = fetcher.with_location(location);
    }

    let progress = IndicatifProgress::download_bar(multi, "Ligands");
    let mut approvals = fetcher.approvals(&agencies, progress.as_ref()).await?;
    progress.finish_and_clear();
    if kinase {
        let relabelled = fetcher.label_kinases(&mut approvals);
        log::info!("Relabelled {relabelled} kinase inhibitors");
    }
    Ok(approvals)
}

async fn nme_submissions(
    config: &SourceConfig,
    multi: &MultiProgress,
    path: Option<String>,
) -> Result<Vec<SubmissionRecord>, SourceError> {
    let mut fetcher = OpenFdaFetcher::new(HttpFetcher::with_headers(&config.headers)?, config);
    if let Some(path) = path {
        let location = path.parse::<DataLocation>().unwrap_or_else(|e| match e {});
        fetcher = fetcher.with_location(location);
    }
    let progress = IndicatifProgress::download_bar(multi, "openFDA");
    let records = fetcher.nme_submissions(progress.as_ref()).await?;
    progress.finish_and_clear();
    Ok(records)
}

async fn all_reports(
    scraper: &FdaScraper<HttpFetcher>,
    multi: &MultiProgress,
) -> Result<AggregatedTable, SourceError> {
    let progress = IndicatifProgress::download_bar(multi, "NME listing");
    let links = scraper.pdf_links(progress.as_ref()).await?;
    progress.finish_and_clear();

    let progress = IndicatifProgress::steps_bar(multi, "NME reports");
    let table = scraper.extract_all(&links, progress.as_ref()).await;
    if !table.failures().is_empty() {
        log::warn!(
            "{} of {} yearly reports could not be extracted",
            table.failures().len(),
            links.len()
        );
    }
    Ok(table)
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = drug_nme_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut out = output::writer(cli.output.as_deref())?;

    match cli.command {
        Commands::Links => {
            let scraper = FdaScraper::from_config(config)?;
            let progress = IndicatifProgress::download_bar(&multi, "NME listing");
            let links = scraper.pdf_links(progress.as_ref()).await?;
            progress.finish(format!("Found {} yearly reports", links.len()));
            output::write_links(&mut out, &links)?;
        }
        Commands::Nme { year } => {
            let scraper = FdaScraper::from_config(config)?;
            let table = if let Some(year) = year {
                let progress = IndicatifProgress::download_bar(&multi, "NME listing");
                let links = scraper.pdf_links(progress.as_ref()).await?;
                progress.finish_and_clear();
                scraper.extract_year(&links, year).await?
            } else {
                all_reports(&scraper, &multi).await?
            };
            output::write_aggregated(&mut out, &table, APPROVAL_DATE)?;
        }
        Commands::Compilation => {
            let scraper = FdaScraper::from_config(config)?;
            let progress = IndicatifProgress::download_bar(&multi, "Compilation");
            let table = scraper.compilation(progress.as_ref()).await?;
            progress.finish(format!("Downloaded {} approvals", table.len()));
            output::write_table(&mut out, &table)?;
        }
        Commands::Current { year } => {
            let year = year.unwrap_or_else(current_year);
            let scraper = FdaScraper::from_config(config)?;
            let progress = IndicatifProgress::download_bar(&multi, "Novel approvals");
            let table = scraper.current_year(year, progress.as_ref()).await?;
            progress.finish_and_clear();
            output::write_table(&mut out, &table)?;
        }
        Commands::Novel { start, end } => {
            let end = end.unwrap_or_else(current_year);
            let scraper = FdaScraper::from_config(config)?;
            let progress = IndicatifProgress::steps_bar(&multi, "Novel approvals");
            let table = scraper.novel_approvals(start, end, progress.as_ref()).await;
            output::write_aggregated(&mut out, &table, APPROVAL_DATE)?;
        }
        Commands::Ligands {
            agency,
            kinase,
            path,
        } => {
            let approvals = ligands(&config, &multi, &agency, kinase, path).await?;
            output::write_records(&mut out, &approvals)?;
        }
        Commands::Openfda { path } => {
            let records = nme_submissions(&config, &multi, path).await?;
            output::write_records(&mut out, &records)?;
        }
        Commands::Targets { gene, name } => {
            let query = match (gene, name) {
                (Some(gene), _) => TargetQuery::Gene(gene),
                (None, Some(name)) => TargetQuery::Name(name),
                (None, None) => TargetQuery::All,
            };
            let fetcher = TargetFetcher::new(HttpFetcher::with_headers(&config.headers)?, &config);
            let progress = IndicatifProgress::download_bar(&multi, "Targets");
            let targets = fetcher.targets(&query, progress.as_ref()).await?;
            output::write_table(&mut out, &records_to_table(&targets))?;
        }
        Commands::TargetFamilies => {
            let fetcher = TargetFetcher::new(HttpFetcher::with_headers(&config.headers)?, &config);
            let progress = IndicatifProgress::download_bar(&multi, "Target families");
            let families = fetcher.families(progress.as_ref()).await?;
            output::write_table(&mut out, &records_to_table(&families))?;
        }
        Commands::TargetIds { species, ids } => {
            let species = parse_species(&species)?;
            let fetcher = TargetFetcher::new(HttpFetcher::with_headers(&config.headers)?, &config);
            let progress = IndicatifProgress::steps_bar(&multi, "Target ids");
            let links = fetcher.database_ids(&ids, species, progress.as_ref()).await?;
            output::write_records(&mut out, &links)?;
        }
        Commands::Summary {
            source,
            by,
            agency,
            kinase,
            path,
            width,
        } => {
            let (text, counts) = match source {
                Dataset::Ligands => {
                    let approvals = ligands(&config, &multi, &agency, kinase, path).await?;
                    let by = by.as_deref().or(Some("type"));
                    summary::render("Approved ligands", &approvals, by, width)
                }
                Dataset::Openfda => {
                    let records = nme_submissions(&config, &multi, path).await?;
                    let by = by.as_deref().or(Some("review_priority"));
                    summary::render("NME submissions", &records, by, width)
                }
                Dataset::Nme => {
                    let scraper = FdaScraper::from_config(config)?;
                    let table = all_reports(&scraper, &multi).await?;
                    let rows: Vec<_> = table_rows(&table).collect();
                    summary::render("NME approvals", &rows, by.as_deref(), width)
                }
            };
            println!("{text}");
            if cli.output.is_some() {
                output::write_records(&mut out, &counts)?;
            }
        }
    }

    Ok(())
}
