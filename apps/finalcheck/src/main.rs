//! FinalCheck - label compliance verification
//!
//! Lists the standard and product catalogs, prints the analyzer
//! instructions for a selection, and replays recorded analyzer responses
//! through the compliance pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use compliance_engine::analyzer::RecordedAnalyzer;
use compliance_engine::{AnalysisRequest, ComplianceEngine, EngineConfig, ProductCatalog};

mod reporter;

use reporter::{OutputFormat, Reporter};

#[derive(Parser, Debug)]
#[command(name = "finalcheck")]
#[command(version, about = "Label compliance verification")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the registered standards
    Standards,
    /// List product types and the standards they require
    Products,
    /// Print the analyzer instructions for a selection
    Prompt(Selection),
    /// Run the pipeline over recorded analyzer responses (one entry per page)
    Replay {
        /// JSON array of response texts or {"error": "..."} entries
        responses: PathBuf,

        #[command(flatten)]
        selection: Selection,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Console)]
        format: OutputFormat,
    },
}

#[derive(Args, Debug)]
struct Selection {
    /// Standard identifier (repeatable)
    #[arg(short, long = "standard", conflicts_with = "product")]
    standards: Vec<String>,

    /// Product type key; selects its required standards
    #[arg(short, long)]
    product: Option<String>,
}

impl Selection {
    fn request(&self, engine: &ComplianceEngine) -> Result<AnalysisRequest> {
        let request = match &self.product {
            Some(product) => engine.request_for_product(product)?,
            None => engine.request(self.standards.as_slice())?,
        };
        Ok(request)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Reports go to stdout, so logs must stay on stderr
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("finalcheck=info".parse()?)
                .add_directive("compliance_engine=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = ComplianceEngine::from_config(&config).context("Invalid configuration")?;

    match cli.command {
        Command::Standards => {
            for standard in engine.registry().all() {
                println!("{}  {}", standard.id, standard.name);
            }
        }
        Command::Products => {
            for product in ProductCatalog::all() {
                println!(
                    "{}  {} / {} [{}]: {}",
                    product.key,
                    product.name.en,
                    product.name.ja,
                    product.category,
                    product.required_standards().join(", ")
                );
            }
        }
        Command::Prompt(selection) => {
            let request = selection.request(&engine)?;
            println!("{}", request.instruction_text());
        }
        Command::Replay {
            responses,
            selection,
            format,
        } => {
            let request = selection.request(&engine)?;
            let analyzer = RecordedAnalyzer::from_file(&responses)?;
            tracing::info!(
                "Replaying {} recorded pages from {}",
                analyzer.page_count(),
                responses.display()
            );

            let outcome = engine
                .run(&analyzer, &request, &analyzer.placeholder_pages())
                .await;
            Reporter::new(format).report(&outcome)?;

            if !outcome.report.overall_compliance {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
