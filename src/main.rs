use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use invest_etl::config::{self, Config};
use invest_etl::generate::ChatCompletionGenerator;
use invest_etl::logging;
use invest_etl::pipeline::Pipeline;
use invest_etl::types::MessageGenerator;

#[derive(Parser)]
#[command(name = "invest_etl")]
#[command(about = "Demo ETL: placeholder users in, personalized investment messages out")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full extract → generate → load pipeline
    Run {
        /// CSV file with a UserID column selecting the users to process
        #[arg(long, default_value = "users.csv")]
        csv: PathBuf,
        /// Output directory for user documents and the report
        #[arg(long)]
        output_dir: Option<String>,
        /// Process at most this many users
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Extract users and print the would-be prompts without generating
    Preview {
        /// CSV file with a UserID column selecting the users to process
        #[arg(long, default_value = "users.csv")]
        csv: PathBuf,
        /// Process at most this many users
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Run { csv, output_dir, limit } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir;
            }

            let api_key = config::generation_api_key()?;
            let generator = ChatCompletionGenerator::new(&config.generation, api_key)?;
            println!("🚀 Running ETL pipeline ({})...", generator.generator_name());

            match Pipeline::run(&config, &generator, &csv, limit).await {
                Ok(report) => {
                    println!("\n📊 Run {} summary:", report.run_id);
                    println!("   Total users: {}", report.total_users);
                    println!("   Succeeded: {}", report.succeeded);
                    println!("   Failed: {}", report.failed);
                    println!("   Elapsed: {:.2}s", report.elapsed_seconds);
                    println!("\n📁 Check '{}' for the results", config.output.dir);
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Preview { csv, limit } => {
            println!("🔍 Previewing extraction and prompts...");
            if let Err(e) = Pipeline::preview(&config, &csv, limit).await {
                error!("Preview failed: {}", e);
                println!("❌ Preview failed: {}", e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}
