use crate::config::Config;
use crate::error::Result;
use crate::extract::{self, UserDirectoryClient};
use crate::generate::build_prompt;
use crate::load;
use crate::report::{EtlReport, RunStats};
use crate::types::{MessageGenerator, NewsItem, User, UserDocument};
use metrics::{counter, histogram};
use std::path::Path;
use tracing::{error, info, instrument, warn};

pub struct Pipeline;

impl Pipeline {
    /// Runs the full extract → generate → load pass and writes the
    /// aggregate report. Per-user failures are recorded and skipped; only a
    /// whole-input failure (unreadable CSV, listing endpoint down) aborts.
    #[instrument(skip(config, generator), fields(generator = generator.generator_name()))]
    pub async fn run(
        config: &Config,
        generator: &dyn MessageGenerator,
        csv_path: &Path,
        limit: Option<usize>,
    ) -> Result<EtlReport> {
        let output_dir = config.output.dir.as_str();
        counter!("etl_runs_total").increment(1);
        let t_run = std::time::Instant::now();
        let mut stats = RunStats::begin();
        let run_stamp = stats.run_stamp();

        // Phase 1: extract
        info!("🚀 Starting ETL run");
        println!("📥 Phase 1: extract");
        let users = Self::extract_users(config, csv_path, limit, &mut stats).await?;
        println!("✅ Extract complete: {} users loaded", users.len());

        // Phases 2 and 3: generate and load, one user at a time
        println!("🔄 Phase 2+3: generate and load");
        for user in &users {
            match generator.generate(user).await {
                Ok(message) => {
                    println!("🤖 {}: {}", user.name, message);
                    match Self::write_document(user, message, output_dir, &run_stamp) {
                        Ok(path) => {
                            counter!("etl_users_succeeded_total").increment(1);
                            stats.record_success(user.id, &user.name, path.clone());
                            println!("💾 Saved {path}");
                        }
                        Err(e) => {
                            error!("Failed to write document for user {}: {}", user.id, e);
                            counter!("etl_users_failed_total").increment(1);
                            stats.record_failure(user.id, &user.name, e.to_string());
                        }
                    }
                }
                Err(e) => {
                    error!("Generation failed for user {}: {}", user.id, e);
                    println!("⚠️  Generation failed for {}: {}", user.name, e);
                    counter!("etl_users_failed_total").increment(1);
                    stats.record_failure(user.id, &user.name, e.to_string());
                }
            }
        }

        // Phase 4: report
        println!("📊 Phase 4: report");
        let report = stats.finish();
        let report_path = load::write_report(&report, output_dir)?;
        histogram!("etl_run_duration_seconds").record(t_run.elapsed().as_secs_f64());
        info!(
            "ETL run {} finished: {} succeeded, {} failed of {}",
            report.run_id, report.succeeded, report.failed, report.total_users
        );
        println!("💾 Report written to {}", report_path.display());

        Ok(report)
    }

    /// Extracts and merges the input users. CSV IDs absent from the remote
    /// listing are recorded as failures here and never reach generation.
    async fn extract_users(
        config: &Config,
        csv_path: &Path,
        limit: Option<usize>,
        stats: &mut RunStats,
    ) -> Result<Vec<User>> {
        let mut ids = extract::read_user_ids(csv_path)?;
        if let Some(limit) = limit {
            ids.truncate(limit);
        }
        println!("   {} user IDs from {}", ids.len(), csv_path.display());

        let client = UserDirectoryClient::new(&config.users_api)?;
        let listing = client.list_users().await?;
        println!("   {} users in remote listing", listing.len());

        let outcome = extract::merge_listing(&ids, listing);
        for missing_id in &outcome.missing_ids {
            warn!("User {} missing from listing, counted as failed", missing_id);
            counter!("etl_users_failed_total").increment(1);
            stats.record_failure(*missing_id, "unknown", "not present in user listing");
        }
        Ok(outcome.users)
    }

    fn write_document(
        user: &User,
        message: String,
        output_dir: &str,
        run_stamp: &str,
    ) -> Result<String> {
        let document = UserDocument {
            user: user.clone(),
            news: vec![NewsItem::investment_advice(1, message)],
        };
        let path = load::write_user_document(&document, output_dir, run_stamp)?;
        Ok(path.to_string_lossy().to_string())
    }

    /// Dry run: extract and print the would-be prompts without calling the
    /// generation API or writing any files.
    pub async fn preview(config: &Config, csv_path: &Path, limit: Option<usize>) -> Result<()> {
        let mut stats = RunStats::begin();
        let users = Self::extract_users(config, csv_path, limit, &mut stats).await?;

        println!("📝 Prompts for {} users:", users.len());
        for user in &users {
            println!("\n--- user {} ({}) ---", user.id, user.name);
            println!("{}", build_prompt(user));
        }
        if stats.failed() > 0 {
            println!("\n⚠️  {} CSV IDs missing from the listing", stats.failed());
        }
        Ok(())
    }
}
