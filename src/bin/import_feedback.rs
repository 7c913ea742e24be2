//! Imports a JSON array of feedback submissions, analyzing and storing each.
//!
//! Usage: `import_feedback <file.json>`

use feedback_insights_api::analyzer::TextAnalyzer;
use feedback_insights_api::config::Config;
use feedback_insights_api::db::Database;
use feedback_insights_api::db_storage::FeedbackStorage;
use feedback_insights_api::models::{FeedbackCreate, NewFeedback};
use feedback_insights_api::report::build_report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Usage: import_feedback <file.json>"))?;

    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;
    let storage = FeedbackStorage::new(db.pool.clone());
    let analyzer = TextAnalyzer::from_config(&config)?;

    let content = tokio::fs::read_to_string(&path).await?;
    let submissions: Vec<FeedbackCreate> = serde_json::from_str(&content)?;

    let total = submissions.len();
    println!("Importing {} feedback entries from {}\n", total, path);

    let mut success_count = 0;
    let mut fail_count = 0;

    for (idx, submission) in submissions.into_iter().enumerate() {
        let analysis = match analyzer.analyze(&submission.text).await {
            Ok(a) => a,
            Err(e) => {
                println!("[{}/{}] ✗ Analysis failed: {}", idx + 1, total, e);
                fail_count += 1;
                continue;
            }
        };

        match storage
            .insert(&NewFeedback::from_analysis(submission, &analysis))
            .await
        {
            Ok(record) => {
                println!(
                    "[{}/{}] ✓ Stored id {} - {} ({:.2}){}",
                    idx + 1,
                    total,
                    record.id,
                    record.sentiment,
                    record.confidence,
                    if record.urgency { " URGENT" } else { "" }
                );
                success_count += 1;
            }
            Err(e) => {
                println!("[{}/{}] ✗ Storage failed: {}", idx + 1, total, e);
                fail_count += 1;
            }
        }
    }

    println!("\n=== Import Summary ===");
    println!("Total: {}", total);
    println!("Success: {}", success_count);
    println!("Failed: {}", fail_count);

    let report = build_report(&storage.list_all().await?);
    println!("\n=== Current Report ===");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
