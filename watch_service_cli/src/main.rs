use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use watch_service_cli::{
    diff::generate_diff,
    fetch::{PageFetcher, MAX_CONTENT_LENGTH},
    summary::{Summarizer, DEFAULT_MODEL},
    utils,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL to check
    #[arg(short, long)]
    url: String,

    /// Previously saved snapshot to diff against
    #[arg(short, long)]
    baseline: Option<PathBuf>,

    /// File the extracted text is written to
    #[arg(short, long, default_value = "snapshot.txt")]
    output: String,

    /// Maximum extracted content length (in characters)
    #[arg(short, long, default_value_t = MAX_CONTENT_LENGTH)]
    max_content_length: usize,

    /// Skip AI summarization
    #[arg(short, long)]
    skip_ai: bool,
}

#[derive(Serialize)]
struct CheckReport {
    url: String,
    fetched_at: DateTime<Utc>,
    chars: usize,
    diff: Option<String>,
    summary: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let fetcher = PageFetcher::with_max_content_length(args.max_content_length)?;
    let text = fetcher.fetch_page_text(&args.url).await?;
    println!("Fetched {} characters from {}", text.chars().count(), args.url);

    utils::save_text(&text, &args.output)?;

    let mut report = CheckReport {
        url: args.url.clone(),
        fetched_at: Utc::now(),
        chars: text.chars().count(),
        diff: None,
        summary: None,
    };

    let summary_input = match &args.baseline {
        Some(path) => {
            let old = std::fs::read_to_string(path)?;
            let diff = generate_diff(&old, &text);
            if diff.trim().is_empty() {
                println!("No changes detected against {}", path.display());
                utils::save_json(&serde_json::to_value(&report)?, "report.json")?;
                return Ok(());
            }
            println!("{diff}");
            report.diff = Some(diff.clone());
            diff
        }
        None => text.clone(),
    };

    if !args.skip_ai {
        let summarizer = Summarizer::new(env::var("OPENAI_API_KEY").ok(), DEFAULT_MODEL);
        let summary = summarizer.summarize(&summary_input).await;
        println!("{summary}");
        report.summary = Some(summary);
    }

    utils::save_json(&serde_json::to_value(&report)?, "report.json")?;
    Ok(())
}
