//! Runs a single generation cycle from the command line and prints the
//! articles and one card per platform.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use common::ContentStatus;
use newspost::bootstrap::{build_orchestrator, load_config};

#[derive(Parser, Debug)]
#[command(name = "try_cycle", about = "Run one news + content generation cycle")]
struct Args {
    /// Keywords to search news for and write about
    #[arg(long)]
    keywords: String,

    /// Target platform id; repeat for several (tiktok, pinterest, facebook, youtube, instagram)
    #[arg(long = "platform", required = true)]
    platforms: Vec<String>,

    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let config = load_config(args.config).await?;
    let orchestrator = build_orchestrator(&config)?;

    println!("\n{}", "=".repeat(60));
    println!("Keywords:  {}", args.keywords);
    println!("Platforms: {}", args.platforms.join(", "));
    println!("{}", "=".repeat(60));

    let state = match orchestrator.run_cycle(&args.keywords, &args.platforms).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("✗ Cycle failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("\nRelated news ({} articles):", state.articles.len());
    for (i, article) in state.articles.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, article.title, article.source);
        println!("     {}", article.description);
    }

    for card in &state.contents {
        println!("\n[{}]", card.platform);
        match card.status {
            ContentStatus::Ready => println!("{}", card.content),
            ContentStatus::Error => println!("✗ generation failed"),
            ContentStatus::Generating => println!("… still generating"),
        }
    }

    println!("\n{}", "=".repeat(60));
    Ok(ExitCode::SUCCESS)
}
