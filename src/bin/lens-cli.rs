use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "lens-cli")]
#[command(about = "Command-line client for the research-lens API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health and cache size
    Health,
    /// Analyze a research topic
    Analyze { topic: String },
    /// Analyze a topic, then generate a proposal from the analysis
    Proposal { topic: String },
    /// Drop every cached report and paper set
    ClearCache,
    /// Remove expired cache entries
    SweepCache,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Analyze { topic } => {
            let res = client
                .post(format!("{}/analyze", cli.url))
                .json(&json!({ "topic": topic }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Proposal { topic } => {
            let res = client
                .post(format!("{}/analyze", cli.url))
                .json(&json!({ "topic": topic }))
                .send()
                .await?;
            let Some(analysis) = read_json(res).await? else {
                return Ok(());
            };

            let res = client
                .post(format!("{}/generate-proposal", cli.url))
                .json(&json!({
                    "topic": topic,
                    "research_gaps": analysis["research_gaps"],
                    "research_questions": analysis["research_questions"],
                    "methodology_suggestions": analysis["methodology_suggestions"],
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ClearCache => {
            let res = client.post(format!("{}/cache/clear", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::SweepCache => {
            let res = client.post(format!("{}/cache/sweep", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Body of a successful response; errors are reported on stderr.
async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    Ok(Some(res.json().await?))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(json) = read_json(res).await? {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}
