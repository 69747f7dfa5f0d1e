use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "host-cli")]
#[command(about = "Inspection CLI for a running handler host", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check liveness
    Health,
    /// List the debug endpoints
    Routes,
    /// Show runtime information
    Runtime,
    /// Show the host's command line
    Cmdline,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let path = match cli.command {
        Commands::Health => "/health/liveness",
        Commands::Routes => "/debug/process/",
        Commands::Runtime => "/debug/process/runtime",
        Commands::Cmdline => "/debug/process/cmdline",
    };

    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), path))
        .send()
        .await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Err(e) = ensure_success(status) {
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        return Err(e.into());
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        // Plain text bodies ("up", NUL-separated argv).
        Err(_) => println!("{}", text.replace('\0', " ")),
    }
    Ok(())
}

/// Non-2xx replies fail the command so scripts can use it as a check.
fn ensure_success(status: reqwest::StatusCode) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("host returned status {}", status))
    }
}
