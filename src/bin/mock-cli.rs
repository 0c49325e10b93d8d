use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "mock-cli")]
#[command(about = "Client for a running mock-router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:3100")]
    url: Url,

    /// Admin prefix configured on the server.
    #[arg(long, default_value = "/__mock")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one mock request and print the envelope
    Request {
        method: String,
        /// Path with optional query, e.g. /api/user/3?tab=posts
        path: String,
        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// List registered routes and conflicts
    Routes,
    /// Show server status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let admin = cli.prefix.trim_end_matches('/');

    let res = match cli.command {
        Commands::Request { method, path, data } => {
            let method = reqwest::Method::from_bytes(method.to_uppercase().as_bytes())?;
            let mut req = client.request(method, cli.url.join(&path)?);
            if let Some(data) = data {
                let body: Value = serde_json::from_str(&data)?;
                req = req.json(&body);
            }
            req.send().await?
        }
        Commands::Routes => {
            client
                .get(cli.url.join(&format!("{}/routes", admin))?)
                .send()
                .await?
        }
        Commands::Status => {
            client
                .get(cli.url.join(&format!("{}/status", admin))?)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
