use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "keeper-cli")]
#[command(about = "Management CLI for the lottery keeper", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "KEEPER_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service status
    Status,
    /// Show the lottery contract snapshot
    Contract,
    /// Show the lottery contract balance
    Balance,
    /// Show the keeper wallet address
    Wallet,
    /// Show a participant of the current round
    Participant { index: u32 },
    /// Show the winner of a round
    Winner { round: u64 },
    /// Draw a winner now
    Draw,
    /// Start a new round
    NewRound,
    /// Point the lottery at the configured NFT contract
    SetNft,
}

impl Commands {
    fn request(&self) -> (Method, String) {
        match self {
            Commands::Status => (Method::GET, "status".to_string()),
            Commands::Contract => (Method::GET, "contract".to_string()),
            Commands::Balance => (Method::GET, "balance".to_string()),
            Commands::Wallet => (Method::GET, "wallet".to_string()),
            Commands::Participant { index } => (Method::GET, format!("participants/{}", index)),
            Commands::Winner { round } => (Method::GET, format!("winners/{}", round)),
            Commands::Draw => (Method::POST, "draw".to_string()),
            Commands::NewRound => (Method::POST, "round".to_string()),
            Commands::SetNft => (Method::POST, "nft".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let (method, path) = cli.command.request();
    let res = client
        .request(method, format!("{}/admin/{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;

    if !print_response(res).await? {
        std::process::exit(1);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(false);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(true)
}
