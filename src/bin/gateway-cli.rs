use clap::{Parser, Subcommand};
use reqwest::{redirect::Policy, StatusCode};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the session gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(short, long, env = "GATEWAY_PASSWORD")]
    password: String,

    /// Login form path on the gateway.
    #[arg(long, default_value = "/login")]
    login_path: String,

    #[arg(long, default_value = "/admin")]
    admin_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway version and uptime
    Status,
    /// Show session counts
    Sessions,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let admin = cli.admin_prefix.trim_end_matches('/');

    let client = reqwest::Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()?;

    let res = client
        .post(format!("{}{}", base, cli.login_path))
        .form(&[("username", &cli.username), ("password", &cli.password)])
        .send()
        .await?;
    if res.status() != StatusCode::FOUND {
        eprintln!("Error: login as {} was rejected", cli.username);
        std::process::exit(1);
    }

    let endpoint = match cli.command {
        Commands::Status => "status",
        Commands::Sessions => "sessions",
    };
    let res = client
        .get(format!("{}{}/{}", base, admin, endpoint))
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
