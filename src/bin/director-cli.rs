use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "director-cli")]
#[command(about = "Management CLI for the federation director", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8444")]
    url: String,

    #[arg(short, long, env = "DIRECTOR_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check director status and registry size
    Status,
    /// List namespaces and the servers advertising them
    Namespaces,
    /// Show which namespace and servers cover an object path
    Resolve {
        /// Object path, e.g. /chtc/PUBLIC/file.txt
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{base}/admin/status"))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Namespaces => {
            let res = client.get(format!("{base}/admin/namespaces"))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Resolve { path } => {
            let path = path.trim_start_matches('/');
            let res = client.get(format!("{base}/api/v1.0/director/namespace/{path}"))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: director returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
