use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "shipping-cli")]
#[command(about = "Command-line client for the shipping service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a shipment by tracking number
    Track {
        tracking_number: String,
    },
    /// Look up the shipment for an order
    Order {
        order_id: i64,
    },
    /// Estimate shipping cost and transit time
    Estimate {
        #[arg(long)]
        origin: String,
        #[arg(long)]
        destination: String,
        #[arg(long)]
        weight: f64,
    },
    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::Track { tracking_number } => client
            .get(format!("{base}/api/v1/shipping/track"))
            .query(&[("tracking_number", tracking_number)]),
        Commands::Order { order_id } => {
            client.get(format!("{base}/api/v1/shipping/orders/{order_id}"))
        }
        Commands::Estimate {
            origin,
            destination,
            weight,
        } => client
            .get(format!("{base}/api/v1/shipping/estimate"))
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("weight", weight.to_string()),
            ]),
        Commands::Health => client.get(format!("{base}/health")),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: shipping service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
