//! Lists droplets, sizes and the account behind a token.
//!
//! This example shows how to:
//! - Configure a client from `DIGITALOCEAN_TOKEN`
//! - Only retry transient failures of idempotent calls
//! - Bound a whole call with a deadline
//! - Inspect API errors
//!
//! Run with: `DIGITALOCEAN_TOKEN=... cargo run --example list_droplets`

use digiocean::classify::{IdempotentOnly, RetryTransient};
use digiocean::{ClientBuilder, Error};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "digiocean=debug,list_droplets=info".into()),
        )
        .init();

    let client = ClientBuilder::from_env()?
        .max_attempts(5)
        .retry_classifier(IdempotentOnly::new(RetryTransient))
        .timeout(Duration::from_secs(20))
        .call_timeout(Duration::from_secs(90))
        .build()?;

    let account = client.get_account().await?;
    println!("Account {} ({})", account.email, account.status);
    println!("Droplet limit: {}", account.droplet_limit);

    match client.list_droplets().await {
        Ok(droplets) if droplets.is_empty() => println!("No droplets"),
        Ok(droplets) => {
            for droplet in droplets {
                println!(
                    "{:>10}  {:<24} {:<8} {}",
                    droplet.id,
                    droplet.name,
                    droplet.status,
                    droplet.public_ipv4().unwrap_or("-")
                );
            }
        }
        Err(Error::Api {
            status, message, ..
        }) => {
            eprintln!("API error {}: {}", status, message);
        }
        Err(e) => return Err(e),
    }

    let sizes = client.list_sizes().await?;
    if let Some(cheapest) = sizes
        .iter()
        .filter(|s| s.available)
        .min_by(|a, b| a.price_monthly.total_cmp(&b.price_monthly))
    {
        println!(
            "Cheapest size: {} at ${}/mo",
            cheapest.slug, cheapest.price_monthly
        );
    }

    Ok(())
}
