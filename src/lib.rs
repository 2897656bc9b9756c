//! # digiocean - A retrying client for the DigitalOcean v2 API
//!
//! digiocean maps droplets, images, SSH keys, sizes, regions, domains, domain
//! records, actions and the account onto typed async methods. Every call goes
//! through one request executor that authenticates, builds the URL, checks
//! the response and retries failed attempts with increasing delay.
//!
//! ## Quick Start
//!
//! ```no_run
//! use digiocean::{Client, CreateDroplet, DropletAction};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), digiocean::Error> {
//!     let client = Client::new("my-token")?;
//!
//!     let droplet = client
//!         .create_droplet(&CreateDroplet::new("web-1", "nyc3", "s-1vcpu-1gb", "ubuntu-22-04-x64"))
//!         .await?;
//!
//!     let action = client.droplet_action(droplet.id, &DropletAction::PowerCycle).await?;
//!     println!("action {} is {}", action.id, action.status);
//!
//!     for image in client.list_private_images().await? {
//!         println!("{} ({})", image.name, image.id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Automatic retries** - 25 attempts with a linear 1s, 2s, 3s... delay by default
//! - **Response shape checks** - a 2xx body missing its expected key is retried like any failure
//! - **Pluggable classification** - decide per error whether an attempt is worth repeating
//! - **Cancellation and deadlines** - stop a call during an attempt or during a backoff sleep
//! - **Structured logging** - every attempt, failure and backoff is reported through `tracing`
//! - **Rich errors** - API messages, raw bodies and rate limit headers are preserved
//!
//! ## Error Handling
//!
//! Only the error of the last attempt is returned:
//!
//! ```no_run
//! use digiocean::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new("my-token")?;
//! match client.get_droplet(3164494).await {
//!     Ok(droplet) => println!("{}", droplet.name),
//!     Err(Error::Api { status, message, .. }) => {
//!         eprintln!("API error {}: {}", status, message);
//!     }
//!     Err(Error::IncompleteResponse { expected, raw_response, .. }) => {
//!         eprintln!("response missing {}: {}", expected, raw_response);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry Configuration
//!
//! ```no_run
//! use digiocean::{Backoff, Client, RetryPolicy};
//! use digiocean::classify::{IdempotentOnly, RetryTransient};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), digiocean::Error> {
//! let client = Client::builder()
//!     .token("my-token")
//!     .retry_policy(RetryPolicy::new(
//!         5,
//!         Backoff::Exponential {
//!             initial_delay: Duration::from_millis(200),
//!             max_delay: Duration::from_secs(10),
//!             jitter: true,
//!         },
//!     ))
//!     .retry_classifier(IdempotentOnly::new(RetryTransient))
//!     .call_timeout(Duration::from_secs(60))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod classify;
mod client;
mod error;
pub mod models;
pub mod rate_limit;
mod request;
mod resources;
mod response;
pub mod retry;
mod shape;
pub mod transport;

pub use cancel::{Cancellation, Interrupt};
pub use client::{Client, ClientBuilder, API_URL_ENV_VAR, DEFAULT_BASE_URL, TOKEN_ENV_VAR};
pub use error::{Error, Result, TransportError};
pub use models::{
    Account, Action, CreateDomain, CreateDroplet, CreateSshKey, Domain, DomainRecord,
    DomainRecordRequest, Droplet, DropletAction, Image, ImageRef, ImageType, Region, Size,
    SshKey, UpdateImage, UpdateSshKey,
};
pub use rate_limit::RateLimitInfo;
pub use request::Request;
pub use response::Response;
pub use retry::{Backoff, RetryDecision, RetryError, RetryPolicy};
pub use shape::ResponseShape;
pub use tokio_util::sync::CancellationToken;
