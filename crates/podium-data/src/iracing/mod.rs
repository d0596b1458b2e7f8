//! iRacing members data API.
//!
//! Every data endpoint answers with a short-lived link to the real payload;
//! large result sets are additionally split into chunk files. The client hides
//! both and maps the payloads onto the crate's record types.
//!
//! # Example
//!
//! ```no_run
//! use podium_data::{Credentials, DataSource, IracingClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IracingClient::new(Credentials::new("me@example.com", "secret"))?;
//!     client.login().await?;
//!     for season in client.active_seasons().await? {
//!         println!("{} {}", season.season_id, season.series_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
mod wire;

pub use client::{Credentials, IracingClient};
