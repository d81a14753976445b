//! DigitalOcean API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Main client holding the API token and base URL
//! - [`http`] - HTTP utilities and typed API errors
//! - [`databases`] - Managed Databases logsink and metrics-credentials calls
//!
//! # Example
//!
//! ```ignore
//! use do_logsink::digitalocean::{client::DoClient, databases};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = DoClient::new("https://api.digitalocean.com", "dop_v1_...")?;
//!     let sink = databases::get_logsink(&client, "cluster-uuid", "sink-uuid").await?;
//!     println!("{}", sink.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod databases;
pub mod http;
