//! # eoka-harvest
//!
//! Collect every row of a virtualized HTML table. Pages that only render a
//! window of rows are scrolled through their container while the rendered rows
//! are sampled and deduplicated.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eoka_harvest::{Config, Harvester};
//!
//! # #[tokio::main]
//! # async fn main() -> eoka_harvest::Result<()> {
//! let config = Config::load("harvest.yaml")?;
//! let harvester = Harvester::new(&config.browser).await?;
//! let result = harvester.harvest(&config).await;
//! harvester.close().await?;
//! let collection = result?;
//! println!("{} rows", collection.rows.len());
//! # Ok(())
//! # }
//! ```

pub mod collector;
mod config;
pub mod dom;
pub mod output;
mod runner;
pub mod table;

pub use collector::{Collection, Collector, Pacing, StopReason};
pub use config::{BrowserConfig, CollectConfig, Config, OutputConfig, TargetUrl, Viewport};
pub use dom::{DomAccess, PageDom};
pub use runner::{harvest_url, Harvester};
pub use table::{HeaderSet, IdentityMode, Row, RowIdentity, RowShape};

/// Result type for eoka-harvest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or collection.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("unexpected page response: {0}")]
    Script(String),

    #[error("no table element found within {timeout_ms}ms")]
    TableNotFound { timeout_ms: u64 },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
