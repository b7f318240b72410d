pub mod schema;

pub use schema::{BrowserConfig, CollectConfig, Config, OutputConfig, TargetUrl, Viewport};
