use clap::{Parser, ValueEnum};
use eoka_harvest::{Config, IdentityMode};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_URL: &str =
    "https://www.timeshighereducation.com/world-university-rankings/latest/world-ranking";

#[derive(Clone, Copy, ValueEnum)]
enum Identity {
    /// First two cells
    Leading,
    /// Every cell
    #[value(name = "full_row")]
    FullRow,
}

impl From<Identity> for IdentityMode {
    fn from(value: Identity) -> Self {
        match value {
            Identity::Leading => IdentityMode::Leading,
            Identity::FullRow => IdentityMode::FullRow,
        }
    }
}

#[derive(Parser)]
#[command(name = "eoka-harvest")]
#[command(about = "Collect every row of a virtualized table into CSV")]
#[command(version)]
struct Cli {
    /// Config file (optional; flags override it)
    config: Option<PathBuf>,

    /// Page URL to scrape
    #[arg(long)]
    url: Option<String>,

    /// CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run browser in headless mode
    #[arg(long)]
    headless: bool,

    /// Don't save CSV, just check extraction
    #[arg(long)]
    dry_run: bool,

    /// Minimum wait between actions (seconds)
    #[arg(long, value_name = "SECS")]
    min_wait: Option<f64>,

    /// Maximum wait between actions (seconds)
    #[arg(long, value_name = "SECS")]
    max_wait: Option<f64>,

    /// How rows are told apart when deduplicating
    #[arg(long, value_enum)]
    identity: Option<Identity>,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn secs_to_ms(secs: f64) -> eoka_harvest::Result<u64> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(eoka_harvest::Error::Config(format!(
            "invalid wait: {}s",
            secs
        )));
    }
    Ok((secs * 1000.0).round() as u64)
}

impl Cli {
    fn into_config(self) -> eoka_harvest::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::for_url(DEFAULT_URL),
        };
        if let Some(url) = self.url {
            config.target.url = url;
        }
        if let Some(path) = self.output {
            config.output.path = path;
        }
        if self.headless {
            config.browser.headless = true;
        }
        if self.dry_run {
            config.output.dry_run = true;
        }
        if let Some(secs) = self.min_wait {
            config.collect.min_wait_ms = secs_to_ms(secs)?;
        }
        if let Some(secs) = self.max_wait {
            config.collect.max_wait_ms = secs_to_ms(secs)?;
        }
        if let Some(identity) = self.identity {
            config.collect.identity = identity.into();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> eoka_harvest::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let check = cli.check;
    let config = cli.into_config()?;

    if check {
        println!("Config valid: {}", config.name);
        println!("  Target: {}", config.target.url);
        println!("  Output: {}", config.output.path.display());
        println!(
            "  Waits: {}-{}ms",
            config.collect.min_wait_ms, config.collect.max_wait_ms
        );
        println!(
            "  Limits: {} iterations, {} passes",
            config.collect.max_iterations, config.collect.max_passes
        );
        if let Some(ms) = config.collect.timeout_ms {
            println!("  Timeout: {}ms", ms);
        }
        return Ok(());
    }

    println!("Loading {} ...", config.target.url);
    let collection = match eoka_harvest::harvest_url(&config).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Extracted {} rows; {} headers found.",
        collection.rows.len(),
        collection.headers.len()
    );
    println!("  Stopped: {}", collection.stop);
    if let Some(total) = collection.expected_total {
        println!("  Advertised: {}", total);
    }

    if config.output.dry_run {
        println!("Dry-run enabled, not saving CSV.");
    } else if eoka_harvest::output::write_csv(&config.output.path, &collection)? {
        println!(
            "Saved {} rows to {}",
            collection.rows.len(),
            config.output.path.display()
        );
    }

    Ok(())
}
