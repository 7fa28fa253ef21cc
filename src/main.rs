use anyhow::Context;
use clap::Parser;
use log::{error, info, warn, LevelFilter};
use poolwatch::alerts::WebhookNotifier;
use poolwatch::collectors::StreamReader;
use poolwatch::config::{Config, EnvConfigProvider};
use poolwatch::monitor::{Monitor, MonitorSettings};
use std::path::PathBuf;

/// Command-line arguments for the pool watcher
#[derive(Parser)]
#[command(
    name = "poolwatch",
    about = "Access-log watcher that alerts on pool failovers and upstream 5xx spikes",
    long_about = "Tails an access log of key=value lines, tracks the active upstream pool, \
                  and posts deduplicated alerts to a webhook when the pool changes or the \
                  rolling upstream 5xx rate crosses a threshold."
)]
struct Cli {
    /// Access log to watch
    #[arg(value_name = "LOG_PATH")]
    log_path: PathBuf,

    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging output (debug level)")]
    verbose: bool,

    /// Wait for the log file to appear instead of exiting
    #[arg(long, help = "Block until LOG_PATH exists instead of failing at startup")]
    wait_for_file: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if self.log_path.exists() {
            if self.log_path.is_dir() {
                return Err(format!(
                    "Log path is a directory: {}",
                    self.log_path.display()
                ));
            }
        } else if !self.wait_for_file {
            return Err(format!(
                "Log file does not exist: {}",
                self.log_path.display()
            ));
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Configuration path is not a file: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Build the monitor from configuration and tail the log until it fails
fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let notifier = WebhookNotifier::new(
        config.notifier.webhook_url.clone(),
        config.notifier_timeout(),
    )
    .context("Failed to create webhook notifier")?;
    if !notifier.is_configured() {
        warn!("SLACK_WEBHOOK_URL not configured; alerts will only be logged");
    }

    let provider = EnvConfigProvider::new(config.alerts.maintenance_mode);
    let monitor = Monitor::new(
        MonitorSettings::from_config(&config),
        Box::new(notifier),
        Box::new(provider),
    );

    let reader = StreamReader::open(&cli.log_path, config.reader_options())
        .with_context(|| format!("Failed to open {}", cli.log_path.display()))?;

    monitor.run(reader).context("Monitoring stopped")?;
    Ok(())
}

fn main() {
    // Malformed arguments exit with status 2
    let cli = Cli::parse();

    init_logging(cli.verbose);
    info!("Starting pool watcher");

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = ctrlc::set_handler(|| {
        info!("Received interrupt signal (SIGINT), shutting down");
        std::process::exit(0);
    }) {
        warn!("Failed to install SIGINT handler: {}", e);
    }

    info!("Watching {}", cli.log_path.display());

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    info!("Pool watcher stopped");
}
