//! Binary entrypoint for rigwatch.
//!
//! Startup order: load configuration, set up logging, build the datastore client,
//! register the operator profile and restore the last status, connect to rigctld, then
//! poll until rigctld closes the connection or Ctrl-C is pressed.
//!
//! Configuration, datastore initialization and the rigctld connection failures are
//! fatal (non-zero exit). Everything after that is logged and survived.
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use rigwatch::config::{Config, ConfigOverrides, DEFAULT_CONFIG_FILE};
use rigwatch::monitor::poller::{run_polling, PollExit, PollSchedule};
use rigwatch::monitor::{prepare, StatusMonitor};
use rigwatch::publisher::Publisher;
use rigwatch::rigctl::RigConnection;
use rigwatch::store::{FirebaseStore, MemoryStore, Store};

#[derive(Parser)]
#[command(name = "rigwatch")]
#[command(about = "Publish a hamlib radio's on-air status to Firebase")]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "RIGWATCH_CONFIG")]
    config: Option<String>,

    /// Operator callsign
    #[arg(long, env = "RIGWATCH_CALLSIGN")]
    callsign: Option<String>,

    /// Radio model shown on the dashboard
    #[arg(long, env = "RIGWATCH_RADIO")]
    radio: Option<String>,

    /// rigctld address (host:port)
    #[arg(long, env = "RIGWATCH_HAMLIB_SERVER")]
    hamlib_server: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "RIGWATCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Firebase project id
    #[arg(long, env = "RIGWATCH_FIREBASE_PROJECT")]
    firebase_project: Option<String>,

    /// Firebase Realtime Database URL
    #[arg(long, env = "RIGWATCH_FIREBASE_URL")]
    firebase_url: Option<String>,

    /// Path to a file holding the database auth token
    #[arg(long, env = "RIGWATCH_FIREBASE_TOKEN")]
    firebase_token: Option<String>,

    /// Log status writes instead of sending them to Firebase
    #[arg(long)]
    dry_run: bool,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            callsign: self.callsign.clone(),
            radio: self.radio.clone(),
            hamlib_server: self.hamlib_server.clone(),
            log_level: self.log_level.clone(),
            firebase_project: self.firebase_project.clone(),
            firebase_url: self.firebase_url.clone(),
            firebase_token: self.firebase_token.clone(),
        }
    }
}

async fn load_config(cli: &Cli) -> Result<Config> {
    let (path, required) = match &cli.config {
        Some(path) => (path.as_str(), true),
        None => (DEFAULT_CONFIG_FILE, false),
    };
    let mut config = Config::load_or_default(path, required).await?;
    config.apply_overrides(cli.overrides());
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).await;
    init_logging(config.as_ref().ok(), cli.verbose);
    let config = config.context("error loading config")?;
    info!("Starting rigwatch v{} for {}", env!("CARGO_PKG_VERSION"), config.callsign);

    if cli.dry_run {
        info!("Dry run: status writes are logged, not sent");
        run(&config, MemoryStore::announcing()).await
    } else {
        let store = FirebaseStore::from_config(&config)
            .await
            .context("error initializing firebase")?;
        info!("Using Firebase database {}", config.database_url());
        run(&config, store).await
    }
}

async fn run<S: Store>(config: &Config, store: S) -> Result<()> {
    let publisher = Publisher::new(store, config.status_path(), config.publish_timeout());
    let mut monitor = StatusMonitor::new(publisher);
    prepare(&mut monitor, &config.profile_path(), &config.radio).await;

    let mut rig = RigConnection::open(&config.hamlib.server, config.query_timeout())
        .await
        .context("error opening rigctld connection")?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let schedule = PollSchedule::from_config(config);
    let exit = run_polling(&mut rig, &mut monitor, schedule, shutdown).await;
    match exit {
        PollExit::Closed(reason) => info!("rigctld connection closed: {}", reason),
        PollExit::Shutdown => info!("Shutdown requested"),
    }
    rig.close().await;
    monitor.log_summary();
    Ok(())
}

fn init_logging(config: Option<&Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config.and_then(|c| c.log_level());
    let level = match verbosity {
        0 => configured.unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let mut open_error = None;
    let log_file = config
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .map_err(|e| open_error = Some((file.clone(), e)))
                .ok()
        });
    if let Some(f) = log_file {
        let file = std::sync::Mutex::new(f);
        // Foreground runs also echo to the console
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();

    if let Some((file, e)) = open_error {
        warn!("Failed to open log file {}: {}; logging to console only", file, e);
    }

    if let Some(cfg) = config {
        if verbosity == 0 && configured.is_none() {
            warn!("Unknown log level '{}', using info", cfg.logging.level);
        }
    }
}
