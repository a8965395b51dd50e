mod config;
mod demos;
mod policy;
mod signals;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ripple_core::CancelContext;
use std::path::PathBuf;
use tracing::info;

use config::{DemoConfig, LogFormat};
use policy::{ErrorPolicy, Outcome, drain};

#[derive(Parser, Debug)]
#[command(name = "ripple")]
#[command(about = "Ripple demos - observables from values, timers and channels", long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides config; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Reaction to an error event
    #[arg(long, global = true, value_enum)]
    on_error: Option<ErrorPolicy>,

    /// Resubscription limit for `--on-error retry`
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    #[command(subcommand)]
    demo: Demo,
}

#[derive(Subcommand, Debug)]
enum Demo {
    /// Emit fixed values
    Just {
        #[arg(default_values_t = [1, 2, 3])]
        values: Vec<i64>,
    },
    /// Take N ticks from a timer
    Interval {
        #[arg(long)]
        period_ms: Option<u64>,
        #[arg(long)]
        take: Option<usize>,
    },
    /// Watch a timer for a fixed window, then cancel it
    OnNext {
        #[arg(long)]
        period_ms: Option<u64>,
        #[arg(long)]
        window_ms: Option<u64>,
    },
    /// Drain a channel fed by a timer until the feeder closes it
    FromChannel {
        #[arg(long)]
        window_ms: Option<u64>,
        #[arg(long)]
        take: Option<usize>,
    },
    /// Values 1..=5 whose tap rejects one value
    Faulty {
        #[arg(long, default_value_t = 3)]
        fail_at: i64,
    },
}

impl Args {
    fn load_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::from_file(path)?,
            None => DemoConfig::default(),
        };

        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(policy) = self.on_error {
            config.errors.policy = policy;
        }
        if let Some(max_retries) = self.max_retries {
            config.errors.max_retries = max_retries;
        }

        match self.demo {
            Demo::Interval { period_ms, take } => {
                config.interval.period_ms = period_ms.unwrap_or(config.interval.period_ms);
                config.interval.take = take.unwrap_or(config.interval.take);
            }
            Demo::OnNext {
                period_ms,
                window_ms,
            } => {
                config.interval.period_ms = period_ms.unwrap_or(config.interval.period_ms);
                config.interval.window_ms = window_ms.unwrap_or(config.interval.window_ms);
            }
            Demo::FromChannel { window_ms, take } => {
                config.event_source.window_ms = window_ms.unwrap_or(config.event_source.window_ms);
                config.event_source.take = take.unwrap_or(config.event_source.take);
            }
            Demo::Just { .. } | Demo::Faulty { .. } => {}
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(config: &DemoConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn run(demo: &Demo, config: &DemoConfig, root: &CancelContext) -> Result<Outcome> {
    let policy = config.errors.policy;
    let retries = config.errors.max_retries;

    match demo {
        Demo::Just { values } => drain(|| demos::just(values.clone()), root, policy, retries).await,
        Demo::Interval { .. } => {
            let take = config.interval.take;
            drain(|| demos::interval(config.period(), take), root, policy, retries).await
        }
        Demo::OnNext { .. } => {
            let window = root.child();
            let stop = window.clone();
            let after = config.interval_window();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                info!("window elapsed, cancelling");
                stop.cancel();
            });
            drain(|| demos::on_next(config.period()), &window, policy, retries).await
        }
        Demo::FromChannel { .. } => {
            drain(|| demos::from_channel(config, root), root, policy, retries).await
        }
        Demo::Faulty { fail_at } => {
            let fail_at = *fail_at;
            drain(|| demos::faulty(fail_at), root, policy, retries).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;
    init_tracing(&config);

    info!("Starting ripple v{}", env!("CARGO_PKG_VERSION"));

    let root = CancelContext::new();
    signals::cancel_on_shutdown(root.clone());

    let outcome = run(&args.demo, &config, &root).await?;
    info!(
        values = outcome.values,
        completed = outcome.completed,
        errors = outcome.errors,
        attempts = outcome.attempts,
        "demo finished"
    );

    Ok(())
}
