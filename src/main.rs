use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::time::Duration;
use stepwatch::cli::Cli;
use stepwatch::clock::{ManualClock, SystemClock};
use stepwatch::config::ProfileConfig;
use stepwatch::events::{self, ReplayOptions, StepPattern};
use stepwatch::hook::ProfileHook;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Environment first, then command-line overrides
fn resolve_config(args: &Cli) -> Result<ProfileConfig> {
    let mut config = ProfileConfig::from_env()?.with_format(args.format);
    if let Some(top) = args.top {
        config = config.with_top_n(top);
    }
    if args.disable {
        config = config.with_disabled(true);
    }
    Ok(config)
}

/// Open the event input; stdin when no path or `-` is given
fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

fn run_live(args: &Cli, config: &ProfileConfig, input: Box<dyn BufRead>) -> Result<()> {
    let pattern = StepPattern::new(&args.pattern)?;
    let mut hook = ProfileHook::new(SystemClock::new(), config, io::stdout());

    let mut echo = io::stdout();
    let passthrough = args.passthrough.then_some(&mut echo as &mut dyn Write);

    let stats = events::follow(input, &pattern, &mut hook, passthrough)?;
    tracing::debug!("live run finished after {} steps", stats.events);
    Ok(())
}

fn run_replay(args: &Cli, config: &ProfileConfig, input: Box<dyn BufRead>) -> Result<()> {
    let start = args
        .start
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("--start must be a non-negative number of seconds")?;
    let options = ReplayOptions {
        start,
        strict: args.strict,
    };

    let clock = ManualClock::new();
    let mut hook = ProfileHook::new(&clock, config, io::stdout());

    let stats = events::replay(input, &clock, &mut hook, options)?;
    if stats.malformed > 0 {
        tracing::warn!("{} malformed event lines skipped", stats.malformed);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    // Configuration is resolved once, before the run starts
    let config = resolve_config(&args)?;
    let input = open_input(args.input.as_deref())?;

    if args.live {
        run_live(&args, &config, input)
    } else {
        run_replay(&args, &config, input)
    }
}
