use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use sortviz::config::{self, SessionConfig, SpeedLabel};
use sortviz::core::{Frame, Highlight, ObserverError, from_fn};
use sortviz::{Algorithm, Session};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "sortviz",
    version,
    about = "Watch a sorting algorithm work, one step per line"
)]
struct Cli {
    /// Algorithm to run: bubble, insertion, merge, quick or heap.
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    /// Number of random values to sort.
    #[arg(short, long)]
    size: Option<usize>,

    /// Pause after every step, in milliseconds.
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Seed for the random array.
    #[arg(long)]
    seed: Option<u64>,

    /// Sort these comma-separated values instead of a random array.
    #[arg(long, value_delimiter = ',')]
    values: Option<Vec<u32>>,

    /// JSON file with session settings; flags take precedence.
    #[arg(short, long, env = "SORTVIZ_CONFIG")]
    config: Option<PathBuf>,

    /// How each frame is printed.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// List the available algorithms and exit.
    #[arg(long)]
    list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.list {
        print_algorithms();
        return Ok(());
    }

    let config = load_config(&cli)?;
    let session = match cli.values.clone() {
        Some(values) => Session::with_array(values, config.algorithm, config.delay()),
        None => Session::new(config.clone())?,
    };

    info!(
        algorithm = session.algorithm().name(),
        len = session.snapshot().array.len(),
        speed = SpeedLabel::for_delay(session.delay()).as_str(),
        "starting sort"
    );

    let sampler = spawn_sampler(&session);

    let stdout = io::stdout();
    let format = cli.format;
    let observer = from_fn(move |frame: Frame<'_, u32>| {
        let line = match format {
            Format::Text => render_text(&frame),
            Format::Json => serde_json::to_string(&frame.to_snapshot())
                .map_err(|err| ObserverError::Other(Box::new(err)))?,
        };
        writeln!(stdout.lock(), "{line}").map_err(|err| ObserverError::Other(Box::new(err)))
    });

    let result = session.run(observer).await;
    sampler.abort();
    let report = result.context("sort did not complete")?;

    eprintln!(
        "{}: {} elements in {}, {} comparisons, {} writes",
        report.algorithm.name(),
        report.len,
        config::format_elapsed(report.elapsed),
        report.comparisons,
        report.writes,
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(algorithm) = cli.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(size) = cli.size {
        config.array_size = size;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.delay_ms = delay_ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    // Explicit values replace the random array, so its size is not checked.
    match &cli.values {
        Some(values) if values.is_empty() => bail!("--values needs at least one number"),
        Some(_) => config.validate_pacing_and_values(),
        None => config.validate(),
    }
    .context("invalid session settings")?;
    Ok(config)
}

/// Samples the shared counters on their own timer, like a statistics panel.
fn spawn_sampler(session: &Session) -> tokio::task::JoinHandle<()> {
    let counters = session.counters_handle();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(50));
        loop {
            ticker.tick().await;
            let sample = counters.snapshot();
            debug!(
                comparisons = sample.comparisons,
                writes = sample.writes,
                "counter sample"
            );
        }
    })
}

fn render_text(frame: &Frame<'_, u32>) -> String {
    let mut line = String::new();
    for (value, tag) in frame.array.iter().zip(frame.highlights) {
        let _ = match tag {
            Highlight::Default => write!(line, " {value} "),
            Highlight::Comparing => write!(line, "({value})"),
            Highlight::Swapping => write!(line, "[{value}]"),
            Highlight::Sorted => write!(line, " {value}*"),
        };
    }
    let _ = write!(
        line,
        "  | cmp {} wr {}",
        frame.counters.comparisons, frame.counters.writes
    );
    line
}

fn print_algorithms() {
    for algorithm in Algorithm::ALL {
        let cost = algorithm.complexity();
        println!(
            "{:<10} {:<15} {:<28} best {:<10} avg {:<10} worst {:<10} space {}",
            algorithm.id(),
            algorithm.name(),
            algorithm.summary(),
            cost.best,
            cost.average,
            cost.worst,
            cost.space,
        );
    }
}
