//! Benchmark driver: sweeps, interactive trials, default config.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use matbench::config::BenchConfig;
use matbench::counters::{CounterKind, CounterSession, PerfCounterSession};
use matbench::interactive::run_menu;
use matbench::kernels::Variant;
use matbench::runner::TrialResult;
use matbench::sink::CsvSink;
use matbench::sweep::run_sweep;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Dense matrix multiplication benchmark with cache-miss counters
#[derive(Parser, Debug)]
#[command(name = "matbench")]
#[command(author, version, about)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    sweep: SweepArgs,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full sweep and write a CSV (default)
    Sweep(SweepArgs),
    /// Pick a kernel and size from a menu, one trial at a time
    Interactive,
    /// Print the default matbench.toml
    Config,
}

#[derive(Args, Debug, Default)]
struct SweepArgs {
    /// Config file (default: nearest matbench.toml, else built-in sweep)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sizes for the unblocked and threaded variants (comma-separated)
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Sizes for the blocked variant (comma-separated)
    #[arg(long, value_delimiter = ',')]
    large_sizes: Option<Vec<usize>>,

    /// Block sizes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    block_sizes: Option<Vec<usize>>,

    /// Thread counts (comma-separated)
    #[arg(long, value_delimiter = ',')]
    threads: Option<Vec<usize>>,

    /// Restrict the sweep to these variants (repeatable)
    #[arg(long = "variant", value_enum)]
    variants: Vec<Variant>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, io::stderr().lock());
            ExitCode::from(1)
        }
    }
}

/// Writes a fatal error and its causes as a single line.
fn report_error(err: &anyhow::Error, mut out: impl Write) {
    let _ = writeln!(out, "error: {:#}", err);
}

fn init_logging(verbose: bool) {
    let default = if verbose { "matbench=debug" } else { "matbench=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Command::Sweep(args)) => sweep(&args),
        None => sweep(&cli.sweep),
        Some(Command::Interactive) => interactive(),
        Some(Command::Config) => {
            print!("{}", BenchConfig::default_toml());
            Ok(())
        }
    }
}

fn load_config(args: &SweepArgs) -> anyhow::Result<BenchConfig> {
    let path = args.config.clone().or_else(BenchConfig::discover);
    let mut config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            BenchConfig::load(&path)?
        }
        None => BenchConfig::default(),
    };

    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    if let Some(sizes) = &args.sizes {
        config.sweep.small_sizes = sizes.clone();
    }
    if let Some(sizes) = &args.large_sizes {
        config.sweep.large_sizes = sizes.clone();
    }
    if let Some(blocks) = &args.block_sizes {
        config.sweep.block_sizes = blocks.clone();
    }
    if let Some(threads) = &args.threads {
        config.sweep.thread_counts = threads.clone();
    }
    if !args.variants.is_empty() {
        config.sweep.variants = args.variants.clone();
    }
    Ok(config)
}

fn sweep(args: &SweepArgs) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let plan = config.plan();
    plan.validate()?;

    let path = &config.output.path;
    let mut sink = CsvSink::create(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let mut session = PerfCounterSession::open(&CounterKind::CACHE_MISSES)?;

    let outcome = run_sweep(&plan, &mut session, &mut sink);
    session.close();
    let outcome = outcome?;

    print_summary_table(&outcome.results);
    if !outcome.skipped.is_empty() {
        println!("Skipped {} trial(s):", outcome.skipped.len());
        for s in &outcome.skipped {
            println!("  {}: {}", s.spec, s.reason);
        }
    }
    println!("Benchmark results saved to {}", path.display());
    Ok(())
}

fn interactive() -> anyhow::Result<()> {
    let mut session = PerfCounterSession::open(&CounterKind::CACHE_MISSES)?;
    let stdin = io::stdin();
    let result = run_menu(stdin.lock(), io::stdout(), &mut session);
    session.close();
    Ok(result?)
}

/// Label for a summary row: variant plus its parameter, if any.
fn config_label(r: &TrialResult) -> String {
    match (r.block_size, r.threads) {
        (Some(bs), _) => format!("{} bs={}", r.variant, bs),
        (_, Some(t)) => format!("{} t={}", r.variant, t),
        _ => r.variant.to_string(),
    }
}

fn print_summary_table(results: &[TrialResult]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    let sizes: BTreeSet<usize> = results.iter().map(|r| r.size).collect();
    let mut rows: Vec<String> = Vec::new();
    for r in results {
        let label = config_label(r);
        if !rows.contains(&label) {
            rows.push(label);
        }
    }

    let width = 24 + sizes.len() * 14;
    println!("\n{}", "=".repeat(width));
    println!("SUMMARY (GFLOPS)");
    println!("{}", "=".repeat(width));

    print!("\n{:<24}", "Method");
    for n in &sizes {
        print!(" {:>13}", format!("{}×{}", n, n));
    }
    println!();
    println!("{}", "-".repeat(width));

    for label in &rows {
        print!("{:<24}", label);
        for &n in &sizes {
            match results
                .iter()
                .find(|r| r.size == n && &config_label(r) == label)
            {
                Some(r) => print!(" {:>10.3} GF", r.gflops),
                None => print!(" {:>13}", "-"),
            }
        }
        println!();
    }

    println!("{}", "=".repeat(width));
    println!("\nGF = GFLOPS (billion floating point operations per second)\n");
}
