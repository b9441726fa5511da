use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use py_perf::fix::{refactor_source, write_atomically};
use py_perf::{Config, Engine, SourceFormatter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "py-perf")]
#[command(about = "Heuristic performance analysis and list-comprehension rewrites for Python")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to analyze (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Output format (defaults to the config file's [output] format)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Exit with an error if any finding is reported
    #[arg(long)]
    fail_on_findings: bool,

    /// Show timing information
    #[arg(long)]
    timing: bool,

    /// Increase log verbosity (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a Python file or directory (default)
    Check {
        /// File or directory to analyze
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Exit with an error if any finding is reported
        #[arg(long)]
        fail_on_findings: bool,

        /// Show timing information
        #[arg(long)]
        timing: bool,
    },
    /// Rewrite top-level append loops into list comprehensions
    Refactor {
        /// Python file to rewrite
        file: PathBuf,

        /// Write the result back to the file instead of printing it
        #[arg(long)]
        write: bool,

        /// Skip the configured formatter
        #[arg(long)]
        no_format: bool,
    },
    /// Initialize py-perf.toml config
    Init,
    /// List available rules
    Rules,
    /// Explain a specific rule in detail
    Explain {
        /// Rule ID to explain (e.g., "range-len-iteration")
        rule_id: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Console,
    Json,
}

impl OutputFormat {
    fn from_config(config: &Config) -> Self {
        match config.output.format.as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Console,
        }
    }
}

struct CheckOptions {
    format: Option<OutputFormat>,
    fail_on_findings: bool,
    timing: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Check {
            path,
            format,
            fail_on_findings,
            timing,
        }) => run_check(
            &path,
            CheckOptions {
                format: format.or(cli.format),
                fail_on_findings: fail_on_findings || cli.fail_on_findings,
                timing: timing || cli.timing,
            },
        ),
        None => run_check(
            &cli.path,
            CheckOptions {
                format: cli.format,
                fail_on_findings: cli.fail_on_findings,
                timing: cli.timing,
            },
        ),
        Some(Commands::Refactor {
            file,
            write,
            no_format,
        }) => run_refactor(&file, write, no_format),
        Some(Commands::Init) => run_init(&cli.path),
        Some(Commands::Rules) => run_list_rules(),
        Some(Commands::Explain { rule_id }) => run_explain(&rule_id),
    }
}

fn apply_color_setting(config: &Config) {
    match config.output.color.as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => {}
    }
}

fn run_check(path: &Path, options: CheckOptions) -> Result<()> {
    let config = Config::load_or_default(path)?;
    apply_color_setting(&config);
    let format = options
        .format
        .unwrap_or_else(|| OutputFormat::from_config(&config));

    let start = Instant::now();
    let reports = Engine::new().analyze_path(path)?;
    let analysis_time = start.elapsed();

    match format {
        OutputFormat::Console => py_perf::reporter::console::report(&reports),
        OutputFormat::Json => py_perf::reporter::json::report(&reports)?,
    }

    let (findings, failures) = py_perf::reporter::console::count_findings(&reports);

    if options.timing {
        eprintln!();
        eprintln!("{}", "Timing:".bold());
        eprintln!("  Analysis time: {:?}", analysis_time);
        eprintln!("  Files:         {}", reports.len());
        eprintln!("  Findings:      {}", findings);
        eprintln!("  Parse errors:  {}", failures);
    }

    if options.fail_on_findings && findings > 0 {
        anyhow::bail!("Found {} finding(s)", findings);
    }

    Ok(())
}

fn run_refactor(file: &Path, write: bool, no_format: bool) -> Result<()> {
    let config = Config::load_or_default(file)?;
    let source = py_perf::engine::read_source(file)?;

    let formatter = if no_format { None } else { config.formatter() };
    let output = refactor_source(
        &source,
        formatter.as_ref().map(|f| f as &dyn SourceFormatter),
    )
    .with_context(|| format!("Failed to refactor {}", file.display()))?;

    if !write {
        print!("{}", output.source);
        return Ok(());
    }

    if output.applied.is_empty() {
        eprintln!("{}", "No append loops to rewrite.".yellow());
        return Ok(());
    }

    write_atomically(file, &output.source)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    for rewrite in &output.applied {
        eprintln!(
            "  {} {}:{} - `{}` built with a list comprehension",
            "rewrote".cyan(),
            file.display(),
            rewrite.line,
            rewrite.name
        );
    }
    eprintln!(
        "{}",
        format!("Rewrote {} loop(s).", output.applied.len()).green()
    );
    Ok(())
}

fn run_init(path: &Path) -> Result<()> {
    let config_path = path.join(py_perf::config::CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", py_perf::config::CONFIG_FILE);
    }
    std::fs::write(&config_path, Config::default_toml())?;
    println!("Created {}", config_path.display());
    Ok(())
}

fn run_list_rules() -> Result<()> {
    use py_perf::rules::registry;

    println!("Available rules:\n");
    for rule in registry::all_rules() {
        println!(
            "  {:<24} [{}] {}",
            rule.id(),
            rule.kind(),
            rule.description()
        );
    }
    println!("\nUse `py-perf explain <rule-id>` for detailed information.");
    Ok(())
}

fn run_explain(rule_id: &str) -> Result<()> {
    use py_perf::rules::registry;

    let rule = match registry::get_rule(rule_id) {
        Some(r) => r,
        None => {
            eprintln!("{} Unknown rule: {}", "error:".red().bold(), rule_id);
            eprintln!("\nAvailable rules:");
            for r in registry::all_rules() {
                eprintln!("  {}", r.id());
            }
            anyhow::bail!("Unknown rule: {}", rule_id);
        }
    };

    println!("{}", rule.name().bold().underline());
    println!("Rule ID: {}", rule.id().cyan());
    println!("Reported as: {}", rule.kind());
    println!();
    println!("{}", rule.description());
    println!();

    print_rule_explanation(rule.id());

    println!();
    println!("{} {}", "Suggestion:".cyan().bold(), rule.kind().suggestion());
    Ok(())
}

fn print_rule_explanation(rule_id: &str) {
    match rule_id {
        "string-concat-in-loop" => {
            println!("{}", "Why it matters:".yellow().bold());
            println!("  Strings are immutable; each += builds a new string and copies the");
            println!("  old contents, so a loop of n concatenations does O(n^2) work.");
            println!();
            println!("{}", "Bad:".red().bold());
            println!("  out = \"\"");
            println!("  for word in words:");
            println!("      out += word");
            println!();
            println!("{}", "Good:".green().bold());
            println!("  out = \"\".join(words)");
            println!();
            println!("{}", "Note:".yellow().bold());
            println!("  Every `name += ...` is reported, inside a loop or not.");
        }

        "list-append-in-loop" => {
            println!("{}", "Why it matters:".yellow().bold());
            println!("  A comprehension avoids the attribute lookup and call per item");
            println!("  and states the intent in one expression.");
            println!();
            println!("{}", "Bad:".red().bold());
            println!("  result = []");
            println!("  for x in items:");
            println!("      result.append(f(x))");
            println!();
            println!("{}", "Good:".green().bold());
            println!("  result = [f(x) for x in items]");
            println!();
            println!("{}", "Auto-fix available:".cyan().bold());
            println!("  Top-level occurrences are rewritten by `py-perf refactor`.");
        }

        "range-len-iteration" => {
            println!("{}", "Why it matters:".yellow().bold());
            println!("  Indexing back into the sequence on every iteration is slower");
            println!("  and noisier than iterating it directly.");
            println!();
            println!("{}", "Bad:".red().bold());
            println!("  for i in range(len(items)):");
            println!("      print(i, items[i])");
            println!();
            println!("{}", "Good:".green().bold());
            println!("  for i, item in enumerate(items):");
            println!("      print(i, item)");
        }

        "membership-test" => {
            println!("{}", "Why it matters:".yellow().bold());
            println!("  `x in some_list` scans the list, O(n) per test. A set answers in");
            println!("  O(1) on average.");
            println!();
            println!("{}", "Bad:".red().bold());
            println!("  for user in users:");
            println!("      if user in banned:");
            println!("          reject(user)");
            println!();
            println!("{}", "Good:".green().bold());
            println!("  banned_set = set(banned)");
            println!("  for user in users:");
            println!("      if user in banned_set:");
            println!("          reject(user)");
        }

        "sort-in-loop" => {
            println!("{}", "Why it matters:".yellow().bold());
            println!("  Sorting costs O(n log n). Doing it on every iteration multiplies");
            println!("  that by the loop's trip count.");
            println!();
            println!("{}", "Bad:".red().bold());
            println!("  for item in incoming:");
            println!("      queue.append(item)");
            println!("      queue.sort()");
            println!();
            println!("{}", "Good:".green().bold());
            println!("  queue.extend(incoming)");
            println!("  queue.sort()");
            println!();
            println!("{}", "Note:".yellow().bold());
            println!("  Every `sorted(...)` and `.sort()` call is reported, inside a loop or not.");
        }

        _ => {
            println!("No detailed explanation available for this rule.");
            println!("Run `py-perf rules` to see all available rules.");
        }
    }
}
