#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use clap::Parser;
use engine_audit::config::{CliOptions, ProjectConfig, DEFAULT_PATTERN};
use engine_audit::error::EXIT_ANALYSIS;
use engine_audit::output::OutputFormatter;
use engine_audit::{files, AuditError, Auditor, BuiltinDetector, CommandDetector, FeatureDetector};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive for logs
const LOG_ENV: &str = "ENGINE_AUDIT_LOG";

/// Check that the JavaScript features a project uses are supported by
/// every Node.js version its `engines.node` field allows.
#[derive(Parser, Debug)]
#[command(name = "engine-audit", version)]
struct Cli {
    /// Glob selecting the files to check, relative to the project root
    #[arg(default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Glob of files to skip, matched against root-relative paths
    #[arg(short, long, value_name = "GLOB")]
    exclude: Option<String>,

    /// List the files being checked and log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Manifest holding the engines field
    #[arg(long, value_name = "PATH")]
    manifest: Option<PathBuf>,

    /// Check against this range instead of the manifest's engines.node
    #[arg(long, value_name = "RANGE")]
    range: Option<String>,

    /// Project root
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    cwd: PathBuf,

    /// Print a machine-readable report
    #[arg(long)]
    json: bool,

    /// External detector command; receives source on stdin and prints
    /// a JSON array of {name, requiredVersion, line} objects
    #[arg(long, value_name = "COMMAND", value_parser = non_blank)]
    detector: Option<String>,

    /// Worker threads for file analysis
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn non_blank(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("detector command must not be empty".to_string())
    } else {
        Ok(value.to_string())
    }
}

impl Cli {
    fn options(&self) -> CliOptions {
        CliOptions {
            cwd: self.cwd.clone(),
            manifest: self.manifest.clone(),
            range: self.range.clone(),
            pattern: self.pattern.clone(),
            exclude: self.exclude.clone(),
        }
    }

    fn detector(&self) -> Box<dyn FeatureDetector> {
        match self.detector.as_deref().and_then(CommandDetector::from_command_line) {
            Some(command) => Box::new(command),
            None => Box::new(BuiltinDetector::new()),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut formatter = OutputFormatter::new();
    if cli.no_color {
        formatter = formatter.with_colors(false);
    }
    formatter.set_json_mode(cli.json);

    let stdout = io::stdout();
    let code = match run(&cli, &formatter, &mut stdout.lock()) {
        Ok(code) => code,
        Err(err) => report_failure(&formatter, &err),
    };
    std::process::exit(code);
}

fn init_logging(verbose: bool) {
    let default = if verbose { "engine_audit=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // Already initialised only happens under test harnesses
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli, formatter: &OutputFormatter, out: &mut impl Write) -> Result<i32> {
    let config = ProjectConfig::resolve(&cli.options())?;
    debug!(range = %config.declared_range, root = %config.root.display(), "configuration resolved");

    let files = files::resolve(
        &config.root,
        &config.include,
        config.exclude.as_deref(),
        &config.excluded_dirs,
    )
    .map_err(AuditError::from)?;

    if cli.verbose && !formatter.is_json() {
        out.write_all(formatter.file_list(&files).as_bytes())?;
        out.flush()?;
    }

    let mut auditor = Auditor::new(config.declared_range, cli.detector());
    if let Some(jobs) = cli.jobs {
        auditor = auditor.with_jobs(usize::from(jobs));
    }
    let run = auditor.run(&config.root, &files)?;

    out.write_all(formatter.report(&run).as_bytes())?;
    out.flush()?;
    Ok(run.exit_code())
}

/// Print a failure the way the report would have been printed and pick
/// the exit code. JSON consumers read errors from stdout too.
fn report_failure(formatter: &OutputFormatter, err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AuditError>() {
        Some(audit_err) => {
            let message = formatter.error(audit_err);
            if formatter.is_json() {
                print!("{}", message);
            } else {
                eprint!("{}", message);
            }
            audit_err.exit_code()
        }
        None => {
            eprintln!("engine-audit: {:#}", err);
            EXIT_ANALYSIS
        }
    }
}
