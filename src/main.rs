//! text-guards - Retrying output guards for text-producing operations
//!
//! # Usage
//!
//! ```bash
//! # Check an existing output (reads JSON from stdin, writes JSON to stdout)
//! echo '{"output":"I love my sock"}' | text-guards
//!
//! # Run a command through the configured guard chain
//! text-guards --exec 'my-llm-cli "tell me a joke"'
//!
//! # Load a CSV file as JSONL documents
//! text-guards --csv data.csv --source-column Team
//! ```

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use text_guards::{
    audit::{AuditEntry, AuditLogger},
    config::Config,
    engine::GuardEngine,
    input::CheckInput,
    loader::CsvLoader,
    operation::CommandOperation,
    output::{CheckOutput, RunOutput, Verdict},
    ExhaustionPolicy, GuardStatus,
};
use tracing_subscriber::EnvFilter;

/// Print version information
fn print_version() {
    println!("text-guards {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"text-guards - Retrying output guards for text-producing operations

USAGE:
    text-guards [OPTIONS]

OPTIONS:
    -h, --help                Print this help message
    -v, --version             Print version information
    -c, --config PATH         Path to config file
    -r, --retries N           Override general.retries
        --on-exhaustion P     return_last or fail
    -e, --exec CMD            Run CMD through the guard chain, print the result
        --csv PATH            Print the rows of a CSV file as JSONL documents
        --source-column COL   Column to use as each document's source

Without --exec or --csv, reads {{"output": "...", "protected": [...]}} from
stdin and prints a JSON verdict.

ENVIRONMENT:
    TEXT_GUARDS_DISABLED=1    Skip all guards (still logs)
    TEXT_GUARDS_LOG=debug     Diagnostic log filter (stderr)
"#
    );
}

/// Parse command line arguments
#[derive(Default)]
struct Args {
    help: bool,
    version: bool,
    config_path: Option<String>,
    retries: Option<i64>,
    on_exhaustion: Option<ExhaustionPolicy>,
    exec: Option<String>,
    csv: Option<String>,
    source_column: Option<String>,
    errors: Vec<String>,
}

impl Args {
    fn parse() -> Self {
        Self::parse_from(env::args())
    }

    fn parse_from<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let mut result = Args::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "-c" | "--config" | "-r" | "--retries" | "--on-exhaustion" | "-e" | "--exec"
                | "--csv" | "--source-column" => {
                    if i + 1 < args.len() {
                        result.set(&args[i], args[i + 1].clone());
                        i += 1;
                    } else {
                        result.errors.push(format!("{} requires a value", args[i]));
                    }
                }
                arg if arg.starts_with("--") && arg.contains('=') => {
                    if let Some((flag, value)) = arg.split_once('=') {
                        result.set(flag, value.to_string());
                    }
                }
                _ => {}
            }
            i += 1;
        }

        result
    }

    fn set(&mut self, flag: &str, value: String) {
        match flag {
            "-c" | "--config" => self.config_path = Some(value),
            "-r" | "--retries" => match value.parse() {
                Ok(retries) => self.retries = Some(retries),
                Err(_) => self
                    .errors
                    .push(format!("invalid value for {}: '{}' is not an integer", flag, value)),
            },
            "--on-exhaustion" => match ExhaustionPolicy::from_str(&value) {
                Some(policy) => self.on_exhaustion = Some(policy),
                None => self.errors.push(format!(
                    "invalid value for {}: '{}' (expected return_last or fail)",
                    flag, value
                )),
            },
            "-e" | "--exec" => self.exec = Some(value),
            "--csv" => self.csv = Some(value),
            "--source-column" => self.source_column = Some(value),
            _ => {}
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TEXT_GUARDS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle help and version
    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    if !args.errors.is_empty() {
        for error in &args.errors {
            eprintln!("Error: {}", error);
        }
        return ExitCode::from(2);
    }

    init_logging();

    if let Some(path) = &args.csv {
        return load_csv(path, args.source_column.as_deref());
    }

    // Load configuration
    let loaded = match &args.config_path {
        Some(path) => Config::load_from(std::path::Path::new(path)),
        None => Config::load(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    // Override retries if specified
    if let Some(retries) = args.retries {
        config.general.retries = retries;
        config.string.retries = None;
        config.custom.retries = None;
        config.restriction.retries = None;
    }

    if let Some(policy) = args.on_exhaustion {
        config.general.on_exhaustion = policy;
    }

    let engine = match GuardEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    // Create audit logger
    let audit_path = if config.general.audit_log {
        config.audit_path()
    } else {
        None
    };
    let mut logger = AuditLogger::new(audit_path.as_deref());

    match &args.exec {
        Some(command) => run_command(&engine, command, &mut logger),
        None => check_stdin(&engine, &mut logger),
    }
}

/// Run a command through the guard chain
fn run_command(engine: &GuardEngine, command: &str, logger: &mut AuditLogger) -> ExitCode {
    let result = engine.run(CommandOperation::new(command));

    let outer = engine.guard_names().last().map(|s| s.to_string());
    let entry = AuditEntry::for_run(
        &result,
        outer.as_deref(),
        &engine.redactor(),
        engine.is_disabled(),
    );
    if let Err(e) = logger.log(&entry) {
        eprintln!("Warning: Failed to write audit log: {}", e);
    }

    let (output, code) = match result {
        Ok(outcome) => {
            let status = match outcome.status {
                GuardStatus::Accepted => "accepted",
                GuardStatus::Exhausted => "exhausted",
            };
            let output = RunOutput {
                status,
                output: Some(outcome.output),
                attempts: Some(outcome.attempts),
                error: None,
            };
            (output, ExitCode::SUCCESS)
        }
        Err(e) => (RunOutput::failed(e.to_string()), ExitCode::FAILURE),
    };

    emit(&output.to_json());
    code
}

/// Check an output read from stdin
fn check_stdin(engine: &GuardEngine, logger: &mut AuditLogger) -> ExitCode {
    let stdin = io::stdin();
    let mut input_json = String::new();

    for line in stdin.lock().lines() {
        match line {
            Ok(line) => input_json.push_str(&line),
            Err(_) => break,
        }
    }

    // Handle empty input
    if input_json.trim().is_empty() {
        emit(&CheckOutput::from_verdict(&Verdict::pass("no output to check")).to_json());
        return ExitCode::SUCCESS;
    }

    // Fail closed on anything we cannot evaluate
    let input = match CheckInput::from_json(&input_json) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: Failed to parse input: {}", e);
            let verdict = Verdict::violation("parse-error", format!("Failed to parse input: {}", e));
            emit(&CheckOutput::from_verdict(&verdict).to_json());
            return ExitCode::FAILURE;
        }
    };

    let verdict = match engine.check(&input.output, &input.protected) {
        Ok(verdict) => verdict,
        Err(e) => {
            eprintln!("Error: {}", e);
            Verdict::violation("error", e.to_string())
        }
    };

    let redactor = engine.redactor().extended(&input.protected);
    let entry = AuditEntry::for_check(
        &input.output,
        &verdict,
        &redactor,
        input.session_id.as_deref(),
        engine.is_disabled(),
    );
    if let Err(e) = logger.log(&entry) {
        eprintln!("Warning: Failed to write audit log: {}", e);
    }

    emit(&CheckOutput::from_verdict(&verdict).to_json());
    if verdict.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print CSV rows as JSONL documents
fn load_csv(path: &str, source_column: Option<&str>) -> ExitCode {
    let mut loader = CsvLoader::new(path);
    if let Some(column) = source_column {
        loader = loader.source_column(column);
    }

    match loader.load() {
        Ok(documents) => {
            for doc in documents {
                emit(&doc.to_json());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn emit(line: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", line);
    let _ = handle.flush();
}
