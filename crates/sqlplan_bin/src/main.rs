use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use sqlplan::types::ScalarValue;
use sqlplan::{BasicSessionContext, PlanError, parse, parse_one};
use tracing::{Level, debug};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Plan(#[from] PlanError),
}

#[derive(Parser)]
#[clap(name = "sqlplan")]
struct Arguments {
    /// Database the statements are planned against.
    #[clap(long, short = 'd', default_value = "mydb")]
    database: String,

    /// Set a variable before planning, `name=value` for a user variable or
    /// `@@name=value` for a session variable. May be repeated.
    #[clap(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// Client account as `user@host`.
    #[clap(long, default_value = "root@localhost")]
    user: String,

    /// Treat each input as several `;` separated statements.
    #[clap(long)]
    multi: bool,

    /// Statement text to plan instead of reading files. May be repeated.
    #[clap(long = "execute", short = 'e')]
    queries: Vec<String>,

    #[clap(long, default_value = "warn", env = "SQLPLAN_LOG_LEVEL")]
    log_level: Level,

    /// Log output format (human or json).
    #[clap(long, default_value = "human", value_parser = parse_log_format)]
    log_format: logutil::LogFormat,

    /// Files holding SQL. Reads stdin when no files or statements are given.
    files: Vec<PathBuf>,
}

/// Plan SQL text and print the resulting plan trees.
fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(args.log_level, args.log_format, std::io::stderr);

    if let Err(e) = inner(args) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

fn parse_log_format(s: &str) -> Result<logutil::LogFormat, String> {
    logutil::LogFormat::from_name(s).ok_or_else(|| format!("unknown log format: {s}"))
}

fn inner(args: Arguments) -> Result<(), CliError> {
    let ctx = session(&args)?;
    let mut stdout = BufWriter::new(std::io::stdout());

    for input in inputs(&args)? {
        if args.multi {
            let mut rest = input;
            while !rest.trim().is_empty() {
                let (plan, consumed, remainder) = parse_one(&ctx, &rest)?;
                debug!(%consumed, "planned statement");
                writeln!(stdout, "-- {consumed}")?;
                write!(stdout, "{plan}")?;
                report_warnings(&ctx, &mut stdout)?;
                rest = remainder;
            }
        } else {
            let plan = parse(&ctx, &input)?;
            write!(stdout, "{plan}")?;
            report_warnings(&ctx, &mut stdout)?;
        }
        stdout.flush()?;
    }

    Ok(())
}

fn session(args: &Arguments) -> Result<BasicSessionContext, CliError> {
    let (user, host) = args.user.split_once('@').unwrap_or((args.user.as_str(), "%"));
    let mut ctx = BasicSessionContext::new(&args.database).with_client(user, host);

    for var in &args.vars {
        let Some((name, value)) = var.split_once('=') else {
            return Err(CliError::InvalidArgument(format!(
                "expected NAME=VALUE for --var, got '{var}'"
            )));
        };
        let value = scalar_from_arg(value.trim());
        match name.trim().strip_prefix("@@") {
            Some(name) => ctx.set_session_variable(name, value),
            None => ctx.set_user_variable(name.trim().trim_start_matches('@'), value),
        }
    }

    Ok(ctx)
}

/// Integers become `Int64`, everything else is text.
fn scalar_from_arg(value: &str) -> ScalarValue {
    match value.parse::<i64>() {
        Ok(v) => ScalarValue::Int64(v),
        Err(_) => ScalarValue::Utf8(value.to_string()),
    }
}

fn inputs(args: &Arguments) -> Result<Vec<String>, CliError> {
    if !args.queries.is_empty() || !args.files.is_empty() {
        let mut inputs = args.queries.clone();
        for path in &args.files {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.display().to_string(),
                source,
            })?;
            inputs.push(text);
        }
        return Ok(inputs);
    }

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;
    Ok(vec![text])
}

fn report_warnings(ctx: &BasicSessionContext, out: &mut impl Write) -> Result<(), CliError> {
    for warning in ctx.take_warnings() {
        writeln!(out, "Warning {}: {}", warning.code, warning.message)?;
    }
    Ok(())
}
