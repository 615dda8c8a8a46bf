//! Check and lint codec DSL files: parse errors, one tab per depth, one field per line, etc.
//!
//! Usage:
//!   codec_lint [OPTIONS] [FILE ...]
//!   codec_lint < file.codec
//!
//! Each input is parsed first; a parse failure is reported as an error with its line and
//! column. Lint findings follow. With `--fix`, files that parse are rewritten in canonical
//! form (stdin is printed fixed to stdout); a source containing `#` is reported and left
//! untouched. Exit code 1 if any error-level findings.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as _;
use codecspec::lint::{fixed_source, lint_with_options, LintMessage, Severity};
use codecspec::{parse_with_options, CommentStyle, Error, ParseOptions, ScanOptions};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Check and lint codec DSL source
#[derive(clap::Parser, Debug)]
#[command(name = "codec_lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Files to check; reads stdin when empty
    files: Vec<PathBuf>,

    /// Rewrite inputs in canonical form
    #[arg(short, long)]
    fix: bool,

    /// Human-readable output
    #[arg(short = 'H', long)]
    human: bool,

    /// Treat `#` as a comment running to the end of the line
    #[arg(long)]
    line_comments: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

#[derive(Default)]
struct Totals {
    errors: usize,
    warnings: usize,
}

/// 1-based line and column of a byte offset.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    (line, before[line_start..].chars().count() + 1)
}

fn print_message(path: &str, m: &LintMessage, style: OutputStyle) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match style {
        OutputStyle::Compact => {
            println!(
                "{}:{}:{}: {}: {} [{}]",
                path, m.line, m.column, severity_str, m.message, m.rule.id()
            );
        }
        OutputStyle::Human => {
            println!("  {} {}:{}: {}", path, m.line, m.column, m.message);
            println!("    rule: {}", m.rule.id());
        }
    }
}

fn print_error(path: &str, src: &str, e: &Error) {
    let (line, column) = e.span().map_or((1, 1), |s| line_column(src, s.start));
    println!("{}:{}:{}: error: {} [{:?}]", path, line, column, e, e.category());
}

/// Check one source; with `fix`, returns the canonical text when it can be produced.
fn check(
    path: &str,
    src: &str,
    options: ParseOptions,
    style: OutputStyle,
    fix: bool,
    totals: &mut Totals,
) -> Option<String> {
    let codecs = match parse_with_options(src, options) {
        Ok(codecs) => codecs,
        Err(e) => {
            print_error(path, src, &e);
            totals.errors += 1;
            return None;
        }
    };
    info!(path, codecs = codecs.len(), "parsed");

    match lint_with_options(src, options.scan) {
        Ok(messages) => {
            for m in &messages {
                match m.severity {
                    Severity::Error => totals.errors += 1,
                    Severity::Warning => totals.warnings += 1,
                }
                print_message(path, m, style);
            }
        }
        Err(e) => {
            println!("{}: error: {}", path, e);
            totals.errors += 1;
        }
    }
    if !fix {
        return None;
    }
    match fixed_source(src, &codecs, options.scan) {
        Ok(fixed) => Some(fixed),
        Err(e) => {
            print_error(path, src, &e);
            totals.errors += 1;
            None
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let options = ParseOptions {
        scan: ScanOptions {
            comments: if cli.line_comments {
                CommentStyle::Line
            } else {
                CommentStyle::Marker
            },
        },
        ..ParseOptions::default()
    };
    let style = if cli.human {
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };
    let mut totals = Totals::default();

    if cli.files.is_empty() {
        let mut src = String::new();
        io::stdin()
            .read_to_string(&mut src)
            .context("failed to read stdin")?;
        if let Some(fixed) = check("<stdin>", &src, options, style, cli.fix, &mut totals) {
            io::stdout().write_all(fixed.as_bytes())?;
        }
    } else {
        for path in &cli.files {
            let display_path = path.display().to_string();
            let src = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("{}: {}", display_path, e);
                    totals.errors += 1;
                    continue;
                }
            };
            if let Some(fixed) = check(&display_path, &src, options, style, cli.fix, &mut totals) {
                if fixed != src {
                    std::fs::write(path, &fixed)
                        .with_context(|| format!("{}: write failed", display_path))?;
                    eprintln!("{}: fixed", display_path);
                } else {
                    debug!(path = %display_path, "already canonical");
                }
            }
        }
    }

    if totals.errors > 0 || totals.warnings > 0 {
        eprintln!(
            "codec_lint: {} error(s), {} warning(s)",
            totals.errors, totals.warnings
        );
    }
    if totals.errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
