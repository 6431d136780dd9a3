//! rubylex - highlight Ruby source in the terminal

use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use rubylex::config::Config;
use rubylex::error::{HighlightError, Result};
use rubylex::syntax::{detect, RubyLexer};
use rubylex::terminal::Terminal;

/// Parsed command line
#[derive(Debug, Default)]
struct Args {
    tokens: bool,
    config: Option<PathBuf>,
    file: Option<PathBuf>,
}

enum Command {
    Run(Args),
    Help,
    Version,
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("RUBYLEX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--tokens" | "-t" => parsed.tokens = true,
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| HighlightError::Message(format!("{arg} needs a path")))?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-" => parsed.file = None,
            other if other.starts_with('-') => {
                return Err(HighlightError::Message(format!("unknown option: {other}")));
            }
            other => parsed.file = Some(PathBuf::from(other)),
        }
    }
    Ok(Command::Run(parsed))
}

fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => {
            if !path.exists() {
                return Err(HighlightError::FileNotFound(path.display().to_string()));
            }
            Ok(fs::read(path)?)
        }
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run() -> Result<()> {
    let args = match parse_args(env::args().skip(1))? {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Version => {
            print_version();
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let source = read_input(args.file.as_deref())?;
    if !detect::detect(args.file.as_deref(), &source) {
        warn!(file = ?args.file, "input does not look like Ruby, highlighting anyway");
    }

    let lexer = RubyLexer::with_options(config.lexer_options())?;
    let stdout = io::stdout();
    let color = config.color && stdout.is_terminal();
    debug!(color, bytes = source.len(), "highlighting");

    let mut term = Terminal::new(stdout.lock(), config.theme, color);
    if args.tokens {
        term.dump(lexer.tokenize(&source))
    } else {
        term.render(lexer.tokenize(&source))
    }
}

fn print_usage() {
    println!("rubylex {} - Ruby syntax highlighter", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: rubylex [OPTIONS] [FILE]");
    println!();
    println!("Reads FILE (or standard input) and writes it highlighted to standard output.");
    println!();
    println!("Options:");
    println!("  -t, --tokens       Print one token per line instead of highlighting");
    println!("  -c, --config PATH  Read settings from PATH instead of ~/.rubylex.toml");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Environment:");
    println!("  RUBYLEX_LOG        Log filter, e.g. debug or rubylex=trace (default: warn)");
}

fn print_version() {
    println!("rubylex {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let Ok(Command::Run(args)) = parse(&["-t", "-c", "conf.toml", "app.rb"]) else {
            panic!("expected run");
        };
        assert!(args.tokens);
        assert_eq!(args.config, Some(PathBuf::from("conf.toml")));
        assert_eq!(args.file, Some(PathBuf::from("app.rb")));
    }

    #[test]
    fn test_parse_flags() {
        assert!(matches!(parse(&["--help"]), Ok(Command::Help)));
        assert!(matches!(parse(&["x.rb", "-V"]), Ok(Command::Version)));
        assert!(matches!(parse(&["--bogus"]), Err(HighlightError::Message(_))));
        assert!(matches!(parse(&["--config"]), Err(HighlightError::Message(_))));

        let Ok(Command::Run(args)) = parse(&[]) else {
            panic!("expected run");
        };
        assert!(args.file.is_none());
        assert!(!args.tokens);
    }
}
