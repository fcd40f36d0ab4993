use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "kotoba",
    version,
    about = "Photograph Japanese text and break down its significant grammar"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// JSON profile to load instead of ./kotoba.json
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level for stderr output (RUST_LOG takes precedence)
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive session: camera, uploads and paged results (default)
    Scan,

    /// Analyze one image file and print the result
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the raw result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_is_default() {
        let cli = Cli::try_parse_from(["kotoba"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_format, LogFormatArg::Compact);
    }

    #[test]
    fn test_analyze_args() {
        let cli = Cli::try_parse_from([
            "kotoba",
            "analyze",
            "sign.jpg",
            "--json",
            "--log-format",
            "json",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.file, PathBuf::from("sign.jpg"));
                assert!(args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.log_format, LogFormatArg::Json);
    }

    #[test]
    fn test_analyze_requires_file() {
        assert!(Cli::try_parse_from(["kotoba", "analyze"]).is_err());
    }
}
