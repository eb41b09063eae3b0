// src/cli.rs
use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::core::config::ConfigOverrides;

pub mod commands;

/// Builds the command line. Every option can also be set through a
/// `SUITE_RUNNER_<NAME>` environment variable; an explicit flag wins over it.
pub fn build_cli() -> Command {
    Command::new("suite-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs every discovered test file concurrently and reports the results.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .env("SUITE_RUNNER_VERBOSE")
                .help("Print every case and enable debug logging")
                .value_parser(FalseyValueParser::new())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("bail")
                .short('b')
                .long("bail")
                .env("SUITE_RUNNER_BAIL")
                .help("Stop starting new test files after the first failure")
                .value_parser(FalseyValueParser::new())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .env("SUITE_RUNNER_TIMEOUT")
                .help("Per-file timeout in milliseconds (0 disables it)")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-directory")
                .short('d')
                .long("test-directory")
                .env("SUITE_RUNNER_TEST_DIRECTORY")
                .alias("testDirectory")
                .help("Directory searched for test files")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("file-pattern")
                .short('p')
                .long("file-pattern")
                .env("SUITE_RUNNER_FILE_PATTERN")
                .alias("filePattern")
                .help("File-name glob selecting test files, e.g. '*.test.toml'")
                .value_name("GLOB")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .env("SUITE_RUNNER_CONFIG")
                .help("Config file (defaults to ./suite-runner.toml when present)")
                .value_name("CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .env("SUITE_RUNNER_JOBS")
                .help("Maximum number of test files running at once")
                .value_name("JOBS")
                .value_parser(clap::value_parser!(usize))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .env("SUITE_RUNNER_JSON")
                .help("Write a JSON report to this path")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .env("SUITE_RUNNER_LOG_LEVEL")
                .alias("logLevel")
                .help("Log filter, e.g. 'info' or 'suite_runner=debug' (RUST_LOG wins)")
                .value_name("LEVEL")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("clear-console")
                .long("clear-console")
                .env("SUITE_RUNNER_CLEAR_CONSOLE")
                .help("Clear the terminal before printing the summary")
                .value_parser(FalseyValueParser::new())
                .action(ArgAction::SetTrue),
        )
}

/// Maps parsed arguments onto the command-line configuration layer.
pub fn overrides_from_matches(matches: &ArgMatches) -> ConfigOverrides {
    ConfigOverrides {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        verbose: matches.get_flag("verbose"),
        bail: matches.get_flag("bail"),
        clear_console: matches.get_flag("clear-console"),
        timeout: matches.get_one::<u64>("timeout").copied(),
        test_directory: matches.get_one::<PathBuf>("test-directory").cloned(),
        file_pattern: matches.get_one::<String>("file-pattern").cloned(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        log_level: matches.get_one::<String>("log-level").cloned(),
    }
}

/// Parses the process arguments and runs the suite.
/// Returns whether the run passed.
pub async fn run() -> Result<bool> {
    let matches = build_cli().get_matches();
    let overrides = overrides_from_matches(&matches);
    let json = matches.get_one::<PathBuf>("json").cloned();

    commands::run::execute(overrides, json).await
}
