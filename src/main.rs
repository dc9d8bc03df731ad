use bisaya::runner;
use clap::{Arg, ArgAction, Command};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = Command::new("bisaya")
        .about("A tree-walking interpreter for the Bisaya++ teaching language")
        .arg(
            Arg::new("file")
                .help("The source file to execute")
                .value_name("FILE")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Only lex and parse the file, reporting the first error")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log interpreter activity to stderr (repeat for more detail)")
                .action(ArgAction::Count),
        )
        .get_matches();

    init_logging(matches.get_count("verbose"));

    let Some(file_path) = matches.get_one::<String>("file") else {
        return ExitCode::FAILURE;
    };
    let path = Path::new(file_path);

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let succeeded = if matches.get_flag("check") {
        match runner::check(&source) {
            Ok(_) => true,
            Err(error) => {
                error.report(&source, Some(file_path.as_str()));
                false
            }
        }
    } else {
        runner::run(&source, Some(file_path.as_str()))
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` counts pick the level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bisaya={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
