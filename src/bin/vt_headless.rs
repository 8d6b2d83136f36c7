//! Headless terminal runner
//!
//! Feeds a byte stream from stdin or a file through a terminal session and
//! prints the resulting screen state. Useful for testing and automation.

use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vtscreen::{Terminal, TerminalConfig};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut cols: Option<usize> = None;
    let mut rows: Option<usize> = None;
    let mut input_file: Option<String> = None;
    let mut config_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                cols = args.get(i).and_then(|v| v.parse().ok());
            }
            "-r" | "--rows" => {
                i += 1;
                rows = args.get(i).and_then(|v| v.parse().ok());
            }
            "-f" | "--file" => {
                i += 1;
                input_file = args.get(i).cloned();
            }
            "--config" => {
                i += 1;
                config_file = args.get(i).cloned();
            }
            "-j" | "--json" => output_format = OutputFormat::Json,
            "-t" | "--text" => output_format = OutputFormat::Text,
            "-h" | "--help" => {
                print_help();
                return ExitCode::SUCCESS;
            }
            arg => {
                // A bare argument is the input file
                if input_file.is_none() && !arg.starts_with('-') {
                    input_file = Some(arg.to_string());
                } else {
                    eprintln!("Unknown argument: {}", arg);
                    return ExitCode::FAILURE;
                }
            }
        }
        i += 1;
    }

    let mut config = match &config_file {
        Some(path) => match TerminalConfig::load(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => TerminalConfig::default(),
    };
    if let Some(cols) = cols {
        config.cols = cols;
    }
    if let Some(rows) = rows {
        config.rows = rows;
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        }
    };

    let mut terminal = Terminal::with_config(&config);
    terminal.on_unknown_sequence(|raw| {
        tracing::info!(sequence = ?String::from_utf8_lossy(raw), "unknown sequence");
    });
    terminal.parse(&input_data);

    let snapshot = terminal.snapshot();
    match output_format {
        OutputFormat::Text => {
            println!("Terminal State ({}x{}):", snapshot.cols, snapshot.rows);
            println!("Cursor: ({}, {})", snapshot.cursor.col, snapshot.cursor.row);
            if !snapshot.title.is_empty() {
                println!("Title: {}", snapshot.title);
            }
            println!("---");
            print!("{}", snapshot.to_text());
            println!("---");
        }
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Headless terminal runner");
    println!();
    println!("Usage: vt-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Set terminal width (default: 80)");
    println!("  -r, --rows <N>       Set terminal height (default: 24)");
    println!("  -f, --file <PATH>    Read input from file");
    println!("      --config <PATH>  Load settings from a JSON config file");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Reads from stdin if no input file is given.");
    println!("Set RUST_LOG=debug to trace unsupported sequences.");
}
