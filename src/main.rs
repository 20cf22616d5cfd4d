use std::fs::File;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use std::time::Instant;

use appbuilder_rs::config::{load_config, AppConfig};
use appbuilder_rs::observability::{init_tracing, log_answer};
use appbuilder_rs::stream::{answer_iterator_with_config, AnswerIterator};

const USAGE: &str =
    "usage: appbuilder [--config PATH] [--stream|--once] [--request-id ID] [INPUT|-]";
const DEFAULT_REQUEST_ID: &str = "local";

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    config_path: Option<String>,
    stream: bool,
    request_id: String,
    input: Option<String>,
}

enum Command {
    Decode(CliArgs),
    Help,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut parsed = CliArgs {
        config_path: None,
        stream: true,
        request_id: DEFAULT_REQUEST_ID.to_string(),
        input: None,
    };
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--stream" => parsed.stream = true,
            "--once" => parsed.stream = false,
            "--config" => {
                parsed.config_path = Some(args.next().ok_or("--config requires a path")?);
            }
            "--request-id" => {
                parsed.request_id = args.next().ok_or("--request-id requires a value")?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}")),
            _ if parsed.input.is_some() => return Err(format!("unexpected argument: {arg}")),
            _ => parsed.input = Some(arg),
        }
    }
    Ok(Command::Decode(parsed))
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Decode(args)) => args,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = match args.config_path.as_deref() {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return ExitCode::from(2);
            }
        },
        None => AppConfig::default(),
    };

    init_tracing(&config.features.log_level);

    let input: Box<dyn Read + Send> = match args.input.as_deref() {
        None | Some("-") => Box::new(io::stdin()),
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Failed to open {path}: {e}");
                return ExitCode::from(2);
            }
        },
    };

    run(&args, &config, input)
}

fn run(args: &CliArgs, config: &AppConfig, input: Box<dyn Read + Send>) -> ExitCode {
    let start_time = Instant::now();
    tracing::info!(
        request_id = %args.request_id,
        stream = args.stream,
        "decoding response"
    );

    let mut answers =
        answer_iterator_with_config(args.request_id.clone(), input, args.stream, &config.decoder);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    loop {
        match answers.next_answer() {
            Ok(Some(answer)) => {
                log_answer(&answer, start_time);
                let line = match serde_json::to_string(&answer) {
                    Ok(line) => line,
                    Err(e) => {
                        eprintln!("Failed to encode answer: {e}");
                        return ExitCode::FAILURE;
                    }
                };
                if let Err(e) = writeln!(out, "{line}") {
                    eprintln!("Failed to write answer: {e}");
                    return ExitCode::FAILURE;
                }
            }
            Ok(None) => return ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "decode failed");
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
}
