#![allow(non_snake_case)]
use RustedCalc::Examples::engine_examples::{NUMBER_OF_EXAMPLES, engine_examples};
use RustedCalc::Utils::logger::{init_logger, parse_level};
use RustedCalc::symbolic::engine::{Engine, EngineConfig};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "RustedCalc",
    version = env!("CARGO_PKG_VERSION"),
    about = "Evaluate and differentiate algebraic expressions",
    after_help = r#"
Examples:
  RustedCalc eval "2(3+x)" "x=1;y=2"
  RustedCalc diff "cos(x-y)" "x;y"
  RustedCalc --log debug --log-dir logs example 2
"#
)]
struct Cli {
    /// Log level: off, error, warn, info, debug or trace
    #[arg(long = "log", value_name = "LEVEL", default_value = "warn", value_parser = log_level)]
    level: LevelFilter,

    /// Directory for a timestamped log file
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Engine configuration document
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// Evaluate an expression
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Bindings such as "x=1;y=x+2"
        #[arg(default_value = "")]
        bindings: String,
    },
    /// Differentiate an expression with respect to each listed variable
    Diff {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Variables such as "x;y"; empty means every variable of the expression
        #[arg(default_value = "")]
        variables: String,
    },
    /// Run a demo scenario
    Example {
        #[arg(value_parser = clap::value_parser!(u8).range(0..NUMBER_OF_EXAMPLES as i64))]
        n: u8,
    },
}

fn log_level(s: &str) -> Result<LevelFilter, String> {
    parse_level(s).ok_or_else(|| {
        format!("invalid log level '{s}'. Expected: off, error, warn, info, debug, trace")
    })
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    let engine = Engine::with_config(config);
    match &cli.command {
        Commands::Eval { expression, bindings } => {
            let value = engine
                .evaluate_with(expression, bindings)
                .map_err(|e| e.to_string())?;
            println!("{}", value);
        }
        Commands::Diff { expression, variables } => {
            let derivatives = engine
                .differentiate(expression, variables)
                .map_err(|e| e.to_string())?;
            for derivative in derivatives {
                println!("{}", derivative);
            }
        }
        Commands::Example { n } => engine_examples(*n as usize),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.level, cli.log_dir.as_deref());
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
