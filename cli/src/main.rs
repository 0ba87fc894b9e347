use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use flexi_logger::{FileSpec, LevelFilter, LogSpecification, Logger, LoggerHandle, WriteMode};

mod parsers;

mod decode;
use decode::Decode;

mod encode;
use encode::Encode;

mod simulate;
use simulate::Simulate;

const SIMPLE_VERSION_STRING: &str = include!(concat!(env!("OUT_DIR"), "/simple_version_string"));
const VERSION_STRING: &str = include!(concat!(env!("OUT_DIR"), "/version_string"));

#[derive(Parser)]
#[command(name = "nearby")]
#[command(version(SIMPLE_VERSION_STRING))]
#[command(long_version(VERSION_STRING))]
struct Cli {
    /// `-e`, `--log-stderr`: Log to `stderr` even if `--log-file` is given
    #[arg(short = 'e', long, help = "Log to stderr instead of a file", action = clap::ArgAction::SetTrue, default_value_t = false)]
    log_stderr: bool,

    /// `-f`, `--log-file`: Append logs to this file instead of `stderr`
    #[arg(short = 'f', long, help = "Send log output to the given file")]
    log_file: Option<PathBuf>,

    /// `-s`, `--log-spec`: Full [flexi_logger](https://docs.rs/flexi_logger/latest/flexi_logger/struct.LogSpecification.html)
    /// spec, overrides `--log-level`
    #[arg(short = 's', long, help = "Log spec for flexi_logger")]
    log_spec: Option<String>,

    /// `-l`, `--log-level`: Set the desired log verbosity. Defaults to 0, all values are listed
    /// below:
    ///
    /// | Value | Log Level |
    /// | ----- | --------- |
    /// | **0** | **Warn** |
    /// | 1 | Info |
    /// | 2 | Debug |
    /// | 3 | Trace |
    #[arg(
        short = 'l',
        long,
        help = "Set the log level, 0 = warn, 1 = info, etc",
        long_help = None,
        default_value_t = 0
    )]
    log_level: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the full version string and exit
    #[command()]
    Version,

    /// Decode a FiRa discovery advertisement from BLE service data
    #[command()]
    Decode(Decode),

    /// Encode a FiRa discovery advertisement described in JSON
    #[command()]
    Encode(Encode),

    /// Drive a pairing progress handler through a scripted pairing attempt
    ///
    /// The scenario is read from a TOML file, `$NEARBY_CONFIG` or
    /// `simulate.toml` in the user config directory by default. Every UI and
    /// telemetry side effect is logged at info level, so run with `-l 1` or
    /// higher to see them.
    #[command()]
    Simulate(Simulate),
}

impl Cli {
    fn configure_loggers(&self) -> anyhow::Result<LoggerHandle> {
        let log_spec = match &self.log_spec {
            Some(s) => {
                LogSpecification::parse(s).with_context(|| format!("parsing log spec {}", s))?
            }
            None => {
                if self.log_level > 0 {
                    let lvl = match self.log_level {
                        1 => LevelFilter::Info,
                        2 => LevelFilter::Debug,
                        _ => LevelFilter::Trace,
                    };
                    LogSpecification::builder()
                        .default(LevelFilter::Warn)
                        .module("nearby", lvl)
                        .build()
                } else {
                    LogSpecification::env_or_parse("warn")
                        .with_context(|| "getting log spec from env")?
                }
            }
        };

        let mut logger = Logger::with(log_spec);

        if !self.log_stderr {
            if let Some(v) = &self.log_file {
                let path = if v.is_absolute() {
                    Cow::Borrowed(v)
                } else {
                    Cow::Owned(std::env::current_dir()?.join(v))
                };
                logger = logger
                    .log_to_file(
                        FileSpec::try_from(path.as_ref()).with_context(|| "creating filespec")?,
                    )
                    .append()
                    .write_mode(WriteMode::BufferAndFlush);
            }
        }

        logger.start().with_context(|| "starting logger")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = &cli.command {
        println!("{}", VERSION_STRING);
        return Ok(());
    }

    let log_handle = cli.configure_loggers()?;
    log::debug!("nearby {}", nearby::VERSION);

    let res = match cli.command {
        Commands::Decode(c) => c.run(),
        Commands::Encode(c) => c.run(),
        Commands::Simulate(c) => c.run(),

        Commands::Version => unreachable!("handled before logging is set up"),
    };

    log_handle.flush();
    res
}
