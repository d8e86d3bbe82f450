mod error;

use std::{path::PathBuf, time::Duration};

use parley::{Choice, Command, ConversionError, Deferred, Raw, Subcommand, Value};
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::RunError;

#[derive(Choice, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Pretty,
}

fn report(format: Format, quiet: bool, file: &str) {
    if quiet {
        return;
    }

    match format {
        Format::Json => println!(r#"{{"file": {file:?}, "status": "done"}}"#),
        Format::Pretty => println!("  {file} ... done"),
    }
}

/// Runs all of the files in parallel
#[derive(Command, Debug)]
struct RunParallel {
    /// The files to run
    #[parley(positional)]
    files: Vec<String>,

    #[parley(forwarded)]
    verbose: bool,
}

impl RunParallel {
    async fn run(self, format: Format, quiet: bool) -> Result<(), RunError> {
        if self.files.is_empty() {
            return Err(RunError::NoFiles {
                command: "run-parallel",
            });
        }

        let mut tasks = JoinSet::new();
        for file in self.files {
            tasks.spawn(async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                file
            });
        }

        finish(tasks, format, quiet).await
    }
}

async fn finish(mut tasks: JoinSet<String>, format: Format, quiet: bool) -> Result<(), RunError> {
    while let Some(finished) = tasks.join_next().await {
        let file = finished?;
        debug!(%file, "finished");
        report(format, quiet, &file);
    }

    Ok(())
}

/// Runs all of the files one by one
#[derive(Command, Debug)]
struct RunSerial {
    #[parley(positional)]
    files: Vec<PathBuf>,

    #[parley(forwarded)]
    verbose: bool,
}

impl RunSerial {
    async fn run(self, format: Format, quiet: bool) -> Result<(), RunError> {
        if self.files.is_empty() {
            return Err(RunError::NoFiles {
                command: "run-serial",
            });
        }

        for file in self.files {
            if !file.exists() {
                return Err(RunError::Missing(file));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
            report(format, quiet, &file.display().to_string());
        }

        Ok(())
    }
}

#[derive(Subcommand, Debug)]
enum RunMode {
    Parallel(RunParallel),
    Serial(RunSerial),
}

/// Allows running files with different options
#[derive(Command, Debug)]
struct Run {
    #[parley(subcommand)]
    mode: RunMode,

    #[parley(short, default)]
    quiet: bool,

    /// How results are reported
    #[parley(default = Format::Pretty)]
    format: Format,

    #[parley(forwarded)]
    verbose: bool,
}

fn parse_index(raw: &Raw) -> Result<Value, ConversionError> {
    match raw {
        Raw::Scalar(index) if index.starts_with("http://") || index.starts_with("https://") => {
            Ok(Value::Str(index.clone()))
        }
        raw => Err(ConversionError::custom(RunError::BadIndex(raw.to_string()))),
    }
}

/// Lints all of the files in a given directory using the latest termuff
/// rules.
#[derive(Command, Debug)]
struct Lint {
    #[parley(positional, help = "The list of files to lint")]
    files: Vec<String>,

    #[parley(short, default, help = "If the linter should omit all stdout messages")]
    quiet: bool,

    #[parley(default, help = "Disable the termuff cache", group = "Caching")]
    no_cache: bool,

    #[parley(
        prompt = "Which index should termuff be downloaded from?",
        default = "http://pypi.org".to_owned(),
        parser = "parse_index",
        defer,
        help = "The index to download termuff from"
    )]
    index: Deferred<String>,

    #[parley(forwarded)]
    verbose: bool,
}

impl Lint {
    async fn run(self) -> Result<(), RunError> {
        if self.files.is_empty() {
            return Err(RunError::NoFiles { command: "lint" });
        }

        // Only asked for once there's something to lint
        let index = self.index.get()?;
        info!(%index, cache = !self.no_cache, "fetching rules");
        tokio::time::sleep(Duration::from_millis(200)).await;

        for file in &self.files {
            report(Format::Pretty, self.quiet, file);
        }

        Ok(())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run(Run),
    Lint(Lint),
}

/// Termuff is a powerful command line interface to lint and run arbitrary
/// files.
#[derive(Command, Debug)]
#[parley(prog = "termuff", epilog = "Learn more at http://termuff.org")]
struct Termuff {
    #[parley(subcommand)]
    command: Commands,

    #[parley(short, default, help = "Whether to show more output")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = match verbose {
        true => "debug",
        false => "warn",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[parley::main]
#[tokio::main(flavor = "current_thread")]
async fn main(cli: Termuff) -> anyhow::Result<()> {
    init_tracing(cli.verbose);
    debug!(?cli, "parsed command line");

    match cli.command {
        Commands::Run(run) => match run.mode {
            RunMode::Parallel(parallel) => parallel.run(run.format, run.quiet).await?,
            RunMode::Serial(serial) => serial.run(run.format, run.quiet).await?,
        },
        Commands::Lint(lint) => lint.run().await?,
    }

    Ok(())
}
