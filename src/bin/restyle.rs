//! restyle CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use restyle::driver;
use restyle::error::RestyleError;
use restyle::report;
use restyle::Registry;

#[derive(Parser)]
#[command(
    name = "restyle",
    version,
    about = "Source-to-source codemod engine for CSS-in-JS migrations"
)]
struct Cli {
    /// Name of the transform to run (see --list)
    transform: Option<String>,

    /// Directory to rewrite in place
    directory: Option<PathBuf>,

    /// Emit the run summary as JSON on stdout instead of a colorized report
    #[arg(long)]
    json: bool,

    /// List the registered transforms and exit
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, RestyleError> {
    let registry = Registry::builtin();

    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(name) = cli.transform else {
        return Err(RestyleError::usage("missing transform name"));
    };
    let Some(directory) = cli.directory else {
        return Err(RestyleError::usage("missing target directory"));
    };
    let Some(transform) = registry.get(&name) else {
        return Err(RestyleError::UnknownTransform {
            name,
            registered: registry.names().join(", "),
        });
    };

    let summary = driver::run(transform, &directory)?;
    if cli.json {
        report::print_json(&summary)?;
    } else {
        report::print_human(&summary)?;
    }

    // Diagnostics are advisory; the run itself succeeded.
    Ok(ExitCode::SUCCESS)
}
