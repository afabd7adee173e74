//! urdf_resolver CLI

use clap::{Parser, Subcommand};
use std::{path::PathBuf, process};
use urdf_resolver::{flatten_file, validate_document, FileSet};

#[derive(Parser)]
#[command(name = "urdf_resolver")]
#[command(about = "Flatten xacro include trees and locate mesh assets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a xacro document by resolving its include tree
    Flatten {
        /// Xacro document path
        path: PathBuf,

        /// Package root used by $(find PACKAGE) macros
        #[arg(short, long, default_value = ".")]
        root_dir: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write include diagnostics as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Verify the flattened document is well-formed XML
        #[arg(long)]
        check: bool,
    },

    /// Locate the file matching a symbolic asset reference
    Locate {
        /// Reference such as package://robot/meshes/base.stl
        target: String,

        /// Directory tree holding the candidate files
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Flatten {
            path,
            root_dir,
            output,
            report,
            check,
        } => flatten_and_write(&path, &root_dir, output.as_deref(), report.as_deref(), check),
        Commands::Locate { target, dir } => locate(&target, &dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn flatten_and_write(
    path: &std::path::Path,
    root_dir: &std::path::Path,
    output: Option<&std::path::Path>,
    report: Option<&std::path::Path>,
    check: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Flattening document: {}", path.display());

    let flat = flatten_file(path, root_dir)?;

    if check {
        validate_document(&flat.content)?;
        log::info!("Flattened document is well-formed");
    }

    match output {
        Some(out) => {
            std::fs::write(out, &flat.content)?;
            log::info!("Wrote flattened document: {}", out.display());
        }
        None => print!("{}", flat.content),
    }

    if let Some(report_path) = report {
        let json = serde_json::to_string_pretty(&flat.issues)?;
        std::fs::write(report_path, json)?;
        log::info!("Wrote include report: {}", report_path.display());
    }

    if flat.issues.is_empty() {
        log::info!("All includes resolved");
    } else {
        log::warn!(
            "{} include(s) could not be resolved ({} read failure(s))",
            flat.issues.len(),
            flat.issues.iter().filter(|i| i.is_read_failure()).count()
        );
    }

    Ok(())
}

fn locate(target: &str, dir: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let files = FileSet::from_dir(dir)?;
    log::debug!("Searching {} file(s) for {}", files.len(), target);

    match files.resolve_key(target) {
        Some(key) => {
            println!("{}", key);
            Ok(())
        }
        None => Err(format!("no file matches {}", target).into()),
    }
}
