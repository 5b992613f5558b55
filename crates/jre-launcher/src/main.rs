//! Launcher CLI entry point.
//!
//! Builds the runtime command line from the launch configuration, starts the
//! runtime and reports whether it came up.

use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{error, info};

use jre_launcher::diagnostics::{describe_failure, failure_checklist};
use jre_launcher::{launcher, LaunchConfig, LaunchSpec, OsFamily};

#[derive(Parser, Debug)]
#[command(name = "jre-launcher")]
#[command(about = "Start the bundled Java runtime without a console window")]
struct Args {
    /// Config file (default: launcher.json in the working directory, if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Runtime directory relative to the working directory (default: jre)
    #[arg(long)]
    runtime_dir: Option<String>,

    /// Library directory relative to the working directory (default: lib)
    #[arg(long)]
    lib_dir: Option<String>,

    /// Entry-point class to run
    #[arg(long)]
    entry_point: Option<String>,

    /// Build the command for another OS family (posix or windows)
    #[arg(long, requires = "dry_run")]
    os: Option<OsFamily>,

    /// Print the command without launching it
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&args.log_level),
    )
    .init();

    let config = LaunchConfig::load(args.config.as_deref())?.with_overrides(
        args.runtime_dir,
        args.lib_dir,
        args.entry_point,
    );

    let os = match args.os {
        Some(os) => os,
        None => match OsFamily::detect() {
            Ok(os) => os,
            Err(e) => {
                error!("{}", e);
                exit(1);
            }
        },
    };

    if let Err(e) = config.validate_for(os) {
        error!("{}", e);
        exit(1);
    }

    info!("Configuration:");
    info!("  Runtime dir: {}", config.runtime_dir);
    info!("  Lib dir: {}", config.lib_dir);
    info!("  Entry point: {}", config.entry_point);

    let command = LaunchSpec::new(os, &config).command_line();
    println!("Operating system: {os}");
    println!("Command to execute: {command}");

    if args.dry_run {
        return Ok(());
    }

    println!("Starting the Java application...");
    let outcome = launcher::launch(os, &command);

    if outcome.success() {
        println!("The command started successfully. The Java application should now be running.");
        println!("(This does not guarantee that the Java program initialized without errors.)");
        return Ok(());
    }

    if let Some(e) = outcome.error() {
        println!("{}", describe_failure(e));
    }
    println!("Please check:");
    for (i, item) in failure_checklist(os, &config).iter().enumerate() {
        println!("{}. {}", i + 1, item);
    }
    exit(1);
}
