use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use labtopo::config_loader;
use labtopo::lab::Task;
use labtopo::orchestrator::{self, RunOptions, RunOutcome};
use log::{info, warn};
use std::path::PathBuf;

/// Configuration utility for coursework network emulation labs in Mininet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the lab configuration YAML file
    #[arg(short, long)]
    config: PathBuf,

    /// Lab to build
    #[arg(short, long, value_enum, default_value_t = Task::Sdn)]
    task: Task,

    /// Output directory for the plan and launcher files
    #[arg(short, long, default_value = "lab_output")]
    output: PathBuf,

    /// Accept template values without asking
    #[arg(short, long)]
    yes: bool,

    /// Run the generated launcher (requires root and Mininet)
    #[arg(long)]
    launch: bool,

    /// Write a configuration template to --config and exit
    #[arg(long, conflicts_with_all = ["launch", "yes"])]
    init: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if args.init {
        config_loader::write_template(&args.config)?;
        info!("Edit {:?} with your assignment values, then run again", args.config);
        return Ok(());
    }

    info!("Configuration file: {:?}", args.config);
    info!("Output directory: {:?}", args.output);

    let config = config_loader::load_config(&args.config)?;

    let options = RunOptions {
        task: args.task,
        output_dir: args.output,
        assume_yes: args.yes,
        launch: args.launch,
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let outcome = orchestrator::run(&config, &options, &mut stdin.lock(), &mut stdout.lock())?;

    match outcome {
        RunOutcome::Aborted => warn!("Nothing generated. Update your configuration and try again."),
        RunOutcome::Generated { script, plan } => {
            info!("Lab plan: {:?}", plan);
            if !options.launch {
                info!("Run with: sudo {} {:?}", orchestrator::LAUNCH_INTERPRETER, script);
            }
        }
    }
    Ok(())
}
