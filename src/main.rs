//! BioBuddy - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::sync::Arc;

use biobuddy::{
    bootstrap,
    cli::{spinner, Args, Commands, Verbosity},
    config::Config,
    doctor::Doctor,
    logging,
    repl::ReplSession,
    server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    logging::init(verbosity);

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match &args.command {
        Commands::Ask {
            question,
            show_prompt,
        } => ask(&config, question, *show_prompt, verbosity).await,
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            serve(&config, &host, port).await
        }
        Commands::Repl => run_repl(&config, verbosity).await,
        Commands::Doctor => run_doctor(config).await,
        Commands::Config => show_config(&config, &args),
    }
}

async fn ask(config: &Config, question: &str, show_prompt: bool, verbosity: Verbosity) -> Result<()> {
    let pipeline = bootstrap::build_pipeline(config).await?;

    let pb = spinner("Thinking...", verbosity.show_progress());
    let result = pipeline.run(question).await;
    pb.finish_and_clear();

    match result {
        Ok(trace) => {
            if show_prompt {
                eprintln!("{}\n{}\n", "Prompt:".dimmed(), trace.prompt);
            }
            println!("{}", trace.answer);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn serve(config: &Config, host: &str, port: u16) -> Result<()> {
    let pipeline = Arc::new(bootstrap::build_pipeline(config).await?);
    server::serve(pipeline, host, port).await
}

async fn run_repl(config: &Config, verbosity: Verbosity) -> Result<()> {
    let pipeline = Arc::new(bootstrap::build_pipeline(config).await?);

    let history_path = Config::home_dir()?.join("history");
    let mut session = ReplSession::with_history(pipeline, history_path)?;
    session.set_show_progress(verbosity.show_progress());
    session.show_welcome(env!("CARGO_PKG_VERSION"));

    session.run().await
}

async fn run_doctor(config: Config) -> Result<()> {
    let doctor = Doctor::new(config);
    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(config: &Config, args: &Args) -> Result<()> {
    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => Config::config_path()?.display().to_string(),
    };

    println!("{} {}\n", "# BioBuddy configuration from".dimmed(), source.dimmed());
    println!("{}", config.to_toml()?);

    Ok(())
}
