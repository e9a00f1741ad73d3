use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod report;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Solve(args) => args.run(),
        Command::TensionArm(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "beltpath", about = "Belt length and tension solver for planar pulley drives")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve the belt geometry and forces described by a configuration file.
    Solve(cli::solve::SolveArgs),
    /// Swing a tensioner arm until the belt reaches its target length.
    TensionArm(cli::tension_arm::TensionArmArgs),
}
