use clap::Parser;
use tracing_subscriber::EnvFilter;

use relocdd::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("relocdd=debug,info")
    } else {
        EnvFilter::new("relocdd=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Stations(args) => {
            cli::stations::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Phases(args) => {
            cli::phases::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Reloc(args) => {
            cli::reloc::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
