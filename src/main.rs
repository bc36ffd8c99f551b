use anyhow::Result;
use clap::Parser;

use sealpost::cli;
use sealpost::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else if args.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(args.config.as_deref())?;

    let result = match args.command {
        cli::Command::Keys(cmd) => cli::keys::run(cmd),
        cli::Command::Lookup(cmd) => cli::lookup::run(cmd, &config).await,
        cli::Command::Compose(cmd) => cli::compose::run(cmd, &config, args.quiet).await,
        cli::Command::Inbox(cmd) => cli::inbox::run(cmd, &config).await,
        cli::Command::Decrypt(cmd) => cli::decrypt::run(cmd),
        #[cfg(feature = "server")]
        cli::Command::Serve(cmd) => cli::serve::run(cmd, &config).await,
        cli::Command::Completions { shell } => {
            let mut cmd = <cli::Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "sealpost", &mut std::io::stdout());
            Ok(())
        }
    };

    match result {
        Err(e) if e.is::<cli::Reported>() => std::process::exit(1),
        other => other,
    }
}
