use brain_client::cli::{parse_args, run_cli_command, CliCommand, Interrupt};
use brain_client::client::BrainClient;

use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    // Logs go to stderr so streamed answers on stdout stay clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brain_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args());
    if matches!(command, CliCommand::Help | CliCommand::Version | CliCommand::Invalid(_)) {
        // No backend needed.
        return run_cli_command(command, &BrainClient::new(Default::default()), &Interrupt::default())
            .await;
    }

    let client = BrainClient::from_env()?;
    tracing::info!(base_url = client.base_url(), "Using backend");

    // Only commands that watch the token take over Ctrl+C.
    let interrupt = if command.is_interruptible() {
        Interrupt::install()
    } else {
        Interrupt::default()
    };
    run_cli_command(command, &client, &interrupt).await
}
