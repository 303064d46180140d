// Entrypoint for the servlet client.
// - `--demo` runs the automated demo, anything else the interactive loop.
// - Logs go to stderr (`RUST_LOG`, default `warn`); stdout is the transcript.

use servlet_choice_client::api::ServletClient;
use servlet_choice_client::config::ClientConfig;
use servlet_choice_client::ui::{run, Interrupt, Mode, TerminalPrompt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logging first so session open/close events are visible with RUST_LOG.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Ctrl-C raises a flag instead of killing the process, so the session
    // below is still closed. See `ui::Interrupt`.
    let interrupt = Interrupt::install()?;

    // Only the first argument matters: `--demo` or interactive.
    let mode = Mode::from_args(std::env::args().skip(1));

    // One session for the whole run, against the compiled-in servlet URL.
    let client = ServletClient::new(ClientConfig::default())?;

    // Blocks until quit, end of input, Ctrl-C or the demo finishing; the
    // session is closed before this returns.
    let mut prompt = TerminalPrompt::new();
    let stdout = std::io::stdout();
    run(mode, client, &mut prompt, &mut stdout.lock(), &interrupt)?;
    Ok(())
}
