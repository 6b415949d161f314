// whisper-relay - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Logging initialisation
// 3. Client log lookup (one-shot, fatal on failure)
// 4. Keepalive start, inbound-relay seeding, pipeline run

use clap::Parser;
use whisper_relay::app::keepalive;
use whisper_relay::app::relay::InboundRelay;
use whisper_relay::app::tail::{self, LogTail};
use whisper_relay::platform::process;
use whisper_relay::platform::window::ClientWindow;
use whisper_relay::telegram::TelegramClient;
use whisper_relay::util;
use whisper_relay::util::error::WhisperRelayError;

/// whisper-relay - Path of Exile trade-whisper monitor.
///
/// Tails the running client's log, forwards trade whispers to a Telegram
/// chat, types replies from that chat back into the game, and keeps the
/// session alive with a periodic keystroke.
#[derive(Parser, Debug)]
#[command(name = "whisper-relay", version, about)]
struct Cli {
    /// Telegram bot token.
    bot_token: String,

    /// Telegram chat ID receiving the notifications.
    chat_id: String,
}

fn main() {
    let cli = Cli::parse();

    util::logging::init();

    tracing::info!(
        version = util::constants::APP_VERSION,
        "whisper-relay starting"
    );

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), WhisperRelayError> {
    let log_path = process::locate_client_log()?;

    tracing::info!(
        file = %log_path.display(),
        chat_id = %cli.chat_id,
        "Tailing client log (Ctrl+C to stop)"
    );

    let client = TelegramClient::new(cli.bot_token, cli.chat_id)?;
    client.send_startup_notice();

    let tail = LogTail::open(&log_path)?;

    // Each thread holds its own window handle; focus calls are idempotent
    // so no coordination is needed.
    let keepalive = keepalive::start(ClientWindow::new());
    let mut relay = InboundRelay::start(&client, ClientWindow::new());

    let result = tail::run(tail, &client, || relay.poll());

    keepalive.stop();
    result.map_err(Into::into)
}
