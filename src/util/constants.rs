// whisper-relay - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "whisper-relay";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Game client lookup
// =============================================================================

/// Executable names identifying a running Path of Exile client.
pub const CLIENT_PROCESS_NAMES: &[&str] = &["PathOfExile.exe", "PathOfExileSteam.exe"];

/// Directory of the client log relative to the executable's directory.
pub const CLIENT_LOG_SUBDIR: &str = "logs";

/// File name of the client log.
pub const CLIENT_LOG_FILE: &str = "Client.txt";

/// Substring identifying the game window among top-level window titles.
pub const WINDOW_TITLE_FRAGMENT: &str = "Path of Exile";

// =============================================================================
// Whisper grammar literals
// =============================================================================

/// Marker the game prefixes to every incoming whisper line.
pub const WHISPER_MARKER: &str = "@From";

/// Phrase present in every auto-generated buy offer.
pub const BUY_PHRASE: &str = "I would like to buy your";

/// Full greeting that opens the fixed purchase-whisper template. The item
/// name starts immediately after it.
pub const PURCHASE_GREETING: &str = "Hi, I would like to buy your ";

/// Delimiter between the item name and the structured price trailer.
pub const PURCHASE_PRICE_DELIMITER: &str = " listed for ";

// =============================================================================
// Tail limits
// =============================================================================

/// Sleep between polls when the log file has no complete new line (ms).
pub const TAIL_POLL_INTERVAL_MS: u64 = 1_000;

/// Maximum bytes read from the log file in one poll tick.
/// Prevents a large burst of new content from stalling the loop.
pub const MAX_TAIL_READ_BYTES_PER_TICK: usize = 512 * 1_024; // 512 KiB

/// Maximum accumulated size of the partial (in-progress) line buffer.
///
/// Guards against unbounded growth when the tailed file produces no
/// newlines — binary content or an extremely long single line. When the cap
/// is hit the fragment is discarded with a warning.
pub const MAX_TAIL_PARTIAL_BYTES: usize = MAX_TAIL_READ_BYTES_PER_TICK * 4; // 2 MiB

// =============================================================================
// Keepalive limits
// =============================================================================

/// Period between anti-AFK keystrokes (seconds).
pub const KEEPALIVE_INTERVAL_SECS: u64 = 60;

/// How often the cancel flag is checked within each keepalive sleep (ms).
pub const KEEPALIVE_CANCEL_CHECK_INTERVAL_MS: u64 = 250;

/// Key tapped into the game window each keepalive tick.
pub const KEEPALIVE_KEY: char = 'x';

// =============================================================================
// Game chat input
// =============================================================================

/// Number of Backspace taps emitted to clear the chat input line before
/// typing a relayed message.
pub const CHAT_CLEAR_BACKSPACES: usize = 19;

// =============================================================================
// Telegram
// =============================================================================

/// Base URL of the Telegram Bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when RUST_LOG is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a log line included in diagnostic output.
/// Keeps dropped-line previews readable and bounded.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;
