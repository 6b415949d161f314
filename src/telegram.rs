// whisper-relay - telegram.rs
//
// Blocking Telegram Bot API client: outbound `sendMessage` with MarkdownV2
// bodies and inbound `getUpdates` novelty fetches. Implements the app-layer
// `WhisperSink` and `InboundSource` seams.
//
// Delivery policy: any transport error or non-success status is a logged
// failure — no retry, no queue. The client carries no request timeout; an
// unresponsive endpoint stalls the calling iteration.
//
// The bot token is part of every request URL and is never logged.

use crate::app::relay::InboundSource;
use crate::app::tail::WhisperSink;
use crate::core::model::{PurchaseWhisper, RawWhisper};
use crate::util::constants::TELEGRAM_API_BASE;
use crate::util::error::TelegramError;
use serde::Deserialize;

/// Connection banner sent once at startup.
const STARTUP_MESSAGE: &str = "**🎮 Path of Exile 2 🎮**\n\n\
    Successfully connected to the whisper relay\\! Your trade notifications \
    from Path of Exile 2 will be sent to this chat\\.\n\n\
    Happy trading, Exile\\! 💎";

/// The newest update fetched from the bot's chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    /// Always-increasing identifier, used purely to detect novelty.
    pub update_id: i64,

    /// Message text, absent for non-text updates (stickers, photos, ...).
    pub text: Option<String>,
}

/// Client for one bot token / destination chat pair.
pub struct TelegramClient {
    http: reqwest::blocking::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, TelegramError> {
        // No request timeout: the pipeline tolerates a stalled iteration
        // rather than dropping a send early.
        let http = reqwest::blocking::Client::builder().timeout(None).build()?;
        Ok(Self {
            http,
            bot_token,
            chat_id,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{TELEGRAM_API_BASE}/bot{}/{method}", self.bot_token)
    }

    /// Send the connection banner. Failure is logged and swallowed — the
    /// relay is functional without it.
    pub fn send_startup_notice(&self) {
        match self.send_message(STARTUP_MESSAGE) {
            Ok(()) => tracing::info!("Startup notice sent"),
            Err(e) => tracing::error!(error = %e, "Failed to send startup notice"),
        }
    }

    /// POST one MarkdownV2 message to the destination chat.
    fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "MarkdownV2",
        });

        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Fetch the most recent update in the bot's chat, if any.
    pub fn latest_update(&self) -> Result<Option<InboundUpdate>, TelegramError> {
        let response = self
            .http
            .get(self.method_url("getUpdates"))
            .query(&[("offset", "-1")])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        parse_latest_update(&response.text()?)
    }
}

impl WhisperSink for TelegramClient {
    fn purchase(&self, whisper: &PurchaseWhisper) {
        let body = format_purchase(whisper, &local_timestamp());
        if let Err(e) = self.send_message(&body) {
            tracing::error!(
                error = %e,
                sender = %whisper.sender,
                "Failed to send purchase notification"
            );
        }
    }

    fn raw(&self, whisper: &RawWhisper) {
        let body = format_raw(whisper, &local_timestamp());
        if let Err(e) = self.send_message(&body) {
            tracing::error!(
                error = %e,
                sender = %whisper.sender,
                "Failed to send whisper notification"
            );
        }
    }
}

impl InboundSource for TelegramClient {
    fn latest_update(&self) -> Result<Option<InboundUpdate>, TelegramError> {
        TelegramClient::latest_update(self)
    }
}

// =============================================================================
// Response parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    text: Option<String>,
}

/// Parse a `getUpdates` response body down to the newest update.
pub fn parse_latest_update(body: &str) -> Result<Option<InboundUpdate>, TelegramError> {
    let parsed: UpdatesResponse =
        serde_json::from_str(body).map_err(|e| TelegramError::MalformedUpdate {
            reason: e.to_string(),
        })?;

    if !parsed.ok {
        return Err(TelegramError::MalformedUpdate {
            reason: "response carries ok=false".to_string(),
        });
    }

    Ok(parsed.result.into_iter().last().map(|update| InboundUpdate {
        update_id: update.update_id,
        text: update.message.and_then(|message| message.text),
    }))
}

// =============================================================================
// Message formatting
// =============================================================================

fn local_timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// MarkdownV2 body for a purchase notification. Field values are rendered
/// inside code spans.
fn format_purchase(whisper: &PurchaseWhisper, timestamp: &str) -> String {
    format!(
        "**🎮 Path of Exile 2 🎮**\n\n\
         👤 `{}`\n📦 `{}`\n💰 `{}/{}`\n📍 `{} - {}, {}`\n⏰ `{}`",
        whisper.sender,
        whisper.item,
        whisper.amount,
        whisper.currency,
        whisper.tab,
        whisper.position_left,
        whisper.position_top,
        timestamp
    )
}

/// MarkdownV2 body for a non-purchase whisper.
fn format_raw(whisper: &RawWhisper, timestamp: &str) -> String {
    format!(
        "⏰ `{}`\n👤 `{}`\n💬 `{}`",
        timestamp, whisper.sender, whisper.message
    )
}
