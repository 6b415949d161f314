// whisper-relay - app/relay.rs
//
// Inbound relay: novelty-polling of the newest Telegram update and
// forwarding its text into the game chat as keystrokes.
//
// The offset is purely a novelty detector — it records the identifier of
// the last update already relayed, never decreases, and gives no
// exactly-once guarantee. It is seeded from the newest update at startup
// so messages sent while the relay was down are not replayed.
//
// Every fetch or automation failure is logged and swallowed; the host
// loop always continues to the next iteration.

use crate::platform::window::GameAutomation;
use crate::telegram::InboundUpdate;
use crate::util::error::{AutomationError, TelegramError};

/// Source of the most recent externally-polled message — the narrow seam
/// over the messaging API's fetch operation.
pub trait InboundSource {
    fn latest_update(&self) -> Result<Option<InboundUpdate>, TelegramError>;
}

impl<S: InboundSource> InboundSource for &S {
    fn latest_update(&self) -> Result<Option<InboundUpdate>, TelegramError> {
        (**self).latest_update()
    }
}

/// Relays novel inbound messages into the game chat.
pub struct InboundRelay<S, G> {
    source: S,
    game: G,
    /// Identifier of the last update already seen. `None` until first
    /// contact with the API.
    offset: Option<i64>,
}

impl<S: InboundSource, G: GameAutomation> InboundRelay<S, G> {
    /// Create the relay, seeding the offset from the newest update so
    /// stale messages are not replayed into the game.
    pub fn start(source: S, game: G) -> Self {
        let offset = match source.latest_update() {
            Ok(Some(update)) => {
                tracing::debug!(update_id = update.update_id, "Inbound relay: offset seeded");
                Some(update.update_id)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Inbound relay: could not seed offset; the newest pending message may be replayed"
                );
                None
            }
        };

        Self {
            source,
            game,
            offset,
        }
    }

    /// Identifier of the last update already relayed or skipped.
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// One poll: fetch the newest update and, if it is novel, type its
    /// text into the game chat.
    pub fn poll(&mut self) {
        let update = match self.source.latest_update() {
            Ok(Some(update)) => update,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Inbound relay: fetch failed");
                return;
            }
        };

        if self.offset == Some(update.update_id) {
            return;
        }
        self.offset = Some(update.update_id);

        let Some(text) = update.text else {
            tracing::debug!(
                update_id = update.update_id,
                "Inbound relay: update carries no text; skipped"
            );
            return;
        };

        // The text is forwarded verbatim — no escaping, no length cap.
        match self.game.send_chat_line(&text) {
            Ok(()) => {
                tracing::info!(update_id = update.update_id, "Message relayed into game chat");
            }
            Err(AutomationError::WindowNotFound) => {
                tracing::warn!(
                    update_id = update.update_id,
                    "Inbound relay: game window not found; message dropped"
                );
            }
            Err(e) => {
                tracing::warn!(
                    update_id = update.update_id,
                    error = %e,
                    "Inbound relay: input synthesis failed; message dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Yields a scripted sequence of fetch results, then `None` forever.
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<Option<InboundUpdate>, TelegramError>>>,
    }

    impl ScriptedSource {
        fn new(
            responses: Vec<Result<Option<InboundUpdate>, TelegramError>>,
        ) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
            }
        }
    }

    impl InboundSource for ScriptedSource {
        fn latest_update(&self) -> Result<Option<InboundUpdate>, TelegramError> {
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(None))
        }
    }

    /// Records chat lines; optionally fails every send.
    #[derive(Default)]
    struct FakeGame {
        sent: RefCell<Vec<String>>,
        window_missing: bool,
    }

    impl GameAutomation for FakeGame {
        fn anti_idle_tap(&self) -> Result<(), AutomationError> {
            Ok(())
        }

        fn send_chat_line(&self, text: &str) -> Result<(), AutomationError> {
            if self.window_missing {
                return Err(AutomationError::WindowNotFound);
            }
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn update(id: i64, text: &str) -> Result<Option<InboundUpdate>, TelegramError> {
        Ok(Some(InboundUpdate {
            update_id: id,
            text: Some(text.to_string()),
        }))
    }

    #[test]
    fn test_startup_seeds_offset_and_skips_stale_message() {
        let source = ScriptedSource::new(vec![update(100, "stale"), update(100, "stale")]);
        let mut relay = InboundRelay::start(source, FakeGame::default());
        assert_eq!(relay.offset(), Some(100));

        // The same update seen again produces no relay action.
        relay.poll();
        assert_eq!(relay.offset(), Some(100));
        assert!(relay.game.sent.borrow().is_empty());
    }

    #[test]
    fn test_novel_update_is_typed_into_game_chat() {
        let source = ScriptedSource::new(vec![
            update(100, "stale"),
            update(101, "hello from telegram"),
        ]);
        let mut relay = InboundRelay::start(source, FakeGame::default());

        relay.poll();
        assert_eq!(relay.offset(), Some(101));
        assert_eq!(
            *relay.game.sent.borrow(),
            vec!["hello from telegram".to_string()]
        );
    }

    #[test]
    fn test_offset_never_decreases_across_polls() {
        let source = ScriptedSource::new(vec![
            update(100, "a"),
            update(101, "b"),
            update(101, "b"),
            update(102, "c"),
        ]);
        let mut relay = InboundRelay::start(source, FakeGame::default());

        let mut offsets = vec![relay.offset()];
        for _ in 0..3 {
            relay.poll();
            offsets.push(relay.offset());
        }

        assert_eq!(
            offsets,
            vec![Some(100), Some(101), Some(101), Some(102)]
        );
        assert_eq!(*relay.game.sent.borrow(), vec!["b", "c"]);
    }

    #[test]
    fn test_update_without_text_advances_offset_silently() {
        let source = ScriptedSource::new(vec![
            update(100, "seed"),
            Ok(Some(InboundUpdate {
                update_id: 101,
                text: None,
            })),
        ]);
        let mut relay = InboundRelay::start(source, FakeGame::default());

        relay.poll();
        assert_eq!(relay.offset(), Some(101));
        assert!(relay.game.sent.borrow().is_empty());
    }

    #[test]
    fn test_missing_window_is_swallowed() {
        let source = ScriptedSource::new(vec![update(100, "seed"), update(101, "dropped")]);
        let game = FakeGame {
            window_missing: true,
            ..FakeGame::default()
        };
        let mut relay = InboundRelay::start(source, game);

        // The poll neither panics nor stalls; the offset still advances so
        // the message is not retried forever.
        relay.poll();
        assert_eq!(relay.offset(), Some(101));
    }

    #[test]
    fn test_fetch_failure_leaves_offset_unchanged() {
        let source = ScriptedSource::new(vec![
            update(100, "seed"),
            Err(TelegramError::MalformedUpdate {
                reason: "scripted".to_string(),
            }),
            update(101, "after outage"),
        ]);
        let mut relay = InboundRelay::start(source, FakeGame::default());

        relay.poll();
        assert_eq!(relay.offset(), Some(100));

        relay.poll();
        assert_eq!(relay.offset(), Some(101));
        assert_eq!(*relay.game.sent.borrow(), vec!["after outage"]);
    }
}
