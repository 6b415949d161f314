// whisper-relay - tests/e2e_pipeline.rs
//
// End-to-end tests for the tail-and-classify pipeline.
//
// These tests exercise the real filesystem: a temp log file is appended to
// exactly the way the game client writes, and the full path from raw bytes
// on disk to dispatched whisper values is verified — no mocks below the
// sink seam.

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;
use whisper_relay::app::relay::{InboundRelay, InboundSource};
use whisper_relay::app::tail::{dispatch, LogTail, WhisperSink};
use whisper_relay::core::model::{PurchaseWhisper, RawWhisper};
use whisper_relay::platform::window::GameAutomation;
use whisper_relay::telegram::InboundUpdate;
use whisper_relay::util::error::{AutomationError, TelegramError};

// =============================================================================
// Helpers
// =============================================================================

fn make_log(initial: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Client.txt");
    fs::write(&path, initial).expect("write initial log");
    (dir, path)
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .expect("open for append");
    file.write_all(text.as_bytes()).expect("append");
}

/// Records every dispatched whisper in order.
#[derive(Default)]
struct CollectingSink {
    purchases: RefCell<Vec<PurchaseWhisper>>,
    raws: RefCell<Vec<RawWhisper>>,
    unparseable: RefCell<Vec<String>>,
    order: RefCell<Vec<String>>,
}

impl WhisperSink for CollectingSink {
    fn purchase(&self, whisper: &PurchaseWhisper) {
        self.order.borrow_mut().push(format!("purchase:{}", whisper.sender));
        self.purchases.borrow_mut().push(whisper.clone());
    }

    fn raw(&self, whisper: &RawWhisper) {
        self.order.borrow_mut().push(format!("raw:{}", whisper.sender));
        self.raws.borrow_mut().push(whisper.clone());
    }

    fn unparseable(&self, line: &str) {
        self.order.borrow_mut().push("unparseable".to_string());
        self.unparseable.borrow_mut().push(line.to_string());
    }
}

/// Drain every currently complete line through the classifier into `sink`.
fn drain(tail: &mut LogTail, sink: &CollectingSink) {
    while let Some(line) = tail.next_line().expect("tail read") {
        dispatch(line.trim_end(), sink);
    }
}

// =============================================================================
// Tail -> classify -> sink
// =============================================================================

#[test]
fn e2e_purchase_whisper_flows_from_disk_to_sink() {
    let (_dir, path) = make_log("2024/01/15 19:59:00 [INFO Client 22] old history line\n");
    let mut tail = LogTail::open(&path).expect("open tail");
    let sink = CollectingSink::default();

    append(
        &path,
        "2024/01/15 20:00:01 1234 aa1 [INFO Client 22] @From Player1: Hi, I would like to \
         buy your Mirror of Kalandra listed for 50 chaos in Standard \
         (stash tab \"Sell\"; position: left 3, top 2)\n",
    );
    drain(&mut tail, &sink);

    let purchases = sink.purchases.borrow();
    assert_eq!(purchases.len(), 1);
    assert_eq!(
        purchases[0],
        PurchaseWhisper {
            sender: "Player1".to_string(),
            item: "Mirror of Kalandra".to_string(),
            amount: 50,
            currency: "chaos".to_string(),
            tab: "Sell".to_string(),
            position_left: 3,
            position_top: 2,
        }
    );
    // The pre-existing history line was never classified.
    assert_eq!(sink.order.borrow().len(), 1);
}

#[test]
fn e2e_mixed_burst_dispatches_in_file_order() {
    let (_dir, path) = make_log("");
    let mut tail = LogTail::open(&path).expect("open tail");
    let sink = CollectingSink::default();

    append(
        &path,
        "@From Buyer: Hi, I would like to buy your Chaos Orb listed for 2 divine in \
         Standard (stash tab \"Trade 1\"; position: left 1, top 1)\n\
         Player3 has joined the area.\n\
         @From Friend: you around?\n\
         @From Odd: Hi, I would like to buy your Cash$Grab listed for 1 chaos in \
         Standard (stash tab \"Sell\"; position: left 1, top 1)\n",
    );
    drain(&mut tail, &sink);

    assert_eq!(
        *sink.order.borrow(),
        vec![
            "purchase:Buyer".to_string(),
            "raw:Friend".to_string(),
            "unparseable".to_string(),
        ]
    );
    assert_eq!(sink.raws.borrow()[0].message, "you around?");
    assert_eq!(sink.unparseable.borrow().len(), 1);
}

#[test]
fn e2e_partial_line_is_held_until_completed() {
    let (_dir, path) = make_log("");
    let mut tail = LogTail::open(&path).expect("open tail");
    let sink = CollectingSink::default();

    append(&path, "@From Friend: are you");
    drain(&mut tail, &sink);
    assert!(sink.order.borrow().is_empty());

    append(&path, " there?\n");
    drain(&mut tail, &sink);
    assert_eq!(sink.raws.borrow()[0].message, "are you there?");
}

#[test]
fn e2e_windows_line_endings_are_stripped() {
    let (_dir, path) = make_log("");
    let mut tail = LogTail::open(&path).expect("open tail");
    let sink = CollectingSink::default();

    append(&path, "@From Friend: crlf message\r\n");
    drain(&mut tail, &sink);

    assert_eq!(sink.raws.borrow()[0].message, "crlf message");
}

// =============================================================================
// Inbound relay over the real seams
// =============================================================================

struct ScriptedSource {
    responses: RefCell<Vec<Option<InboundUpdate>>>,
}

impl InboundSource for ScriptedSource {
    fn latest_update(&self) -> Result<Option<InboundUpdate>, TelegramError> {
        let mut responses = self.responses.borrow_mut();
        if responses.is_empty() {
            Ok(None)
        } else {
            Ok(responses.remove(0))
        }
    }
}

/// Records chat lines into shared storage the test can inspect after the
/// game value has moved into the relay.
struct RecordingGame {
    chat_lines: Rc<RefCell<Vec<String>>>,
}

impl GameAutomation for RecordingGame {
    fn anti_idle_tap(&self) -> Result<(), AutomationError> {
        Ok(())
    }

    fn send_chat_line(&self, text: &str) -> Result<(), AutomationError> {
        self.chat_lines.borrow_mut().push(text.to_string());
        Ok(())
    }
}

#[test]
fn e2e_relay_forwards_only_novel_updates() {
    let source = ScriptedSource {
        responses: RefCell::new(vec![
            // Startup seed: this message predates the relay and is skipped.
            Some(InboundUpdate {
                update_id: 500,
                text: Some("stale".to_string()),
            }),
            Some(InboundUpdate {
                update_id: 500,
                text: Some("stale".to_string()),
            }),
            Some(InboundUpdate {
                update_id: 501,
                text: Some("go to the hideout".to_string()),
            }),
            Some(InboundUpdate {
                update_id: 501,
                text: Some("go to the hideout".to_string()),
            }),
        ]),
    };

    let chat_lines = Rc::new(RefCell::new(Vec::new()));
    let mut relay = InboundRelay::start(
        source,
        RecordingGame {
            chat_lines: Rc::clone(&chat_lines),
        },
    );
    assert_eq!(relay.offset(), Some(500));

    for _ in 0..3 {
        relay.poll();
    }

    // The novel update was typed exactly once; the repeats were ignored.
    assert_eq!(relay.offset(), Some(501));
    assert_eq!(*chat_lines.borrow(), vec!["go to the hideout".to_string()]);
}
