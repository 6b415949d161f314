// whisper-relay - core/classify.rs
//
// Whisper line classification and field extraction.
// Core layer: pure functions over &str, no I/O, no side effects.
//
// Decision order (first match wins):
//   1. no whisper marker            -> NotWhisper
//   2. marker + buy-offer phrase    -> purchase grammar, else Unparseable
//   3. marker without the phrase    -> raw grammar, else Unparseable
//
// The free-text region (sender, greeting, item name) is scanned explicitly
// so the item-name-containing-`$` case is a named branch rather than an
// implicit pattern failure; the structured trailer is matched by one
// anchored regex.

use crate::core::model::{Classification, PurchaseWhisper, RawWhisper};
use crate::util::constants::{
    BUY_PHRASE, PURCHASE_GREETING, PURCHASE_PRICE_DELIMITER, WHISPER_MARKER,
};
use regex::Regex;
use std::sync::OnceLock;

/// Anchored pattern for the structured trailer that follows the item name:
/// `<amount> <currency> in <league> (stash tab "<tab>"; position: left <l>, top <t>)`.
///
/// The league name is matched but not captured — the whisper template
/// always carries it, yet no consumer needs it.
fn trailer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"^(\d+) (\w+) in \w+ \(stash tab "([^"]+)"; position: left (\d+), top (\d+)\)"#,
        )
        .expect("trailer pattern is a valid regex")
    })
}

/// Classify one log line.
///
/// Pure function: equal inputs always produce structurally equal results.
pub fn classify(line: &str) -> Classification {
    if !line.contains(WHISPER_MARKER) {
        return Classification::NotWhisper;
    }

    if line.contains(BUY_PHRASE) {
        match parse_purchase(line) {
            Some(purchase) => Classification::Purchase(purchase),
            None => Classification::Unparseable,
        }
    } else {
        match parse_raw(line) {
            Some(raw) => Classification::Raw(raw),
            None => Classification::Unparseable,
        }
    }
}

/// Split the whisper body at the first `@From` into `(sender, rest)`.
///
/// The sender is the text between `@From ` and the first `:`; `rest` is
/// everything after that colon, untrimmed.
fn whisper_body(line: &str) -> Option<(&str, &str)> {
    let start = line.find(WHISPER_MARKER)? + WHISPER_MARKER.len();
    let after_marker = line[start..].strip_prefix(' ')?;
    let (sender, rest) = after_marker.split_once(':')?;
    if sender.is_empty() {
        return None;
    }
    Some((sender, rest))
}

/// Extract the purchase template fields. `None` means the line carried the
/// buy-offer phrase but defeated the strict grammar.
fn parse_purchase(line: &str) -> Option<PurchaseWhisper> {
    let (sender, rest) = whisper_body(line)?;
    let body = rest.strip_prefix(' ')?.strip_prefix(PURCHASE_GREETING)?;
    let (item, trailer) = body.split_once(PURCHASE_PRICE_DELIMITER)?;

    // The grammar bounds the item name as a `$`-free span; an item whose
    // name contains a literal dollar sign is not representable.
    if item.contains('$') {
        return None;
    }

    let caps = trailer_pattern().captures(trailer)?;
    Some(PurchaseWhisper {
        sender: sender.trim().to_string(),
        item: item.trim().to_string(),
        amount: caps[1].parse().ok()?,
        currency: caps[2].to_string(),
        tab: caps[3].to_string(),
        position_left: caps[4].parse().ok()?,
        position_top: caps[5].parse().ok()?,
    })
}

/// Extract the sender and message of a non-purchase whisper. The message is
/// bounded at the first `$` and must be non-empty before trimming.
fn parse_raw(line: &str) -> Option<RawWhisper> {
    let (sender, rest) = whisper_body(line)?;
    let message = match rest.find('$') {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    if message.is_empty() {
        return None;
    }
    Some(RawWhisper {
        sender: sender.trim().to_string(),
        message: message.trim().to_string(),
    })
}
