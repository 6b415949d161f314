// whisper-relay - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies; the shared vocabulary across all layers.

/// A whisper generated by the game when another player initiates a trade
/// purchase, following the fixed phrasing template.
///
/// Immutable once constructed; consumed exactly once by the output sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseWhisper {
    /// Character name of the buyer.
    pub sender: String,

    /// Item name, trimmed. An item name containing a literal `$` is not
    /// representable (see `classify`).
    pub item: String,

    /// Offered amount of the currency.
    pub amount: u64,

    /// Currency token (word characters only).
    pub currency: String,

    /// Stash tab name — the exact quoted substring, quotes stripped,
    /// interior spaces preserved.
    pub tab: String,

    /// Grid column of the item within the stash tab.
    pub position_left: u32,

    /// Grid row of the item within the stash tab.
    pub position_top: u32,
}

/// A whisper that does not follow the purchase template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWhisper {
    /// Character name of the sender.
    pub sender: String,

    /// Message text, trimmed of surrounding whitespace.
    pub message: String,
}

/// Result of classifying one log line.
///
/// `Unparseable` is deliberately distinct from `NotWhisper`: a line that
/// carries the whisper marker but defeats the extraction grammar is a
/// dropped whisper, and the dispatcher logs it instead of passing over it
/// silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The line matched the full purchase template.
    Purchase(PurchaseWhisper),

    /// The line is a whisper without the buy-offer phrase.
    Raw(RawWhisper),

    /// The line contains the whisper marker but failed field extraction.
    Unparseable,

    /// The line is not a whisper at all.
    NotWhisper,
}
