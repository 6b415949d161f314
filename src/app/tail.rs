// whisper-relay - app/tail.rs
//
// Live tail of the client log plus the main pipeline loop.
//
// Architecture:
//   - `LogTail` owns the read cursor: byte offset, partial-line carry
//     buffer, and the queue of complete-but-undelivered lines. The cursor
//     is seeded to the current end of file so history is never replayed.
//   - `run` drives the pipeline on the calling thread: one inbound-relay
//     poll, then at most one new line per iteration. A complete line is
//     classified and dispatched with no delay (bursts drain unthrottled);
//     an incomplete read sleeps one poll interval.
//   - A partially written line (no trailing newline yet) is never
//     surfaced; it is carried until a later poll completes it.
//
// Encoding: new bytes are decoded as lossy UTF-8. The client log is
// written line-by-line by the game, so split multibyte sequences only
// occur at read-cap boundaries and resolve on the next tick's lines.
//
// Error handling: stat/read errors are fatal to the pipeline — the loop
// reports them and exits; the operator restarts the process. The cursor
// never rewinds, so a truncated or rotated file is logged and treated as
// "no new data" until it grows past the cursor again.

use crate::core::classify::classify;
use crate::core::model::{Classification, PurchaseWhisper, RawWhisper};
use crate::util::constants::{
    DEBUG_MAX_LINE_PREVIEW, MAX_TAIL_PARTIAL_BYTES, MAX_TAIL_READ_BYTES_PER_TICK,
    TAIL_POLL_INTERVAL_MS,
};
use crate::util::error::TailError;
use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Output sink
// =============================================================================

/// Destination for classified whispers — the narrow seam between the
/// pipeline and the messaging collaborator.
///
/// Implementations absorb their own delivery failures (log and continue);
/// dispatch never propagates sink errors into the tail loop.
pub trait WhisperSink {
    fn purchase(&self, whisper: &PurchaseWhisper);
    fn raw(&self, whisper: &RawWhisper);

    /// A line that carried the whisper marker but defeated the extraction
    /// grammar. Already logged by the dispatcher; most sinks ignore it.
    fn unparseable(&self, _line: &str) {}
}

// =============================================================================
// LogTail
// =============================================================================

/// Forward-only reader over the growing client log.
pub struct LogTail {
    path: PathBuf,
    /// Byte position of the last byte consumed from the file.
    /// Advances by exactly the number of bytes read each tick and never
    /// rewinds.
    offset: u64,
    /// Bytes from the most recent read that followed the final newline —
    /// an in-progress line, prepended to the next tick's decoded bytes.
    partial: String,
    /// Complete lines read but not yet delivered, in file order.
    pending: VecDeque<String>,
}

impl LogTail {
    /// Open `path` for tailing, seeding the cursor to the current end of
    /// file so only content appended afterwards is ever surfaced.
    pub fn open(path: &Path) -> Result<Self, TailError> {
        let metadata = std::fs::metadata(path).map_err(|e| TailError::Io {
            path: path.to_path_buf(),
            operation: "stat",
            source: e,
        })?;
        let offset = metadata.len();

        tracing::debug!(
            file = %path.display(),
            offset,
            "Tail: seeding initial offset"
        );

        Ok(Self {
            path: path.to_path_buf(),
            offset,
            partial: String::new(),
            pending: VecDeque::new(),
        })
    }

    /// Current byte offset of the read cursor.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Return the next complete appended line, or `None` when no complete
    /// new line exists yet.
    ///
    /// Lines are delivered strictly in file order.
    pub fn next_line(&mut self) -> Result<Option<String>, TailError> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Some(line));
        }

        let current_size = std::fs::metadata(&self.path)
            .map_err(|e| TailError::Io {
                path: self.path.clone(),
                operation: "stat",
                source: e,
            })?
            .len();

        // The cursor never rewinds. A shrunken file (truncation/rotation)
        // yields nothing until it grows past the cursor again.
        if current_size < self.offset {
            tracing::warn!(
                file = %self.path.display(),
                cursor = self.offset,
                size = current_size,
                "Tail: file shrank below the cursor; waiting for it to grow"
            );
            return Ok(None);
        }

        if current_size == self.offset {
            return Ok(None);
        }

        let bytes_available = (current_size - self.offset) as usize;
        let read_limit = bytes_available.min(MAX_TAIL_READ_BYTES_PER_TICK);

        let new_bytes =
            read_bytes_at(&self.path, self.offset, read_limit).map_err(|e| TailError::Io {
                path: self.path.clone(),
                operation: "read",
                source: e,
            })?;

        let n = new_bytes.len();
        if n == 0 {
            return Ok(None);
        }

        // Advance unconditionally — these bytes are consumed whether or not
        // they produced a complete line.
        self.offset += n as u64;

        let decoded = String::from_utf8_lossy(&new_bytes);
        self.partial.push_str(&decoded);

        // Everything up to and including the final '\n' is complete; bytes
        // after it are an in-progress line carried to the next tick.
        match self.partial.rfind('\n') {
            Some(nl_pos) => {
                let complete = self.partial[..=nl_pos].to_string();
                self.partial = self.partial[nl_pos + 1..].to_string();
                for line in complete.lines() {
                    self.pending.push_back(line.to_string());
                }
            }
            None => {
                if self.partial.len() > MAX_TAIL_PARTIAL_BYTES {
                    tracing::warn!(
                        file = %self.path.display(),
                        dropped_bytes = self.partial.len(),
                        "Tail: discarding oversized never-terminated line fragment"
                    );
                    self.partial.clear();
                }
                return Ok(None);
            }
        }

        Ok(self.pending.pop_front())
    }
}

/// Read up to `limit` bytes from `path` starting at byte position `offset`.
fn read_bytes_at(path: &Path, offset: u64, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; limit];
    let n = file.read(&mut buf)?;
    buf.truncate(n);
    Ok(buf)
}

// =============================================================================
// Pipeline loop
// =============================================================================

/// Run the pipeline until a fatal tail error.
///
/// Each iteration polls the inbound relay once, then consumes at most one
/// new log line. `poll_inbound` is a no-op closure for the variant without
/// the relay.
pub fn run<S: WhisperSink>(
    mut tail: LogTail,
    sink: &S,
    mut poll_inbound: impl FnMut(),
) -> Result<(), TailError> {
    loop {
        poll_inbound();

        match tail.next_line()? {
            Some(line) => dispatch(line.trim_end(), sink),
            None => std::thread::sleep(Duration::from_millis(TAIL_POLL_INTERVAL_MS)),
        }
    }
}

/// Classify one trimmed line and hand the result to the sink.
///
/// Empty lines and non-whispers produce no dispatch. An unparseable
/// whisper is logged with a bounded preview — it is a dropped whisper, not
/// background noise.
pub fn dispatch<S: WhisperSink>(line: &str, sink: &S) {
    if line.is_empty() {
        return;
    }

    match classify(line) {
        Classification::Purchase(purchase) => {
            tracing::info!(
                sender = %purchase.sender,
                item = %purchase.item,
                amount = purchase.amount,
                currency = %purchase.currency,
                "New purchase whisper"
            );
            sink.purchase(&purchase);
        }
        Classification::Raw(raw) => {
            tracing::info!(sender = %raw.sender, "New whisper");
            sink.raw(&raw);
        }
        Classification::Unparseable => {
            let preview: String = line.chars().take(DEBUG_MAX_LINE_PREVIEW).collect();
            tracing::warn!(line = %preview, "Whisper failed field extraction; dropped");
            sink.unparseable(line);
        }
        Classification::NotWhisper => {}
    }
}
