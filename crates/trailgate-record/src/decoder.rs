//! Lazy iteration over a host batch.

use crate::{resolve_timestamp, HostTimestamp, RawValue};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::warn;

/// Result of pulling one record from a host batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeStatus {
    /// A record and its untyped timestamp.
    Record(HostTimestamp, RawValue),
    /// The batch is exhausted.
    End,
    /// The host decoder failed; nothing more can be read.
    Error(String),
}

/// The host's batch decoding primitive.
pub trait BatchDecoder {
    /// Pull the next record.
    fn next_record(&mut self) -> DecodeStatus;

    /// Wrap the decoder in a lazy record iterator.
    fn records(self) -> Records<Self>
    where
        Self: Sized,
    {
        Records::new(self)
    }
}

impl<D: BatchDecoder + ?Sized> BatchDecoder for &mut D {
    fn next_record(&mut self) -> DecodeStatus {
        (**self).next_record()
    }
}

/// One decoded record with its position in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// Zero-based position in the batch.
    pub index: usize,
    /// Resolved absolute time.
    pub timestamp: DateTime<Utc>,
    /// The untouched host record.
    pub record: RawValue,
}

/// Iterator over the records of one batch.
///
/// Stops at the first `End` or `Error` and stays stopped afterwards.
pub struct Records<D> {
    decoder: D,
    next_index: usize,
    done: bool,
}

impl<D: BatchDecoder> Records<D> {
    /// Create an iterator over a decoder.
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            next_index: 0,
            done: false,
        }
    }

    /// Number of records yielded so far.
    pub fn decoded(&self) -> usize {
        self.next_index
    }
}

impl<D: BatchDecoder> Iterator for Records<D> {
    type Item = DecodedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.decoder.next_record() {
            DecodeStatus::Record(ts, record) => {
                let index = self.next_index;
                self.next_index += 1;
                Some(DecodedRecord {
                    index,
                    timestamp: resolve_timestamp(&ts),
                    record,
                })
            }
            DecodeStatus::End => {
                self.done = true;
                None
            }
            DecodeStatus::Error(reason) => {
                warn!(
                    index = self.next_index,
                    reason = %reason,
                    "host decoder failed, ending batch early"
                );
                self.done = true;
                None
            }
        }
    }
}

/// Decoder over records that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDecoder {
    pending: VecDeque<DecodeStatus>,
}

impl MemoryDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a record.
    pub fn push(&mut self, timestamp: HostTimestamp, record: RawValue) {
        self.pending.push_back(DecodeStatus::Record(timestamp, record));
    }

    /// Queue a record, builder style.
    pub fn with_record(mut self, timestamp: HostTimestamp, record: RawValue) -> Self {
        self.push(timestamp, record);
        self
    }

    /// Queue a decoder failure.
    pub fn with_error(mut self, reason: impl Into<String>) -> Self {
        self.pending.push_back(DecodeStatus::Error(reason.into()));
        self
    }

    /// Number of queued statuses.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl BatchDecoder for MemoryDecoder {
    fn next_record(&mut self) -> DecodeStatus {
        self.pending.pop_front().unwrap_or(DecodeStatus::End)
    }
}
