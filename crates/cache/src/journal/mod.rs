//! Durable append-only journal
//!
//! A journal is a text file with one encoded event per line. Opening it
//! replays every line into a caller supplied callback; afterwards events are
//! appended and flushed one at a time. Compaction swaps the whole file for a
//! snapshot of the current state.
//!
//! The journal knows nothing about the events it stores: encoding is
//! delegated to a [`JournalCodec`].

mod append;
mod codec;
mod compaction;
mod replay;
mod writer;

pub use codec::{DeserializationError, JournalCodec, JsonCodec};
pub use writer::Journal;
