//! Standard MIDI File output

pub mod track;
pub mod vlq;
pub mod writer;

pub use track::{OverflowPolicy, TrackChunk, TrackWriter};
pub use writer::SmfWriter;
