use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not a valid BDX file (header reads {found:?})")]
    InvalidHeader { found: String },

    #[error("BDX data truncated: read of {len} byte(s) at {offset:#06x} is out of bounds")]
    Truncated { offset: usize, len: usize },

    #[error("Tempo change {index} has a BPM of zero")]
    ZeroTempo { index: usize },

    #[error("Delta time {value} is outside the range of a MIDI variable-length quantity")]
    DeltaOverflow { value: i64 },

    #[error("MIDI read-back error: {0}")]
    Midi(#[from] midly::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
