//! Standard MIDI File assembly

use super::track::TrackChunk;

/// Header chunk magic
pub const HEADER_MAGIC: &[u8; 4] = b"MThd";

/// Header chunk body length
pub const HEADER_LEN: u32 = 6;

/// Multi-track format
pub const FORMAT_MULTI_TRACK: u16 = 1;

/// Ticks per quarter note used for every converted file
pub const TICKS_PER_QUARTER: u16 = 480;

/// Collects track chunks in file order and emits the final SMF
#[derive(Debug, Default)]
pub struct SmfWriter {
    tracks: Vec<TrackChunk>,
}

impl SmfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track chunk
    pub fn push(&mut self, chunk: TrackChunk) {
        self.tracks.push(chunk);
    }

    /// Number of tracks so far
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Write the header chunk followed by every track
    pub fn finish(self) -> Vec<u8> {
        let body: usize = self.tracks.iter().map(TrackChunk::byte_len).sum();
        let mut out = Vec::with_capacity(14 + body);

        out.extend_from_slice(HEADER_MAGIC);
        out.extend_from_slice(&HEADER_LEN.to_be_bytes());
        out.extend_from_slice(&FORMAT_MULTI_TRACK.to_be_bytes());
        out.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

        for track in self.tracks {
            out.extend_from_slice(track.as_bytes());
        }
        out
    }
}
