//! Tempo change table and the conductor track built from it

use super::timeline::TICKS_PER_UNIT;
use crate::bdx::header::offset;
use crate::bdx::BdxReader;
use crate::error::{Error, Result};
use crate::midi::track::{OverflowPolicy, TrackChunk, TrackWriter};

/// Text written at the start of the conductor track
pub const TRACK_MARKER: &[u8; 8] = b"bdx2m1d1";

/// One row of the tempo table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoChange {
    /// Position in timeline units
    pub tick: u16,
    pub bpm: u16,
}

impl TempoChange {
    /// Microseconds per quarter note for this tempo
    pub fn micros_per_quarter(&self, index: usize) -> Result<u32> {
        micros_per_quarter(self.bpm).ok_or(Error::ZeroTempo { index })
    }
}

/// `60_000_000 / bpm`, or `None` for a zero tempo
pub fn micros_per_quarter(bpm: u16) -> Option<u32> {
    60_000_000u32.checked_div(bpm as u32)
}

/// Read every tempo change up to the table sentinel
pub fn read_tempo_changes(reader: &BdxReader<'_>) -> Result<Vec<TempoChange>> {
    let count = reader.tempo_count()?;
    (0..count)
        .map(|i| {
            let record = offset::TEMPO_TABLE + i * offset::TEMPO_STRIDE;
            Ok(TempoChange {
                tick: reader.u16_le_at(record)?,
                bpm: reader.u16_le_at(record + 2)?,
            })
        })
        .collect()
}

/// Build the conductor track: the marker text, then one tempo event per change
pub fn tempo_track(changes: &[TempoChange], policy: OverflowPolicy) -> Result<TrackChunk> {
    let mut writer = TrackWriter::new(policy);
    writer.text(0, TRACK_MARKER)?;

    let mut previous: Option<u16> = None;
    for (i, change) in changes.iter().enumerate() {
        let delta = match previous {
            Some(prev) => (change.tick as i64 - prev as i64) * TICKS_PER_UNIT as i64,
            None => 0,
        };
        writer.tempo(delta, change.micros_per_quarter(i)?)?;
        previous = Some(change.tick);
    }

    writer.finish()
}
