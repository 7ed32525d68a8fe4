//! Track chunk assembly

use super::vlq;
use crate::compiler::timeline::{TimelineEvent, TICKS_PER_STEP, TICKS_PER_UNIT};
use crate::error::{Error, Result};
use tracing::warn;

/// Track chunk magic
pub const TRACK_MAGIC: &[u8; 4] = b"MTrk";

/// Channel voice and meta status bytes
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    pub const META: u8 = 0xFF;
}

/// Meta event types
pub mod meta {
    pub const TEXT: u8 = 0x01;
    pub const TEMPO: u8 = 0x51;
    pub const END_OF_TRACK: u8 = 0x2F;
}

/// General MIDI percussion channel (zero-indexed)
pub const DRUM_CHANNEL: u8 = 9;

/// What to do with a delta time that does not fit in a VLQ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Abort the conversion with [`Error::DeltaOverflow`]
    #[default]
    Fail,
    /// Log a warning and write a zero delta
    Substitute,
}

/// A finished `MTrk` chunk (8-byte header + body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackChunk {
    data: Vec<u8>,
}

impl TrackChunk {
    /// Chunk with no events besides end-of-track
    pub fn empty() -> Self {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(TRACK_MAGIC);
        data.extend_from_slice(&4u32.to_be_bytes());
        data.extend_from_slice(&[0x00, status::META, meta::END_OF_TRACK, 0x00]);
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Total size including the chunk header
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Body length stored in the chunk header
    pub fn declared_len(&self) -> u32 {
        u32::from_be_bytes([self.data[4], self.data[5], self.data[6], self.data[7]])
    }
}

/// Incremental `MTrk` writer
pub struct TrackWriter {
    data: Vec<u8>,
    policy: OverflowPolicy,
}

impl TrackWriter {
    /// Start a chunk with a placeholder length
    pub fn new(policy: OverflowPolicy) -> Self {
        let mut data = Vec::with_capacity(256);
        data.extend_from_slice(TRACK_MAGIC);
        data.extend_from_slice(&0u32.to_be_bytes());
        Self { data, policy }
    }

    /// Write a delta time in MIDI ticks
    pub fn write_delta(&mut self, ticks: i64) -> Result<()> {
        let written = u32::try_from(ticks)
            .map_err(|_| Error::DeltaOverflow { value: ticks })
            .and_then(|value| vlq::write(&mut self.data, value));
        match written {
            Err(Error::DeltaOverflow { .. }) if self.policy == OverflowPolicy::Substitute => {
                warn!(ticks, "delta time is too large; writing 0");
                self.data.push(0);
                Ok(())
            }
            other => other,
        }
    }

    /// Write an event (delta followed by raw bytes)
    pub fn write_event(&mut self, delta: i64, bytes: &[u8]) -> Result<()> {
        self.write_delta(delta)?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn program_change(&mut self, delta: i64, channel: u8, program: u8) -> Result<()> {
        self.write_event(delta, &[status::PROGRAM_CHANGE | channel, program])
    }

    pub fn note_on(&mut self, delta: i64, channel: u8, key: u8, velocity: u8) -> Result<()> {
        self.write_event(delta, &[status::NOTE_ON | channel, key, velocity])
    }

    pub fn note_off(&mut self, delta: i64, channel: u8, key: u8, velocity: u8) -> Result<()> {
        self.write_event(delta, &[status::NOTE_OFF | channel, key, velocity])
    }

    /// Write a meta event with a one-byte length
    pub fn meta(&mut self, delta: i64, kind: u8, payload: &[u8]) -> Result<()> {
        self.write_delta(delta)?;
        self.data.extend_from_slice(&[status::META, kind]);
        vlq::write(&mut self.data, payload.len() as u32)?;
        self.data.extend_from_slice(payload);
        Ok(())
    }

    pub fn text(&mut self, delta: i64, text: &[u8]) -> Result<()> {
        self.meta(delta, meta::TEXT, text)
    }

    /// Tempo meta event (`FF 51 03 tt tt tt`)
    pub fn tempo(&mut self, delta: i64, micros_per_quarter: u32) -> Result<()> {
        let b = micros_per_quarter.to_be_bytes();
        self.meta(delta, meta::TEMPO, &b[1..])
    }

    /// Append end-of-track and patch the chunk length
    pub fn finish(mut self) -> Result<TrackChunk> {
        self.meta(0, meta::END_OF_TRACK, &[])?;
        let body_len = (self.data.len() - 8) as u32;
        self.data[4..8].copy_from_slice(&body_len.to_be_bytes());
        Ok(TrackChunk { data: self.data })
    }
}

/// Build a note track from an ordered event list.
///
/// Each event after the first turns off the previous pitch and, unless it is
/// a rest (note 0), starts its own. The last sounding note is closed with the
/// last delta seen (one step when there is only one event).
pub fn assemble(
    channel: u8,
    program: Option<u8>,
    events: &[TimelineEvent],
    policy: OverflowPolicy,
) -> Result<TrackChunk> {
    let mut writer = TrackWriter::new(policy);

    if let Some(program) = program {
        writer.program_change(0, channel, program)?;
    }

    let mut last_delta = TICKS_PER_STEP as i64;
    for (i, event) in events.iter().enumerate() {
        if i == 0 {
            if event.is_rest() {
                writer.note_off(0, channel, 0, event.velocity)?;
            } else {
                writer.note_on(0, channel, event.note, event.velocity)?;
            }
            continue;
        }

        let prev = &events[i - 1];
        let delta = (event.tick as i64 - prev.tick as i64) * TICKS_PER_UNIT as i64;
        writer.note_off(delta, channel, prev.note, prev.velocity)?;
        if !event.is_rest() {
            writer.note_on(0, channel, event.note, event.velocity)?;
        }
        last_delta = delta;
    }

    if let Some(last) = events.last() {
        if !last.is_rest() {
            writer.note_off(last_delta, channel, last.note, last.velocity)?;
        }
    }

    writer.finish()
}
