//! Part slots and their rendering kinds

use super::header::offset;
use super::reader::BdxReader;
use crate::error::Result;
use serde::Serialize;

/// How a chord part renders its chord symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum ChordStyle {
    /// Six-string fret shapes; `custom` parts also load the custom shape table
    Guitar { custom: bool },
    /// Voiced triads/tetrads under the voicing ceiling
    Piano,
}

/// Part kind, decided once from the part record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartKind {
    /// No instrument assigned
    Silent,
    /// One note per step
    Monophonic,
    /// Two pad nibbles per step
    Drum,
    /// Chord symbol per step, rendered on six strings
    Chord(ChordStyle),
}

impl PartKind {
    /// Classify a part from its instrument and type bytes
    pub fn from_bytes(instrument: u8, part_type: u8) -> Self {
        if instrument == 0 {
            return Self::Silent;
        }
        match part_type {
            0 => Self::Monophonic,
            1 => Self::Drum,
            2 => Self::Chord(ChordStyle::Guitar { custom: true }),
            3 => Self::Chord(ChordStyle::Piano),
            _ => Self::Chord(ChordStyle::Guitar { custom: false }),
        }
    }

    /// Number of track chunks this part contributes to the file
    pub fn track_count(&self) -> usize {
        match self {
            Self::Silent | Self::Monophonic => 1,
            Self::Drum => 2,
            Self::Chord(_) => 6,
        }
    }
}

/// One of the eight part slots of a song
#[derive(Debug, Clone)]
pub struct Part<'a> {
    pub index: usize,
    pub instrument: u8,
    pub volume: u8,
    pub kind: PartKind,
    /// Step codes, one per played step
    pub steps: &'a [u8],
}

impl<'a> Part<'a> {
    /// Read part `index` from the song
    pub fn read(reader: &BdxReader<'a>, index: usize) -> Result<Self> {
        let record = offset::part(index);
        let volume = reader.u8_at(record + offset::PART_VOLUME)?;
        let instrument = reader.u8_at(record + offset::PART_INSTRUMENT)?;
        let part_type = reader.u8_at(record + offset::PART_TYPE)?;
        let kind = PartKind::from_bytes(instrument, part_type);

        let steps = match kind {
            PartKind::Silent => &[][..],
            _ => reader.bytes_at(offset::steps(index), reader.step_count()?)?,
        };

        Ok(Self {
            index,
            instrument,
            volume,
            kind,
            steps,
        })
    }

    /// MIDI channel for melodic events
    pub fn channel(&self) -> u8 {
        self.index as u8
    }
}
