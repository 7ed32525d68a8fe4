//! Song metadata for display

use super::header::{offset, PART_COUNT};
use super::part::{Part, PartKind};
use super::reader::BdxReader;
use crate::compiler::instrument;
use crate::error::Result;
use serde::Serialize;

/// Summary of a BDX song
#[derive(Debug, Clone, Serialize)]
pub struct SongInfo {
    /// Title lines joined with spaces
    pub title: String,
    /// Display names of the active parts' instruments
    pub instruments: Vec<String>,
    /// Number of parts with an instrument assigned
    pub track_count: usize,
    /// Number of tempo changes
    pub tempo_changes: usize,
    pub bars: u8,
    pub beats: u8,
    /// Kind of each part slot
    pub parts: Vec<PartKind>,
}

impl SongInfo {
    /// Extract metadata from a validated song
    pub fn read(reader: &BdxReader<'_>) -> Result<Self> {
        let mut title = String::new();
        for (i, &line_offset) in offset::TITLE_LINES.iter().enumerate() {
            let line = read_text(reader.bytes_at(line_offset, offset::TITLE_LEN)?);
            if i == 0 {
                title = line;
            } else if !line.trim().is_empty() {
                title.push(' ');
                title.push_str(&line);
            }
        }

        let mut instruments = Vec::new();
        let mut parts = Vec::with_capacity(PART_COUNT);
        for index in 0..PART_COUNT {
            let part = Part::read(reader, index)?;
            if part.instrument != 0 {
                instruments.push(instrument_name(part.instrument, part.kind).to_string());
            }
            parts.push(part.kind);
        }

        Ok(Self {
            title,
            track_count: instruments.len(),
            instruments,
            tempo_changes: reader.tempo_count()?,
            bars: reader.u8_at(offset::BARS)?,
            beats: reader.u8_at(offset::BEATS)?,
            parts,
        })
    }
}

/// Decode a fixed-width ASCII field, dropping trailing NULs
fn read_text(bytes: &[u8]) -> String {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Display name for an instrument byte
pub fn instrument_name(raw: u8, kind: PartKind) -> &'static str {
    if kind == PartKind::Drum {
        return crate::compiler::drum::DrumKit::from_instrument(raw).name();
    }
    match instrument::normalize(raw) {
        0x01 => "Piano",
        0x02 => "Electric Piano",
        0x03 => "Rock Organ",
        0x04 => "Synth Lead",
        0x05 => "Synth Bell",
        0x06 => "Pipe Organ",
        0x07 => "Folk Guitar",
        0x08 => "E. Guitar",
        0x09 => "D. Guitar",
        0x0A => "Rock Guitar",
        0x0B => "Pick Bass",
        0x0C => "Synth Bass",
        0x0D => "A. Bass",
        0x0E => "Strings",
        0x0F => "Violin",
        0x10 => "Double Bass",
        0x11 => "Harp",
        0x12 => "Pizzicato",
        0x13 => "Piccolo",
        0x14 => "Flute",
        0x15 => "Clarinet",
        0x16 => "Oboe",
        0x17 => "Soprano Sax",
        0x18 => "Alto Sax",
        0x19 => "Brass",
        0x1A => "Trumpet",
        0x1B => "Trombone",
        0x1C => "Horn",
        0x1D => "Tuba",
        0x1E => "Harmonica",
        0x1F => "Pan Flute",
        0x20 => "Ocarina",
        0x21 => "Vibraphone",
        0x22 => "Marimba",
        0x23 => "Timpani",
        0x24 => "Steel Drum",
        0x25 => "Chorus",
        0x26 => "Shamisen",
        0x27 => "Koto",
        0x28 => "Shakuhachi",
        0x29 => "Famicom",
        0x83 => "Harpsichord",
        0x84 => "Accordion",
        0x85 => "Mt. Trumpet",
        0x86 => "Music Box",
        0x87 => "Banjo",
        0x88 => "Square Lead",
        0x89 => "Classical Guitar",
        0x8A => "Clean Guitar",
        0x8B => "OD Guitar",
        0x8C => "Slap Bass",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_trims_nuls() {
        assert_eq!(read_text(b"Song\0\0\0\0"), "Song");
        assert_eq!(read_text(b"\0\0\0"), "");
        assert_eq!(read_text(b"A B "), "A B ");
    }

    #[test]
    fn test_instrument_names() {
        assert_eq!(instrument_name(0x01, PartKind::Monophonic), "Piano");
        assert_eq!(instrument_name(0x31, PartKind::Monophonic), "Piano");
        assert_eq!(instrument_name(0x8D, PartKind::Monophonic), "Harpsichord");
        assert_eq!(instrument_name(0x2C, PartKind::Drum), "Synth Drum");
        assert_eq!(instrument_name(0xFE, PartKind::Monophonic), "Unknown");
    }
}
