//! Chord symbols and how they are voiced on six strings
//!
//! Every chord part renders onto six voices ("strings"). Guitar parts use
//! fret shapes over standard tuning; piano parts stack triad or tetrad
//! intervals under a ceiling note and spread them by the configured spacing.

use super::envelope::SparseTimeline;
use crate::bdx::header::{offset, CUSTOM_CHORD_COUNT};
use crate::bdx::BdxReader;
use crate::error::Result;

/// Voices per chord part
pub const STRING_COUNT: usize = 6;

/// Open-string notes, high E down to low E
pub const OPEN_STRINGS: [u8; STRING_COUNT] = [0x4C, 0x47, 0x43, 0x3E, 0x39, 0x34];

/// Root byte that marks a custom chord reference
pub const CUSTOM_ROOT: u8 = 0xFF;

/// One note per string; 0 leaves the string silent
pub type Voicing = [u8; STRING_COUNT];

/// Encoded chord symbol: root byte (accidental << 4 | letter) and quality byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChordSymbol {
    pub root: u8,
    pub quality: u8,
}

impl ChordSymbol {
    /// Value of timeline slots before the first chord change
    pub const UNSET: Self = Self::from_raw(0x8080);

    pub const fn from_raw(raw: u16) -> Self {
        Self {
            root: (raw >> 8) as u8,
            quality: raw as u8,
        }
    }

    /// Index into a custom chord table, if this symbol references one
    pub fn custom_index(&self) -> Option<usize> {
        (self.root == CUSTOM_ROOT).then_some(self.quality as usize)
    }

    /// Pitch class of the root, accidental applied (C flat gives -1)
    pub fn root_pitch(&self) -> i32 {
        let accidental = match self.root >> 4 {
            1 => 1,
            2 => -1,
            _ => 0,
        };
        let natural = match self.root & 0x0F {
            0 => 0,
            1 => 2,
            2 => 4,
            3 => 5,
            4 => 7,
            5 => 9,
            6 => 11,
            _ => return 0,
        };
        natural + accidental
    }
}

/// Read the song's chord change table and spread it over `len` steps
pub fn read_chord_track(reader: &BdxReader<'_>, len: usize) -> Result<Vec<ChordSymbol>> {
    let count = reader.u8_at(offset::CHORD_COUNT)? as usize;
    let mut timeline = SparseTimeline::new(len);
    for i in 0..count {
        let record = offset::CHORD_TABLE + i * offset::CHORD_STRIDE;
        let tick = reader.u16_le_at(record)?;
        let symbol = ChordSymbol::from_raw(reader.u16_le_at(record + 2)?);
        timeline.set(tick, symbol);
    }
    Ok(timeline
        .resolve()
        .into_iter()
        .map(|s| s.unwrap_or(ChordSymbol::UNSET))
        .collect())
}

/// Clamp a computed tone to a playable note (0 when out of range)
fn tone(note: i32) -> u8 {
    match u8::try_from(note) {
        Ok(n) if n < 0x80 => n,
        _ => 0,
    }
}

// Piano

/// Intervals of the three-voice form of each chord quality
fn triad(quality: u8) -> [i32; 3] {
    match quality {
        0 => [0, 4, 7],   // major
        1 => [0, 3, 7],   // minor
        2 => [0, 4, 10],  // 7
        3 => [0, 4, 11],  // maj7
        4 => [0, 3, 10],  // m7
        5 => [3, 6, 9],   // dim
        6 => [3, 6, 10],  // m7b5
        7 => [0, 4, 8],   // aug
        8 => [0, 5, 7],   // sus4
        9 => [0, 5, 10],  // 7sus4
        10 => [4, 7, 9],  // 6
        11 => [4, 7, 14], // add9
        _ => [0, 0, 0],
    }
}

/// Intervals of the four-voice form of the qualities that have one
fn tetrad(quality: u8) -> [i32; 4] {
    match quality {
        2 => [0, 4, 7, 10],
        3 => [0, 4, 7, 11],
        4 => [0, 3, 7, 10],
        5 => [0, 3, 6, 9],
        6 => [0, 3, 6, 10],
        9 => [0, 5, 7, 10],
        10 => [0, 4, 7, 9],
        11 => [0, 4, 7, 14],
        _ => [0, 0, 0, 0],
    }
}

/// Qualities whose fourth voice doubles a chord tone an octave down
fn doubles_fourth_voice(quality: u8) -> bool {
    matches!(quality, 0 | 1 | 7 | 8)
}

/// How far apart the voices of a piano chord are spread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spacing {
    Dense,
    Medium,
    Coarse,
}

/// Piano voicing settings shared by every piano part of a song
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PianoVoicing {
    /// Highest note any voice may take
    pub ceiling: u8,
    pub four_voices: bool,
    pub spacing: Spacing,
}

impl PianoVoicing {
    /// Decode from the ceiling byte and the mode byte (voices * 3 + spacing)
    pub fn from_bytes(ceiling: u8, mode: u8) -> Self {
        let spacing = match mode % 3 {
            0 => Spacing::Dense,
            1 => Spacing::Medium,
            _ => Spacing::Coarse,
        };
        Self {
            ceiling,
            four_voices: mode / 3 != 0,
            spacing,
        }
    }

    pub fn read(reader: &BdxReader<'_>) -> Result<Self> {
        Ok(Self::from_bytes(
            reader.u8_at(offset::VOICING_CEILING)?,
            reader.u8_at(offset::VOICING_MODE)?,
        ))
    }

    /// Octave-aligned starting point for chord tones
    fn base(&self) -> i32 {
        0x30 + 12 * (self.ceiling as i32 / 12 - 4)
    }

    /// Lower `note` by octaves until it is under the ceiling
    fn below_ceiling(&self, mut note: i32) -> i32 {
        while note > self.ceiling as i32 {
            note -= 12;
        }
        note
    }

    /// Voice a standard chord symbol
    pub fn voice(&self, symbol: ChordSymbol) -> Voicing {
        let root = symbol.root_pitch();
        let mut voicing = [0; STRING_COUNT];

        if !self.four_voices {
            let mut notes = triad(symbol.quality).map(|i| self.below_ceiling(self.base() + root + i));
            notes.sort_unstable();
            match self.spacing {
                Spacing::Dense => {}
                Spacing::Medium => notes[1] -= 12,
                Spacing::Coarse => {
                    notes[1] -= 24;
                    notes[0] -= 12;
                }
            }
            for (slot, note) in voicing.iter_mut().zip(notes) {
                *slot = tone(note);
            }
        } else if doubles_fourth_voice(symbol.quality) {
            // The added voice is an octave under the last tone that needed no lowering
            let mut added = 0;
            let mut notes = [0; 3];
            for (note, interval) in notes.iter_mut().zip(triad(symbol.quality)) {
                let placed = self.base() + root + interval;
                if placed > self.ceiling as i32 {
                    *note = self.below_ceiling(placed);
                } else {
                    *note = placed;
                    added = placed - 12;
                }
            }
            notes.sort_unstable();
            match self.spacing {
                Spacing::Dense => {}
                Spacing::Medium => notes[1] -= 12,
                Spacing::Coarse => {
                    notes[1] -= 12;
                    added -= 12;
                }
            }
            for (slot, note) in voicing.iter_mut().zip(notes) {
                *slot = tone(note);
            }
            voicing[4] = tone(added);
        } else {
            let mut notes = tetrad(symbol.quality).map(|i| self.below_ceiling(self.base() + root + i));
            notes.sort_unstable();
            match self.spacing {
                Spacing::Dense => {}
                Spacing::Medium => notes[2] -= 12,
                Spacing::Coarse => {
                    notes[2] -= 12;
                    notes[0] -= 12;
                }
            }
            for (slot, note) in voicing.iter_mut().zip(notes) {
                *slot = tone(note);
            }
        }

        voicing
    }
}

/// Voice a custom piano chord: four stored notes, highest byte first
pub fn piano_custom(reader: &BdxReader<'_>, index: usize) -> Result<Voicing> {
    let stored = reader.bytes_at(offset::PIANO_CUSTOM_CHORDS + index * 4, 4)?;
    let mut voicing = [0; STRING_COUNT];
    for (slot, &note) in voicing.iter_mut().zip(stored.iter().rev()) {
        *slot = tone(note as i32);
    }
    Ok(voicing)
}

// Guitar

/// Fret per string for each root pitch class and chord quality
const GUITAR_FRETS: [[[u8; STRING_COUNT]; 12]; 12] = [
    // C
    [
        [0, 1, 0, 2, 3, 0],
        [3, 4, 5, 5, 3, 3],
        [0, 1, 3, 2, 3, 0],
        [0, 0, 0, 2, 3, 0],
        [3, 4, 3, 5, 3, 3],
        [2, 1, 2, 1, 0, 0],
        [0, 4, 3, 4, 3, 0],
        [0, 1, 1, 2, 3, 0],
        [3, 6, 5, 5, 3, 3],
        [3, 6, 3, 5, 3, 3],
        [5, 5, 5, 5, 3, 0],
        [0, 3, 0, 2, 3, 0],
    ],
    // C#
    [
        [4, 6, 6, 6, 4, 4],
        [4, 5, 6, 6, 4, 4],
        [4, 6, 4, 6, 4, 4],
        [4, 6, 5, 6, 4, 4],
        [4, 5, 4, 6, 4, 4],
        [3, 2, 3, 2, 0, 0],
        [0, 5, 4, 5, 4, 0],
        [0, 2, 2, 3, 4, 0],
        [4, 7, 6, 6, 4, 4],
        [4, 7, 4, 6, 4, 4],
        [6, 6, 6, 6, 4, 0],
        [4, 4, 6, 6, 4, 4],
    ],
    // D
    [
        [2, 3, 2, 0, 0, 0],
        [1, 3, 2, 0, 0, 0],
        [2, 1, 2, 0, 0, 0],
        [2, 2, 2, 0, 0, 0],
        [1, 1, 2, 0, 0, 0],
        [1, 0, 1, 0, 0, 0],
        [1, 1, 1, 0, 0, 0],
        [2, 3, 3, 0, 0, 0],
        [3, 3, 2, 0, 0, 0],
        [3, 1, 2, 0, 0, 0],
        [2, 0, 2, 0, 0, 0],
        [0, 3, 2, 0, 0, 0],
    ],
    // D#
    [
        [6, 8, 8, 8, 6, 6],
        [6, 7, 8, 8, 6, 6],
        [6, 8, 6, 8, 6, 6],
        [6, 8, 7, 8, 6, 6],
        [6, 7, 6, 8, 6, 6],
        [2, 1, 2, 1, 0, 0],
        [2, 2, 2, 1, 0, 0],
        [0, 4, 4, 5, 6, 0],
        [6, 9, 8, 8, 6, 6],
        [6, 9, 6, 8, 6, 6],
        [8, 8, 8, 8, 6, 0],
        [6, 6, 8, 8, 6, 6],
    ],
    // E
    [
        [0, 0, 1, 2, 2, 0],
        [0, 0, 0, 2, 2, 0],
        [0, 0, 1, 0, 2, 0],
        [0, 0, 1, 1, 2, 0],
        [0, 0, 0, 0, 2, 0],
        [3, 2, 3, 2, 0, 0],
        [3, 3, 3, 2, 0, 0],
        [0, 1, 1, 2, 0, 0],
        [0, 0, 2, 2, 2, 0],
        [0, 0, 2, 0, 2, 0],
        [0, 2, 1, 2, 2, 0],
        [2, 0, 1, 2, 2, 0],
    ],
    // F
    [
        [1, 1, 2, 3, 3, 1],
        [1, 1, 1, 3, 3, 1],
        [1, 1, 2, 1, 3, 1],
        [0, 1, 2, 3, 0, 0],
        [1, 1, 1, 1, 3, 1],
        [1, 0, 1, 0, 0, 0],
        [4, 4, 4, 3, 0, 0],
        [1, 2, 2, 3, 0, 0],
        [1, 1, 3, 3, 3, 1],
        [1, 1, 3, 1, 3, 1],
        [0, 3, 2, 0, 3, 1],
        [3, 1, 2, 3, 0, 0],
    ],
    // F#
    [
        [2, 2, 3, 4, 4, 2],
        [2, 2, 2, 4, 4, 2],
        [2, 2, 3, 2, 4, 2],
        [0, 0, 0, 2, 3, 0],
        [2, 2, 2, 2, 4, 2],
        [2, 1, 2, 1, 0, 0],
        [0, 1, 2, 2, 0, 2],
        [2, 3, 3, 4, 0, 0],
        [2, 2, 4, 4, 4, 2],
        [2, 2, 4, 2, 4, 2],
        [0, 2, 3, 1, 0, 2],
        [4, 2, 3, 4, 0, 0],
    ],
    // G
    [
        [3, 0, 0, 0, 2, 3],
        [3, 3, 3, 5, 5, 3],
        [1, 0, 0, 0, 2, 3],
        [2, 0, 0, 0, 2, 3],
        [3, 3, 3, 3, 5, 3],
        [3, 2, 3, 2, 0, 0],
        [0, 2, 3, 3, 0, 3],
        [3, 4, 4, 5, 0, 0],
        [3, 3, 5, 5, 5, 3],
        [3, 3, 5, 3, 5, 3],
        [0, 0, 0, 0, 2, 3],
        [5, 3, 4, 5, 0, 0],
    ],
    // G#
    [
        [4, 4, 5, 6, 6, 4],
        [4, 4, 4, 6, 6, 4],
        [4, 4, 5, 4, 6, 4],
        [4, 4, 5, 5, 6, 4],
        [4, 4, 4, 4, 6, 4],
        [1, 0, 1, 0, 0, 0],
        [0, 3, 4, 4, 0, 4],
        [4, 5, 5, 6, 0, 0],
        [4, 4, 6, 6, 6, 4],
        [4, 4, 6, 4, 6, 4],
        [0, 4, 5, 3, 0, 4],
        [6, 4, 5, 6, 0, 0],
    ],
    // A
    [
        [0, 2, 2, 2, 0, 0],
        [0, 1, 2, 2, 0, 0],
        [0, 2, 0, 2, 0, 0],
        [0, 2, 1, 2, 0, 0],
        [0, 1, 0, 2, 0, 0],
        [2, 1, 2, 1, 0, 0],
        [0, 4, 5, 5, 0, 5],
        [1, 2, 2, 3, 0, 0],
        [0, 3, 2, 2, 0, 0],
        [0, 3, 0, 2, 0, 0],
        [2, 2, 2, 2, 0, 0],
        [0, 0, 2, 2, 0, 0],
    ],
    // A#
    [
        [1, 3, 3, 3, 1, 1],
        [1, 2, 3, 3, 1, 1],
        [1, 3, 1, 3, 1, 1],
        [1, 3, 2, 3, 1, 1],
        [1, 2, 1, 3, 1, 1],
        [3, 2, 3, 2, 0, 0],
        [0, 2, 1, 2, 1, 0],
        [2, 3, 3, 4, 0, 0],
        [1, 4, 3, 3, 1, 1],
        [1, 4, 1, 3, 1, 1],
        [3, 3, 3, 3, 1, 0],
        [1, 1, 3, 3, 1, 1],
    ],
    // B
    [
        [2, 4, 4, 4, 2, 2],
        [2, 3, 4, 4, 2, 2],
        [2, 0, 2, 1, 2, 0],
        [2, 4, 3, 4, 2, 2],
        [2, 3, 2, 4, 2, 2],
        [1, 0, 1, 0, 0, 0],
        [0, 3, 2, 3, 2, 0],
        [3, 4, 4, 5, 0, 0],
        [2, 5, 4, 4, 2, 2],
        [2, 5, 2, 4, 2, 2],
        [4, 4, 4, 4, 2, 0],
        [2, 2, 4, 4, 2, 2],
    ],
];

/// Strings left unplayed by the standard shape at `key` (root * 0x10 + quality)
fn guitar_mutes(key: i32) -> [bool; STRING_COUNT] {
    match key {
        0xBA | 0xB2 | 0xAA | 0x97 | 0x95 | 0x3A | 0x2B | 0x2A | 0x29 | 0x28 | 0x24 | 0x23 | 0x22 | 0x21 | 0x20 | 0x1A | 0x0A | 0x02 => [false, false, false, false, false, true],
        0xB7 | 0xB5 | 0xA7 | 0xA5 | 0x8B | 0x87 | 0x85 | 0x7B | 0x75 | 0x6B | 0x67 | 0x65 | 0x5B | 0x57 | 0x56 | 0x55 | 0x53 | 0x47 | 0x46 | 0x45 | 0x36 | 0x35 | 0x27 | 0x26 | 0x25 | 0x15 | 0x05 => [false, false, false, false, true, true],
        0xB6 | 0xA6 | 0x37 | 0x17 | 0x16 | 0x07 | 0x06 => [true, false, false, false, false, true],
        0x5A => [true, false, false, false, false, false],
        0x66 => [false, false, false, false, true, false],
        0x96 | 0x8A | 0x86 | 0x76 | 0x6A => [true, false, false, false, true, false],
        _ => [false; STRING_COUNT],
    }
}

/// Fret positions of the standard shape at `key`
fn guitar_frets(key: i32) -> [u8; STRING_COUNT] {
    let (root, quality) = (key >> 4, key & 0x0F);
    if (0..12).contains(&root) && quality < 12 {
        GUITAR_FRETS[root as usize][quality as usize]
    } else {
        [0; STRING_COUNT]
    }
}

/// A six-string fret/mute shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuitarShape {
    pub frets: [u8; STRING_COUNT],
    pub mutes: [bool; STRING_COUNT],
}

/// Custom shapes, one per custom chord slot
pub type CustomShapes = [GuitarShape; CUSTOM_CHORD_COUNT];

impl GuitarShape {
    /// Shape for a standard chord symbol
    pub fn standard(symbol: ChordSymbol) -> Self {
        let key = symbol.root_pitch() * 0x10 + symbol.quality as i32;
        Self {
            frets: guitar_frets(key),
            mutes: guitar_mutes(key),
        }
    }

    /// Unpack five bits per string: fret in bits 0-3, mute in bit 4
    pub fn unpack(word: u32) -> Self {
        let mut shape = Self::default();
        for string in 0..STRING_COUNT {
            let bits = word >> (string * 5);
            shape.frets[string] = (bits & 0x0F) as u8;
            shape.mutes[string] = (bits >> 4) & 1 != 0;
        }
        shape
    }

    /// Notes sounded by this shape
    pub fn voicing(&self) -> Voicing {
        let mut voicing = [0; STRING_COUNT];
        for string in 0..STRING_COUNT {
            if !self.mutes[string] {
                voicing[string] = tone((OPEN_STRINGS[string] + self.frets[string]) as i32);
            }
        }
        voicing
    }
}

/// Read the song's custom guitar shapes
pub fn read_custom_shapes(reader: &BdxReader<'_>) -> Result<CustomShapes> {
    let mut shapes = CustomShapes::default();
    for (i, shape) in shapes.iter_mut().enumerate() {
        *shape = GuitarShape::unpack(reader.u32_le_at(offset::GUITAR_CUSTOM_CHORDS + i * 4)?);
    }
    Ok(shapes)
}
