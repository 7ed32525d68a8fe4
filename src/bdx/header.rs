//! BDX layout definitions and header validation

/// Signature stored at [`offset::MAGIC`]
pub const BDX_MAGIC: &[u8; 12] = b"BBDX12343000";

/// Number of part slots in a song
pub const PART_COUNT: usize = 8;

/// Step slots per part
pub const STEP_COUNT: usize = 0x800;

/// Entries in each custom chord table
pub const CUSTOM_CHORD_COUNT: usize = 16;

/// Sentinel tick terminating the tempo and volume tables
pub const TABLE_END: u16 = 0xFFFF;

/// BDX layout offsets (in bytes)
pub mod offset {
    /// "BBDX12343000" signature
    pub const MAGIC: usize = 0x04;
    /// Title lines, 32 ASCII bytes each
    pub const TITLE_LINES: [usize; 3] = [0x48, 0x68, 0x88];
    /// Length of one title line
    pub const TITLE_LEN: usize = 32;
    /// Beats per bar
    pub const BEATS: usize = 0xAA;
    /// Number of bars
    pub const BARS: usize = 0xAD;
    /// First per-part record
    pub const PART_BASE: usize = 0xC8;
    /// Stride between per-part records
    pub const PART_STRIDE: usize = 0x10;
    /// Base volume within a part record
    pub const PART_VOLUME: usize = 0x00;
    /// Instrument byte within a part record
    pub const PART_INSTRUMENT: usize = 0x02;
    /// Part type byte within a part record
    pub const PART_TYPE: usize = 0x03;
    /// First step array
    pub const STEPS: usize = 0x248;
    /// Tempo change table (tick u16, bpm u16)
    pub const TEMPO_TABLE: usize = 0x4248;
    /// Tempo record size
    pub const TEMPO_STRIDE: usize = 4;
    /// First per-part volume table (tick u16, _, volume u8, ...)
    pub const VOLUME_TABLE: usize = 0x42C8;
    /// Stride between per-part volume tables
    pub const VOLUME_TABLE_STRIDE: usize = 0x100;
    /// Volume record size
    pub const VOLUME_STRIDE: usize = 8;
    /// Volume value within a volume record
    pub const VOLUME_VALUE: usize = 4;
    /// Guitar custom chord shapes (u32 each)
    pub const GUITAR_CUSTOM_CHORDS: usize = 0x4AC8;
    /// Piano custom chord notes (4 bytes each, read from the last byte down)
    pub const PIANO_CUSTOM_CHORDS: usize = 0x6648;
    /// Number of chord change records
    pub const CHORD_COUNT: usize = 0x6918;
    /// Chord change table (tick u16, symbol u16)
    pub const CHORD_TABLE: usize = 0x691C;
    /// Chord record size
    pub const CHORD_STRIDE: usize = 4;
    /// Highest note allowed in piano voicings
    pub const VOICING_CEILING: usize = 0x7F18;
    /// Piano voicing mode (voice count * 3 + spacing)
    pub const VOICING_MODE: usize = 0x7F19;

    /// Offset of the record for `part`
    pub fn part(part: usize) -> usize {
        PART_BASE + part * PART_STRIDE
    }

    /// Offset of the step array for `part`
    pub fn steps(part: usize) -> usize {
        STEPS + part * super::STEP_COUNT
    }

    /// Offset of the volume table for `part`
    pub fn volume_table(part: usize) -> usize {
        VOLUME_TABLE + part * VOLUME_TABLE_STRIDE
    }
}

/// Check the 12-byte signature
pub fn is_valid(data: &[u8]) -> bool {
    data.get(offset::MAGIC..offset::MAGIC + BDX_MAGIC.len()) == Some(&BDX_MAGIC[..])
}
