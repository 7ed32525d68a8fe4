//! Drum kits and pad-to-note mapping

/// Logical pads, in nibble order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumPad {
    None,
    B,
    A,
    Y,
    X,
    Up,
    Down,
    Left,
    Right,
    L,
    R,
}

impl DrumPad {
    pub const ALL: [DrumPad; 11] = [
        Self::None,
        Self::B,
        Self::A,
        Self::Y,
        Self::X,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::L,
        Self::R,
    ];

    /// Pad stored in a step nibble; nibbles above 10 name no pad
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        Self::ALL.get(nibble as usize).copied()
    }
}

/// Percussion kits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumKit {
    Rock,
    Electric,
    Synth,
    Gakudan,
    Bongo,
    Conga,
    Daiko,
}

/// Percussion notes per kit, indexed by pad
const KIT_NOTES: [[u8; 11]; 7] = [
    // None  B     A     Y     X     Up    Down  Left  Right L     R
    [0x00, 0x23, 0x26, 0x25, 0x36, 0x2A, 0x2F, 0x2D, 0x30, 0x2E, 0x31],
    [0x00, 0x23, 0x28, 0x33, 0x36, 0x2A, 0x2F, 0x2D, 0x30, 0x2E, 0x31],
    [0x00, 0x20, 0x28, 0x1E, 0x36, 0x46, 0x2F, 0x2D, 0x30, 0x2E, 0x31],
    [0x00, 0x23, 0x26, 0x51, 0x26, 0x34, 0x36, 0x26, 0x36, 0x37, 0x31],
    [0x00, 0x3D, 0x3C, 0x5C, 0x5D, 0x36, 0x57, 0x27, 0x45, 0x42, 0x41],
    [0x00, 0x40, 0x3F, 0x3E, 0x3A, 0x53, 0x52, 0x55, 0x38, 0x4D, 0x4C],
    [0x00, 0x36, 0x26, 0x3D, 0x39, 0x4B, 0x40, 0x43, 0x2D, 0x2E, 0x34],
];

impl DrumKit {
    pub const ALL: [DrumKit; 7] = [
        Self::Rock,
        Self::Electric,
        Self::Synth,
        Self::Gakudan,
        Self::Bongo,
        Self::Conga,
        Self::Daiko,
    ];

    /// Kit selected by a drum part's instrument byte (Rock Drum when unknown)
    pub fn from_instrument(raw: u8) -> Self {
        match raw {
            0x2B => Self::Electric,
            0x2C => Self::Synth,
            0x2D => Self::Gakudan,
            0x2E => Self::Bongo,
            0x2F => Self::Conga,
            0x30 => Self::Daiko,
            _ => Self::Rock,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rock => "Rock Drum",
            Self::Electric => "E. Drum",
            Self::Synth => "Synth Drum",
            Self::Gakudan => "Gakudan Set",
            Self::Bongo => "Bongo Set",
            Self::Conga => "Conga Set",
            Self::Daiko => "Daiko Set",
        }
    }

    /// Percussion note for `pad` (0 for silence)
    pub fn note(&self, pad: DrumPad) -> u8 {
        KIT_NOTES[*self as usize][pad as usize]
    }

    /// Note for a raw step nibble
    pub fn note_for_nibble(&self, nibble: u8) -> u8 {
        DrumPad::from_nibble(nibble).map_or(0, |pad| self.note(pad))
    }
}
