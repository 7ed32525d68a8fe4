//! Instrument byte to General MIDI program mapping

/// Program used for unmapped instruments (Acoustic Grand Piano)
pub const DEFAULT_PROGRAM: u8 = 0x00;

/// Fold the alternate instrument ranges onto the base codes
pub fn normalize(raw: u8) -> u8 {
    match raw {
        0x31..=0x59 => raw - 0x30,
        0x5A..=0x82 => raw - 0x59,
        0x8D..=0x96 => raw - 0x0A,
        0x97..=0xA0 => raw - 0x14,
        _ => raw,
    }
}

/// General MIDI program for a normalized instrument code
pub fn gm_program(code: u8) -> Option<u8> {
    let program = match code {
        0x01 => 0x00, // Piano
        0x02 => 0x05, // Electric Piano
        0x03 => 0x11, // Rock Organ
        0x04 => 0x51, // Synth Lead
        0x05 => 0x0C, // Synth Bell
        0x06 => 0x13, // Pipe Organ
        0x07 => 0x19, // Folk Guitar
        0x08 => 0x1A, // E. Guitar
        0x09 => 0x1E, // D. Guitar
        0x0A => 0x1E, // Rock Guitar
        0x0B => 0x22, // Pick Bass
        0x0C => 0x26, // Synth Bass
        0x0D => 0x20, // Acoustic Bass
        0x0E => 0x2C, // Strings
        0x0F => 0x28, // Violin
        0x10 => 0x2B, // Double Bass
        0x11 => 0x2E, // Harp
        0x12 => 0x2D, // Pizzicato
        0x13 => 0x48, // Piccolo
        0x14 => 0x49, // Flute
        0x15 => 0x47, // Clarinet
        0x16 => 0x44, // Oboe
        0x17 => 0x40, // Soprano Sax
        0x18 => 0x41, // Alto Sax
        0x19 => 0x3D, // Brass
        0x1A => 0x38, // Trumpet
        0x1B => 0x39, // Trombone
        0x1C => 0x3C, // Horn
        0x1D => 0x3A, // Tuba
        0x1E => 0x16, // Harmonica
        0x1F => 0x4B, // Pan Flute
        0x20 => 0x4F, // Ocarina
        0x21 => 0x0B, // Vibraphone
        0x22 => 0x0D, // Marimba
        0x23 => 0x2F, // Timpani
        0x24 => 0x72, // Steel Drum
        0x25 => 0x34, // Chorus
        0x26 => 0x6A, // Shamisen
        0x27 => 0x6B, // Koto
        0x28 => 0x4D, // Shakuhachi
        0x29 => 0x50, // Famicom
        0x83 => 0x06, // Harpsichord
        0x84 => 0x15, // Accordion
        0x85 => 0x3B, // Mt. Trumpet
        0x86 => 0x0A, // Music Box
        0x87 => 0x69, // Banjo
        0x88 => 0x50, // Square Lead
        0x89 => 0x18, // Classical Guitar
        0x8A => 0x1B, // Clean Guitar
        0x8B => 0x1D, // Overdrive Guitar
        0x8C => 0x24, // Slap Bass
        _ => return None,
    };
    Some(program)
}

/// Program change value for a raw instrument byte
pub fn program_for(raw: u8) -> u8 {
    gm_program(normalize(raw)).unwrap_or(DEFAULT_PROGRAM)
}
