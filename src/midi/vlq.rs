//! MIDI variable-length quantity (delta time) encoding

use crate::error::{Error, Result};

/// Largest value a 4-byte VLQ can hold
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Encode `value` as a big-endian VLQ, continuation bit on all but the last byte
pub fn encode(value: u32) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(4);
    write(&mut bytes, value)?;
    Ok(bytes)
}

/// Append the VLQ encoding of `value` to `out`
pub fn write(out: &mut Vec<u8>, value: u32) -> Result<()> {
    let len = match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=VLQ_MAX => 4,
        _ => return Err(Error::DeltaOverflow { value: value as i64 }),
    };
    for shift in (1..len).rev() {
        out.push(((value >> (7 * shift)) & 0x7F) as u8 | 0x80);
    }
    out.push((value & 0x7F) as u8);
    Ok(())
}
