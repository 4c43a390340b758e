use crate::error::{Error, Result};

/// User-facing text returned when a detection run accepts no families.
/// Only an empty shift list decodes to this; it is never the inverse
/// image of an encoded message.
pub const NO_MESSAGE: &str = "No message found.";

/// Number of distinct code points the shift encoding must represent.
pub const ALPHABET_SPAN: usize = 128;

fn shift_step(array_size: usize) -> Result<usize> {
    let step = array_size / ALPHABET_SPAN;
    if step == 0 {
        return Err(Error::AlphabetOverflow {
            array_size,
            min: ALPHABET_SPAN,
        });
    }
    Ok(step)
}

/// Map a message to one cyclic shift per character.
///
/// Each code point is spread across the `array_size = p * p` shift
/// range at a stride of `array_size / 128`, so neighbouring characters
/// land many cells apart and a correlation peak displaced by a cell or
/// two still decodes to the right character. Injective over ASCII.
pub fn encode(message: &str, array_size: usize) -> Result<Vec<usize>> {
    let step = shift_step(array_size)?;
    message
        .chars()
        .map(|ch| {
            if !ch.is_ascii() {
                return Err(Error::CharOutOfRange { ch });
            }
            Ok(ch as usize * step)
        })
        .collect()
}

/// Map detected shifts back to text.
///
/// Inverse of [`encode`], rounding each shift to the nearest stride
/// multiple. An empty shift list yields the [`NO_MESSAGE`] sentinel.
pub fn decode(shifts: &[usize], array_size: usize) -> Result<String> {
    if shifts.is_empty() {
        return Ok(NO_MESSAGE.to_string());
    }
    let step = shift_step(array_size)?;
    shifts
        .iter()
        .map(|&shift| {
            if shift >= array_size {
                return Err(Error::ShiftOutOfRange { shift, array_size });
            }
            let code = ((shift + step / 2) / step).min(ALPHABET_SPAN - 1) as u32;
            Ok(char::from_u32(code).expect("ASCII range"))
        })
        .collect()
}
