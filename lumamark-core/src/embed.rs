use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::fft::SpectralTransform;
use crate::field::Field;
use crate::message;
use crate::prime;
use crate::sequence;

/// Summary returned by [`embed_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSummary {
    /// Pattern side length chosen for the image.
    pub prime: usize,
    /// Number of characters (one pattern family each) embedded.
    pub characters: usize,
}

fn check_fit(luma: &Field, p: usize, border: usize) -> Result<()> {
    if p + border > luma.rows() || p + border > luma.cols() {
        return Err(Error::PatternTooLarge {
            p,
            border,
            rows: luma.rows(),
            cols: luma.cols(),
        });
    }
    Ok(())
}

/// Add one watermark pattern into the spectrum of a luma field.
///
/// The field is forward-transformed, the (cyclically shifted) pattern
/// is added at coefficient offset `(border, border)`, and the result is
/// inverse-transformed back in place. Row 0 and column 0 of the
/// spectrum stay untouched; they hold the DC terms, and energy there
/// shows up as a visible brightness shift.
///
/// The shift is applied to a scratch copy, so the caller's pattern is
/// never modified. No amplitude scaling happens here; callers scale
/// the pattern by their strength factor first.
pub fn insert_mark(
    luma: &mut Field,
    pattern: &Field,
    shift: usize,
    config: &WatermarkConfig,
) -> Result<()> {
    if pattern.rows() != pattern.cols() {
        return Err(Error::FieldSize {
            rows: pattern.rows(),
            cols: pattern.rows(),
            got: pattern.len(),
        });
    }
    let p = pattern.rows();
    check_fit(luma, p, config.border)?;
    if shift >= p * p {
        return Err(Error::ShiftOutOfRange {
            shift,
            array_size: p * p,
        });
    }

    let transform = SpectralTransform::new(luma.rows(), luma.cols());
    let mut spectrum = transform.forward(luma)?;
    add_pattern(&mut spectrum, &pattern.cyclic_shifted(shift), config.border);
    *luma = transform.inverse(&spectrum)?;
    Ok(())
}

/// Embed a whole message into a luma field.
///
/// One pattern family per character: character `i` uses family
/// `k = i + 1` with the character's encoded shift, scaled by
/// `strength`. The families accumulate additively in the same spectrum
/// region and stay separable at detection time thanks to their mutual
/// near-orthogonality. A single forward/inverse transform pair covers
/// all characters.
pub fn embed_message(
    luma: &mut Field,
    text: &str,
    strength: f64,
    config: &WatermarkConfig,
) -> Result<EmbedSummary> {
    let p = prime::pattern_size(luma.rows(), luma.cols())?;
    check_fit(luma, p, config.border)?;
    let shifts = message::encode(text, p * p)?;

    let transform = SpectralTransform::new(luma.rows(), luma.cols());
    let mut spectrum = transform.forward(luma)?;
    for (index, &shift) in shifts.iter().enumerate() {
        let mut pattern = sequence::generate(p, index + 1);
        pattern.scale(strength);
        add_pattern(&mut spectrum, &pattern.cyclic_shifted(shift), config.border);
    }
    *luma = transform.inverse(&spectrum)?;

    Ok(EmbedSummary {
        prime: p,
        characters: shifts.len(),
    })
}

fn add_pattern(spectrum: &mut Field, pattern: &Field, border: usize) {
    for i in 0..pattern.rows() {
        for j in 0..pattern.cols() {
            let r = i + border;
            let c = j + border;
            spectrum.set(r, c, spectrum.get(r, c) + pattern.get(i, j));
        }
    }
}
