use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::fft::SpectralTransform;
use crate::field::Field;

/// Recover the residual pattern from a luma difference field.
///
/// Forward-transforms `diff` (marked minus original, values in
/// `[-1, 1]`) and copies out the `p`-by-`p` coefficient block at offset
/// `(border, border)` — the exact region [`crate::embed::insert_mark`]
/// wrote into. The block stays in coefficient form; the detector
/// correlates it directly, so no inverse transform is applied.
pub fn extract_mark(diff: &Field, p: usize, config: &WatermarkConfig) -> Result<Field> {
    if p + config.border > diff.rows() || p + config.border > diff.cols() {
        return Err(Error::PatternTooLarge {
            p,
            border: config.border,
            rows: diff.rows(),
            cols: diff.cols(),
        });
    }

    let transform = SpectralTransform::new(diff.rows(), diff.cols());
    let spectrum = transform.forward(diff)?;
    let mut mark = Field::new(p, p);
    for i in 0..p {
        for j in 0..p {
            mark.set(i, j, spectrum.get(i + config.border, j + config.border));
        }
    }
    Ok(mark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::insert_mark;
    use crate::field;
    use crate::sequence;

    #[test]
    fn extract_recovers_inserted_pattern() {
        let config = WatermarkConfig::default();
        let p = 31;
        let original = Field::from_vec(
            33,
            33,
            (0..33 * 33).map(|i| 0.5 + 0.3 * (i as f64 * 0.7).sin()).collect(),
        )
        .unwrap();
        let mut marked = original.clone();
        let mut pattern = sequence::generate(p, 1);
        pattern.scale(1.5);

        let shift = 4 * p + 9;
        insert_mark(&mut marked, &pattern, shift, &config).unwrap();

        let diff = field::difference(&marked, &original).unwrap();
        let extracted = extract_mark(&diff, p, &config).unwrap();

        let expected = pattern.cyclic_shifted(shift);
        for (a, b) in extracted.as_slice().iter().zip(expected.as_slice()) {
            assert!((a - b).abs() < 1e-6, "extracted {a}, inserted {b}");
        }
    }

    #[test]
    fn block_larger_than_field_rejected() {
        let config = WatermarkConfig::default();
        let diff = Field::new(16, 16);
        assert!(matches!(
            extract_mark(&diff, 31, &config),
            Err(Error::PatternTooLarge { .. })
        ));
    }
}
