use crate::config::WatermarkConfig;
use crate::error::{Error, Result};
use crate::extract::extract_mark;
use crate::fft::Fft2d;
use crate::field::{self, Field};
use crate::message;
use crate::prime;
use crate::sequence;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Peak location and confidence statistic of a correlation surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PeakStats {
    pub peak: f64,
    pub peak_row: usize,
    pub peak_col: usize,
    pub rms: f64,
    pub peak_to_rms: f64,
}

/// Result of testing one pattern family against the extracted mark.
/// Appended to the report once produced, never mutated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DetectionRecord {
    /// Family index `k` that was tested.
    pub family: usize,
    /// Shift encoded by the peak location, `peak_row * p + peak_col`.
    pub shift: usize,
    pub peak: f64,
    pub peak_row: usize,
    pub peak_col: usize,
    pub rms: f64,
    pub peak_to_rms: f64,
}

/// Aggregate statistics over a correlation surface.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub stdev: f64,
}

/// Full outcome of a detection run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct DetectionReport {
    /// Decoded text, or the [`message::NO_MESSAGE`] sentinel when no
    /// family passed the threshold.
    pub message: String,
    /// Pattern side length used for this image pair.
    pub prime: usize,
    /// Families tested, including the final rejected one.
    pub families_tested: usize,
    /// Per-family records for the accepted families, in order.
    pub accepted: Vec<DetectionRecord>,
    /// Minimum peak-to-RMS ratio among accepted families.
    pub confidence: Option<f64>,
    /// Statistics of the last correlation surface (the rejected one).
    pub last_field: FieldStats,
}

/// Cross-correlate the extracted mark against a candidate pattern.
///
/// Computed in the frequency domain: multiply the spectrum of
/// `extracted` by the conjugated spectrum of `candidate` and
/// inverse-transform the product. Equivalent to direct spatial cyclic
/// correlation, at `O(p^2 log p)` instead of `O(p^4)`. A pattern
/// embedded with shift `s` produces a surface whose maximum sits at
/// `(s / p, s % p)`.
pub fn correlate(extracted: &Field, candidate: &Field) -> Result<Field> {
    if extracted.rows() != candidate.rows() || extracted.cols() != candidate.cols() {
        return Err(Error::FieldSize {
            rows: extracted.rows(),
            cols: extracted.cols(),
            got: candidate.len(),
        });
    }
    let fft = Fft2d::new(extracted.rows(), extracted.cols());
    let a = fft.forward(extracted)?;
    let b = fft.forward(candidate)?;
    let product: Vec<_> = a.iter().zip(b.iter()).map(|(x, y)| x * y.conj()).collect();
    Ok(fft.inverse_real(product))
}

/// Locate the maximum of a correlation surface and compute its
/// peak-to-RMS ratio.
///
/// Row-major scan with a strictly-greater comparison: the first
/// occurrence of the maximum wins and later equal values never replace
/// it. A flat zero surface reports a ratio of 0 rather than NaN.
pub fn peak_and_statistic(surface: &Field) -> PeakStats {
    let cols = surface.cols();
    let values = surface.as_slice();

    let mut peak = values[0];
    let mut peak_index = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > peak {
            peak = v;
            peak_index = i;
        }
    }

    let mean_square: f64 = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
    let rms = mean_square.sqrt();
    let peak_to_rms = if rms > f64::EPSILON { peak / rms } else { 0.0 };

    PeakStats {
        peak,
        peak_row: peak_index / cols,
        peak_col: peak_index % cols,
        rms,
        peak_to_rms,
    }
}

/// One transition of the detection state machine.
#[derive(Debug, Clone)]
pub enum Transition {
    /// The family passed the threshold; keep its record and test the
    /// next family.
    Continue(DetectionRecord),
    /// The family failed the threshold; detection ends and this record
    /// is excluded from the decoded message.
    Stop(DetectionRecord),
}

/// Test a single family `k` against the extracted mark.
///
/// This is the pure loop body of the detection state machine: it
/// either continues to family `k + 1` or stops the run. The
/// correlation surface is returned alongside so the caller can report
/// aggregate statistics of the surface that ended the run.
pub fn step(
    extracted: &Field,
    family: usize,
    config: &WatermarkConfig,
) -> Result<(Transition, Field)> {
    let p = extracted.rows();
    let candidate = sequence::generate(p, family);
    let surface = correlate(extracted, &candidate)?;
    let stats = peak_and_statistic(&surface);
    let record = DetectionRecord {
        family,
        shift: stats.peak_row * p + stats.peak_col,
        peak: stats.peak,
        peak_row: stats.peak_row,
        peak_col: stats.peak_col,
        rms: stats.rms,
        peak_to_rms: stats.peak_to_rms,
    };
    let transition = if stats.peak_to_rms > config.threshold {
        Transition::Continue(record)
    } else {
        Transition::Stop(record)
    };
    Ok((transition, surface))
}

/// Aggregate statistics of a correlation surface.
pub fn field_stats(surface: &Field) -> FieldStats {
    let values = surface.as_slice();
    let n = values.len() as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    FieldStats {
        min,
        max,
        mean,
        stdev: variance.sqrt(),
    }
}

/// Detect a message from an (original, marked) luma pair.
///
/// Families are tested in increasing `k` starting at 1. Each family
/// whose correlation peak-to-RMS exceeds the threshold contributes one
/// shift to the decoded message; the first family at or below the
/// threshold ends the run and is discarded. There is no upper bound on
/// `k` other than this stopping rule, so an untouched image pair and a
/// fully decoded message both terminate through the same transition.
pub fn detect_message(
    original: &Field,
    marked: &Field,
    config: &WatermarkConfig,
) -> Result<DetectionReport> {
    if original.rows() != marked.rows() || original.cols() != marked.cols() {
        return Err(Error::DimensionMismatch {
            original_rows: original.rows(),
            original_cols: original.cols(),
            marked_rows: marked.rows(),
            marked_cols: marked.cols(),
        });
    }

    let p = prime::pattern_size(original.rows(), original.cols())?;
    let diff = field::difference(marked, original)?;
    let extracted = extract_mark(&diff, p, config)?;

    let mut accepted = Vec::new();
    let mut family = 1;
    let last_field = loop {
        let (transition, surface) = step(&extracted, family, config)?;
        match transition {
            Transition::Continue(record) => {
                accepted.push(record);
                family += 1;
            }
            Transition::Stop(_) => break field_stats(&surface),
        }
    };

    let shifts: Vec<usize> = accepted.iter().map(|r| r.shift).collect();
    let text = message::decode(&shifts, p * p)?;
    let confidence = accepted
        .iter()
        .map(|r| r.peak_to_rms)
        .fold(None, |acc: Option<f64>, v| {
            Some(acc.map_or(v, |a| a.min(v)))
        });

    Ok(DetectionReport {
        message: text,
        prime: p,
        families_tested: family,
        accepted,
        confidence,
        last_field,
    })
}
