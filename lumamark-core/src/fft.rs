use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{Error, Result};
use crate::field::Field;

/// Real-valued 2D spectral transform pair for a fixed field size.
///
/// The forward pass maps a real field onto an equally-sized real
/// spectrum (the separable Hartley transform, computed by running the
/// cas kernel over rows and then columns); the inverse pass is the same
/// kernel scaled by `1 / (rows * cols)`, so `inverse(forward(x)) == x`
/// up to floating-point tolerance. The DC term sits at `(0, 0)`.
///
/// No padding is applied in either direction. The embed/extract offset
/// arithmetic assumes the spectrum geometry matches the field exactly.
pub struct SpectralTransform {
    rows: usize,
    cols: usize,
    row_fft: Arc<dyn Fft<f64>>,
    col_fft: Arc<dyn Fft<f64>>,
}

impl SpectralTransform {
    /// Create a transform for fields of the given size.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let row_fft = planner.plan_fft_forward(cols);
        let col_fft = planner.plan_fft_forward(rows);
        Self {
            rows,
            cols,
            row_fft,
            col_fft,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Forward transform: spatial field -> real spectrum.
    pub fn forward(&self, field: &Field) -> Result<Field> {
        self.cas_2d(field)
    }

    /// Inverse transform: real spectrum -> spatial field.
    pub fn inverse(&self, spectrum: &Field) -> Result<Field> {
        let mut out = self.cas_2d(spectrum)?;
        out.scale(1.0 / (self.rows * self.cols) as f64);
        Ok(out)
    }

    /// Apply the cas kernel along rows, then along columns.
    ///
    /// One pass of a complex FFT gives the 1D kernel for free:
    /// `cas(x)[k] = Re(X[k]) - Im(X[k])`.
    fn cas_2d(&self, field: &Field) -> Result<Field> {
        if field.rows() != self.rows || field.cols() != self.cols {
            return Err(Error::FieldSize {
                rows: self.rows,
                cols: self.cols,
                got: field.len(),
            });
        }

        let mut out = Field::new(self.rows, self.cols);
        let mut row_buf = vec![Complex::new(0.0, 0.0); self.cols];
        for r in 0..self.rows {
            for c in 0..self.cols {
                row_buf[c] = Complex::new(field.get(r, c), 0.0);
            }
            self.row_fft.process(&mut row_buf);
            for c in 0..self.cols {
                out.set(r, c, row_buf[c].re - row_buf[c].im);
            }
        }

        let mut col_buf = vec![Complex::new(0.0, 0.0); self.rows];
        for c in 0..self.cols {
            for r in 0..self.rows {
                col_buf[r] = Complex::new(out.get(r, c), 0.0);
            }
            self.col_fft.process(&mut col_buf);
            for r in 0..self.rows {
                out.set(r, c, col_buf[r].re - col_buf[r].im);
            }
        }

        Ok(out)
    }
}

/// Complex 2D FFT pair used for frequency-domain cross-correlation.
pub struct Fft2d {
    rows: usize,
    cols: usize,
    row_fwd: Arc<dyn Fft<f64>>,
    row_inv: Arc<dyn Fft<f64>>,
    col_fwd: Arc<dyn Fft<f64>>,
    col_inv: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let row_fwd = planner.plan_fft_forward(cols);
        let row_inv = planner.plan_fft_inverse(cols);
        let col_fwd = planner.plan_fft_forward(rows);
        let col_inv = planner.plan_fft_inverse(rows);
        Self {
            rows,
            cols,
            row_fwd,
            row_inv,
            col_fwd,
            col_inv,
        }
    }

    /// Forward 2D FFT of a real field, row-major complex output.
    pub fn forward(&self, field: &Field) -> Result<Vec<Complex<f64>>> {
        if field.rows() != self.rows || field.cols() != self.cols {
            return Err(Error::FieldSize {
                rows: self.rows,
                cols: self.cols,
                got: field.len(),
            });
        }
        let mut spectrum: Vec<Complex<f64>> = field
            .as_slice()
            .iter()
            .map(|&v| Complex::new(v, 0.0))
            .collect();
        for r in 0..self.rows {
            self.row_fwd
                .process(&mut spectrum[r * self.cols..(r + 1) * self.cols]);
        }
        let mut col_buf = vec![Complex::new(0.0, 0.0); self.rows];
        for c in 0..self.cols {
            for r in 0..self.rows {
                col_buf[r] = spectrum[r * self.cols + c];
            }
            self.col_fwd.process(&mut col_buf);
            for r in 0..self.rows {
                spectrum[r * self.cols + c] = col_buf[r];
            }
        }
        Ok(spectrum)
    }

    /// Inverse 2D FFT, keeping the real part and applying the
    /// `1 / (rows * cols)` scale rustfft leaves to the caller.
    pub fn inverse_real(&self, mut spectrum: Vec<Complex<f64>>) -> Field {
        debug_assert_eq!(spectrum.len(), self.rows * self.cols);
        for r in 0..self.rows {
            self.row_inv
                .process(&mut spectrum[r * self.cols..(r + 1) * self.cols]);
        }
        let mut col_buf = vec![Complex::new(0.0, 0.0); self.rows];
        for c in 0..self.cols {
            for r in 0..self.rows {
                col_buf[r] = spectrum[r * self.cols + c];
            }
            self.col_inv.process(&mut col_buf);
            for r in 0..self.rows {
                spectrum[r * self.cols + c] = col_buf[r];
            }
        }
        let scale = 1.0 / (self.rows * self.cols) as f64;
        let mut out = Field::new(self.rows, self.cols);
        for (cell, value) in out.as_mut_slice().iter_mut().zip(spectrum.iter()) {
            *cell = value.re * scale;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field(rows: usize, cols: usize) -> Field {
        let data = (0..rows * cols)
            .map(|i| {
                let t = i as f64;
                (t * 0.37).sin() + 0.25 * (t * 1.91).cos() + 0.1 * t / (rows * cols) as f64
            })
            .collect();
        Field::from_vec(rows, cols, data).unwrap()
    }

    #[test]
    fn round_trip_square() {
        let transform = SpectralTransform::new(31, 31);
        let field = sample_field(31, 31);
        let back = transform.inverse(&transform.forward(&field).unwrap()).unwrap();
        for (a, b) in field.as_slice().iter().zip(back.as_slice()) {
            assert!((a - b).abs() < 1e-9, "round-trip error: {a} vs {b}");
        }
    }

    #[test]
    fn round_trip_rectangular() {
        let transform = SpectralTransform::new(17, 40);
        let field = sample_field(17, 40);
        let back = transform.inverse(&transform.forward(&field).unwrap()).unwrap();
        for (a, b) in field.as_slice().iter().zip(back.as_slice()) {
            assert!((a - b).abs() < 1e-9, "round-trip error: {a} vs {b}");
        }
    }

    #[test]
    fn forward_is_linear() {
        let transform = SpectralTransform::new(9, 13);
        let a = sample_field(9, 13);
        let mut b = sample_field(9, 13);
        b.scale(-2.5);
        let sum = crate::field::difference(&a, &b).unwrap();
        let fa = transform.forward(&a).unwrap();
        let fb = transform.forward(&b).unwrap();
        let fsum = transform.forward(&sum).unwrap();
        for i in 0..sum.len() {
            let expected = fa.as_slice()[i] - fb.as_slice()[i];
            assert!((fsum.as_slice()[i] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn dc_term_is_plain_sum() {
        let transform = SpectralTransform::new(5, 7);
        let field = Field::from_vec(5, 7, vec![0.3; 35]).unwrap();
        let spectrum = transform.forward(&field).unwrap();
        assert!((spectrum.get(0, 0) - 0.3 * 35.0).abs() < 1e-9);
    }

    #[test]
    fn wrong_size_rejected() {
        let transform = SpectralTransform::new(8, 8);
        let field = Field::new(8, 9);
        assert!(transform.forward(&field).is_err());
    }

    #[test]
    fn fft2d_round_trip() {
        let fft = Fft2d::new(11, 23);
        let field = sample_field(11, 23);
        let back = fft.inverse_real(fft.forward(&field).unwrap());
        for (a, b) in field.as_slice().iter().zip(back.as_slice()) {
            assert!((a - b).abs() < 1e-9, "fft2d round-trip error: {a} vs {b}");
        }
    }
}
