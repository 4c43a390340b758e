use crate::error::{Error, Result};

/// An owned row-major 2D array of `f64` values.
///
/// Luma planes, watermark patterns and correlation surfaces are all
/// `Field`s; the codec never aliases one behind another, so every
/// transformation that would mutate a caller's array produces a fresh
/// `Field` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Field {
    /// Create a zero-filled field.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create a field from row-major data. The data length must match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::FieldSize {
                rows,
                cols,
                got: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells (rows * cols).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Multiply every cell in place.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Return a copy of this field cyclically displaced by `shift`.
    ///
    /// The displacement is down by `(shift / cols) % rows` rows and
    /// right by `shift % cols` columns. The original field is left
    /// untouched; callers keep a clean copy of the pattern they embed.
    pub fn cyclic_shifted(&self, shift: usize) -> Field {
        let down = (shift / self.cols) % self.rows;
        let right = shift % self.cols;
        let mut out = Field::new(self.rows, self.cols);
        for i in 0..self.rows {
            let k = (i + down) % self.rows;
            for j in 0..self.cols {
                let l = (j + right) % self.cols;
                out.data[k * self.cols + l] = self.data[i * self.cols + j];
            }
        }
        out
    }
}

/// Elementwise `a - b`. Fails if the shapes differ.
pub fn difference(a: &Field, b: &Field) -> Result<Field> {
    if a.rows != b.rows || a.cols != b.cols {
        return Err(Error::DimensionMismatch {
            original_rows: b.rows,
            original_cols: b.cols,
            marked_rows: a.rows,
            marked_cols: a.cols,
        });
    }
    let data = a
        .data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| x - y)
        .collect();
    Field::from_vec(a.rows, a.cols, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_checks_length() {
        assert!(Field::from_vec(2, 3, vec![0.0; 6]).is_ok());
        assert!(Field::from_vec(2, 3, vec![0.0; 5]).is_err());
    }

    #[test]
    fn zero_shift_is_identity() {
        let f = Field::from_vec(3, 3, (0..9).map(|v| v as f64).collect()).unwrap();
        assert_eq!(f.cyclic_shifted(0), f);
    }

    #[test]
    fn shift_moves_down_then_right() {
        // shift = 1*cols + 2 => down 1, right 2
        let f = Field::from_vec(3, 3, (0..9).map(|v| v as f64).collect()).unwrap();
        let s = f.cyclic_shifted(5);
        assert_eq!(s.get(1, 2), f.get(0, 0));
        assert_eq!(s.get(2, 0), f.get(1, 1));
        assert_eq!(s.get(0, 1), f.get(2, 2));
    }

    #[test]
    fn shift_wraps_past_len() {
        // A full rows*cols shift is the identity again.
        let f = Field::from_vec(3, 4, (0..12).map(|v| v as f64).collect()).unwrap();
        assert_eq!(f.cyclic_shifted(12), f);
    }

    #[test]
    fn shift_leaves_original_untouched() {
        let f = Field::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let before = f.clone();
        let _ = f.cyclic_shifted(3);
        assert_eq!(f, before);
    }

    #[test]
    fn difference_elementwise() {
        let a = Field::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let b = Field::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let d = difference(&a, &b).unwrap();
        assert_eq!(d.as_slice(), &[4.0, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn difference_rejects_shape_mismatch() {
        let a = Field::new(2, 2);
        let b = Field::new(2, 3);
        assert!(difference(&a, &b).is_err());
    }
}
