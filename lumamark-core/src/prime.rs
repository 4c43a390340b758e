use crate::error::{Error, Result};

/// Largest prime less than or equal to `n`, if any.
pub fn largest_prime_at_most(n: usize) -> Option<usize> {
    (2..=n).rev().find(|&c| is_prime(c))
}

/// Pattern side length for an image: the largest prime that fits
/// inside `min(rows, cols) - 2`. The two reserved pixels per axis keep
/// the DC row and column of the spectrum unmarked.
pub fn pattern_size(rows: usize, cols: usize) -> Result<usize> {
    let bound = rows.min(cols).saturating_sub(2);
    largest_prime_at_most(bound).ok_or(Error::ImageTooSmall { rows, cols })
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_prime_known_values() {
        assert_eq!(largest_prime_at_most(2), Some(2));
        assert_eq!(largest_prime_at_most(10), Some(7));
        assert_eq!(largest_prime_at_most(97), Some(97));
        assert_eq!(largest_prime_at_most(100), Some(97));
        assert_eq!(largest_prime_at_most(1), None);
    }

    #[test]
    fn pattern_size_reserves_border() {
        // 100x80 image: min dim 80, bound 78, largest prime 73.
        assert_eq!(pattern_size(100, 80).unwrap(), 73);
        // Square 33x33: bound 31, which is itself prime.
        assert_eq!(pattern_size(33, 33).unwrap(), 31);
    }

    #[test]
    fn tiny_image_rejected() {
        assert!(matches!(
            pattern_size(3, 500),
            Err(Error::ImageTooSmall { rows: 3, cols: 500 })
        ));
        assert!(pattern_size(0, 0).is_err());
    }
}
