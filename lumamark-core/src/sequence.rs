use crate::field::Field;

/// Generate the `k`-th member of the watermark pattern family for
/// prime size `p`.
///
/// The base sequence marks quadratic residues mod `p` with `+1` and
/// everything else with `-1` (index 0 counts as a residue, since
/// `0 * 0 = 0`). Column `i` of the pattern is the base sequence
/// cyclically shifted by `(i * i * k) mod p`. Different `k` values
/// yield near-orthogonal patterns under cyclic cross-correlation,
/// which is what lets several characters share one spectrum region.
///
/// Pure function of `(p, k)`: repeated calls are bit-identical.
pub fn generate(p: usize, k: usize) -> Field {
    let mut residue = vec![-1.0f64; p];
    for i in 0..p {
        residue[(i * i) % p] = 1.0;
    }

    let mut pattern = Field::new(p, p);
    for i in 0..p {
        let shift = (i * i % p) * (k % p) % p;
        for j in 0..p {
            pattern.set(j, i, residue[(j + shift) % p]);
        }
    }
    pattern
}
