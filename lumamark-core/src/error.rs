use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "original and marked images have different dimensions: \
         {original_rows}x{original_cols} vs {marked_rows}x{marked_cols}"
    )]
    DimensionMismatch {
        original_rows: usize,
        original_cols: usize,
        marked_rows: usize,
        marked_cols: usize,
    },

    #[error("image too small: no prime pattern size fits a {rows}x{cols} image")]
    ImageTooSmall { rows: usize, cols: usize },

    #[error("pattern size {p} with border {border} does not fit a {rows}x{cols} field")]
    PatternTooLarge {
        p: usize,
        border: usize,
        rows: usize,
        cols: usize,
    },

    #[error("pattern has {array_size} cells, too few to encode ASCII (need at least {min})")]
    AlphabetOverflow { array_size: usize, min: usize },

    #[error("character {ch:?} is outside the encodable ASCII range")]
    CharOutOfRange { ch: char },

    #[error("shift {shift} is outside the pattern range 0..{array_size}")]
    ShiftOutOfRange { shift: usize, array_size: usize },

    #[error("field data length {got} does not match {rows}x{cols}")]
    FieldSize { rows: usize, cols: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
