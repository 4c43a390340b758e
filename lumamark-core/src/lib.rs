pub mod config;
pub mod detect;
pub mod embed;
pub mod error;
pub mod extract;
pub mod fft;
pub mod field;
pub mod message;
pub mod prime;
pub mod sequence;

// Re-export primary API types
pub use config::WatermarkConfig;
pub use detect::{DetectionRecord, DetectionReport};
pub use embed::EmbedSummary;
pub use error::Error;
pub use field::Field;
pub use message::NO_MESSAGE;

/// Embed a text message into a luma field (in-place).
///
/// The field holds normalized brightness values in `[0, 1]`, one cell
/// per pixel. One near-orthogonal pattern family is embedded per
/// character, each scaled by `strength`.
pub fn embed(
    luma: &mut Field,
    message: &str,
    strength: f64,
    config: &WatermarkConfig,
) -> error::Result<EmbedSummary> {
    embed::embed_message(luma, message, strength, config)
}

/// Detect a message from an (original, marked) pair of luma fields.
///
/// The fields must have identical dimensions; reconcile them before
/// calling (extraction needs pixel-exact positional correspondence).
/// A run that accepts no families is not an error: the report carries
/// the no-message sentinel text.
pub fn detect(
    original: &Field,
    marked: &Field,
    config: &WatermarkConfig,
) -> error::Result<DetectionReport> {
    detect::detect_message(original, marked, config)
}
