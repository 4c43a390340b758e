/// Configuration for watermark embedding and detection.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Peak-to-RMS ratio above which a correlation peak counts as a
    /// detected character. The detection loop stops at the first family
    /// whose ratio falls at or below this value.
    pub threshold: f64,
    /// Number of leading spectrum rows and columns left unmarked. The
    /// DC and near-DC coefficients live there; adding energy to them
    /// shifts overall brightness and skews the correlation statistic.
    pub border: usize,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            threshold: 6.0,
            border: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = WatermarkConfig::default();
        assert_eq!(config.threshold, 6.0);
        assert_eq!(config.border, 1);
    }
}
