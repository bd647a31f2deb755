/// Numeric tolerances used when sampling and shading parametric surfaces.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Distance kept from the open upper end of a parameter domain when sampling.
    pub parameter_bias: f64,
    /// Cross-product length at or below which a surface normal is considered degenerate.
    pub degenerate_normal: f64,
}

impl Tolerance {
    pub const DEFAULT_PARAMETER_BIAS: f64 = 1e-4;
    pub const DEFAULT_DEGENERATE_NORMAL: f64 = 1e-12;

    pub fn new(parameter_bias: f64, degenerate_normal: f64) -> Self {
        Self {
            parameter_bias,
            degenerate_normal,
        }
    }

    pub fn default_precision() -> Self {
        Self {
            parameter_bias: Self::DEFAULT_PARAMETER_BIAS,
            degenerate_normal: Self::DEFAULT_DEGENERATE_NORMAL,
        }
    }

    /// Clamp `t` into `[min, max - parameter_bias]`.
    ///
    /// If the domain is narrower than the bias the lower bound wins.
    pub fn clamp_parameter(self, t: f64, min: f64, max: f64) -> f64 {
        let upper = (max - self.parameter_bias).max(min);
        t.clamp(min, upper)
    }

    /// Check if a cross-product length is too small to normalize.
    pub fn is_degenerate_normal(self, length: f64) -> bool {
        length.is_nan() || length <= self.degenerate_normal
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::default_precision()
    }
}
