pub mod bs;
pub mod normal;

/// Common traits used by the pricing models
pub mod traits {
    /// Standard normal distribution as seen by the pricing engine.
    ///
    /// Implementations differ only in accuracy; the engine never depends on which one
    /// it is given.
    pub trait NormalDistribution {
        /// Cumulative distribution N(x), in [0, 1]
        fn cdf(&self, x: f64) -> f64;

        /// Density n(x) = exp(-x²/2) / sqrt(2π)
        fn pdf(&self, x: f64) -> f64 {
            super::normal::normal_pdf(x)
        }

        /// Short name used in logs.
        fn name(&self) -> &'static str;
    }
}
