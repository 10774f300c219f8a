pub struct StatsHelper;

impl StatsHelper {
    /// Minimum over the present, non-NaN values.
    pub fn min(samples: &[Option<f64>]) -> Option<f64> {
        samples
            .iter()
            .flatten()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }
}
