use serde::Serialize;

/// Colour/size normalisation range. Built once from every loaded reading so
/// that windowing never shifts the colour scale.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Min/max over the finite values, `None` if there are none.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Self { min: v, max: v }),
                Some(r) => Some(Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    /// Position of `value` in the range, clamped to `[0, 1]`. A flat range maps
    /// everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}
