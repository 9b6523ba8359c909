/// One named expression's state for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpressionSignal {
    pub name: String,
    pub active: bool,
    /// The ratio the decision was based on, for logging and tuning.
    pub raw_metric: f64,
}

impl ExpressionSignal {
    pub fn new(name: impl Into<String>, active: bool, raw_metric: f64) -> Self {
        Self {
            name: name.into(),
            active,
            raw_metric,
        }
    }

    pub fn active(name: impl Into<String>, raw_metric: f64) -> Self {
        Self::new(name, true, raw_metric)
    }

    pub fn inactive(name: impl Into<String>, raw_metric: f64) -> Self {
        Self::new(name, false, raw_metric)
    }
}
