/// EMA (Exponential Moving Average) of a neutral-face ratio.
///
/// Formula: `value[t] = alpha * sample + (1 - alpha) * value[t-1]`
///
/// Seeded with an anatomical prior so the first frames classify sensibly
/// before any neutral samples have been observed.
#[derive(Clone, Debug)]
pub struct RunningBaseline {
    alpha: f64,
    value: f64,
}

impl RunningBaseline {
    pub fn new(prior: f64, alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: prior,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        if sample.is_finite() {
            self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        }
        self.value
    }
}
