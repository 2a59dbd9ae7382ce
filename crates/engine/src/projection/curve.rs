//! Logistic adoption curve.

/// `adoption(t) = ceiling / (1 + e^(−speed × (t − t0)))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdoptionCurve {
    pub ceiling: f64,
    pub speed: f64,
    pub t0: f64,
}

impl AdoptionCurve {
    /// Curve passing through `start` at `t = 0`.
    ///
    /// `start` is kept strictly inside `(0, ceiling)`: values below `min_start`
    /// are raised to it, values at or above the ceiling are pulled just below.
    pub fn through(start: f64, ceiling: f64, speed: f64, min_start: f64) -> Self {
        let start = start.max(min_start).min(ceiling * 0.99);
        let t0 = (ceiling / start - 1.0).ln() / speed;
        Self { ceiling, speed, t0 }
    }

    pub fn value_at(&self, t: f64) -> f64 {
        self.ceiling / (1.0 + (-self.speed * (t - self.t0)).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_start() {
        let curve = AdoptionCurve::through(0.12, 0.9, 1.3, 0.01);
        assert!((curve.value_at(0.0) - 0.12).abs() < 1e-12);
        assert!(curve.value_at(1.0) > 0.12);
        assert!(curve.value_at(40.0) <= 0.9);
    }

    #[test]
    fn start_is_floored_and_capped() {
        let low = AdoptionCurve::through(0.0, 0.8, 1.0, 0.01);
        assert!((low.value_at(0.0) - 0.01).abs() < 1e-12);

        let high = AdoptionCurve::through(0.9, 0.8, 1.0, 0.01);
        assert!((high.value_at(0.0) - 0.792).abs() < 1e-12);
    }
}
