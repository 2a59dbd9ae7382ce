//! Industry shaping strategies.
//!
//! A shaping strategy post-processes the raw adoption curve of an industry.
//! Strategies are deterministic: the same input always produces the same
//! output, and none of them draw random numbers.

use std::f64::consts::TAU;
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::ShapingKind;

/// Replaceable, named post-processing of a raw curve.
///
/// `raw[i]` is the curve value `i + 1` years after the start; `start` is the
/// value at year 0. Implementations return one value per input value.
pub trait ShapingStrategy: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn shape(&self, start: f64, raw: &[f64]) -> Vec<f64>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Smooth;

impl ShapingStrategy for Smooth {
    fn name(&self) -> &'static str {
        "smooth"
    }

    fn shape(&self, _start: f64, raw: &[f64]) -> Vec<f64> {
        raw.to_vec()
    }
}

/// Multiplies the curve by `1 + amplitude × sin(2π t / period)`.
#[derive(Debug, Clone, Copy)]
pub struct Oscillating {
    pub amplitude: f64,
    pub period_years: f64,
}

impl ShapingStrategy for Oscillating {
    fn name(&self) -> &'static str {
        "oscillating"
    }

    fn shape(&self, _start: f64, raw: &[f64]) -> Vec<f64> {
        raw.iter()
            .enumerate()
            .map(|(i, v)| {
                let t = (i + 1) as f64;
                v * (1.0 + self.amplitude * (TAU * t / self.period_years).sin())
            })
            .collect()
    }
}

/// Deployment waves: every `wave_years` years the level catches up with
/// the raw curve. In between it moves only `drift` of the way from the
/// previous level toward the curve.
#[derive(Debug, Clone, Copy)]
pub struct Stepped {
    pub wave_years: u32,
    pub drift: f64,
}

impl ShapingStrategy for Stepped {
    fn name(&self) -> &'static str {
        "stepped"
    }

    fn shape(&self, start: f64, raw: &[f64]) -> Vec<f64> {
        let mut level = start;
        raw.iter()
            .enumerate()
            .map(|(i, v)| {
                let t = (i + 1) as u32;
                level = if t % self.wave_years == 0 {
                    *v
                } else {
                    level + self.drift * (v - level)
                };
                level
            })
            .collect()
    }
}

/// Every `every` years the year's growth is damped by `damping`.
///
/// Damped growth is not recovered later, so the shaped curve runs below the
/// raw one after the first plateau.
#[derive(Debug, Clone, Copy)]
pub struct RegulatoryPlateau {
    pub every: u32,
    pub damping: f64,
}

impl ShapingStrategy for RegulatoryPlateau {
    fn name(&self) -> &'static str {
        "regulatory_plateau"
    }

    fn shape(&self, start: f64, raw: &[f64]) -> Vec<f64> {
        let mut shaped = Vec::with_capacity(raw.len());
        let mut previous_raw = start;
        let mut current = start;
        for (i, v) in raw.iter().enumerate() {
            let t = (i + 1) as u32;
            let mut delta = v - previous_raw;
            if t % self.every == 0 {
                delta *= 1.0 - self.damping;
            }
            current += delta;
            shaped.push(current);
            previous_raw = *v;
        }
        shaped
    }
}

/// Strategy for a configured shaping kind.
pub fn strategy_for(kind: &ShapingKind) -> Arc<dyn ShapingStrategy> {
    match *kind {
        ShapingKind::Smooth => Arc::new(Smooth),
        ShapingKind::Oscillating {
            amplitude,
            period_years,
        } => Arc::new(Oscillating {
            amplitude,
            period_years,
        }),
        ShapingKind::Stepped { wave_years, drift } => Arc::new(Stepped { wave_years, drift }),
        ShapingKind::RegulatoryPlateau { every, damping } => {
            Arc::new(RegulatoryPlateau { every, damping })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: [f64; 6] = [0.10, 0.14, 0.19, 0.25, 0.31, 0.36];

    #[test]
    fn smooth_is_identity() {
        assert_eq!(Smooth.shape(0.05, &RAW), RAW.to_vec());
    }

    #[test]
    fn oscillating_swings_around_curve() {
        let shaped = Oscillating {
            amplitude: 0.1,
            period_years: 4.0,
        }
        .shape(0.05, &RAW);
        // sin(π/2) = 1 at t = 1, sin(π) = 0 at t = 2, sin(3π/2) = -1 at t = 3.
        assert!((shaped[0] - 0.11).abs() < 1e-12);
        assert!((shaped[1] - 0.14).abs() < 1e-12);
        assert!((shaped[2] - 0.171).abs() < 1e-12);
    }

    #[test]
    fn stepped_catches_up_in_wave_years() {
        let shaped = Stepped {
            wave_years: 2,
            drift: 0.25,
        }
        .shape(0.05, &RAW);
        assert_eq!(shaped.len(), RAW.len());
        assert!((shaped[0] - 0.0625).abs() < 1e-12);
        assert!((shaped[1] - 0.14).abs() < 1e-12);
        assert!((shaped[2] - 0.1525).abs() < 1e-12);
        assert!((shaped[3] - 0.25).abs() < 1e-12);
        for (s, r) in shaped.iter().zip(RAW) {
            assert!(*s <= r + 1e-12);
        }
    }

    #[test]
    fn stepped_deltas_vary_on_linear_growth() {
        let linear: Vec<f64> = (1..=6).map(|t| 0.1 + 0.03 * f64::from(t)).collect();
        let shaped = Stepped {
            wave_years: 3,
            drift: 0.2,
        }
        .shape(0.1, &linear);
        let deltas: Vec<f64> = shaped.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(deltas.windows(2).all(|w| (w[1] - w[0]).abs() > 1e-9), "{deltas:?}");
    }

    #[test]
    fn plateau_damps_every_nth_year() {
        let shaped = RegulatoryPlateau {
            every: 2,
            damping: 1.0,
        }
        .shape(0.05, &RAW);
        // Year 2 growth (0.04) is removed entirely.
        assert!((shaped[0] - 0.10).abs() < 1e-12);
        assert!((shaped[1] - 0.10).abs() < 1e-12);
        assert!((shaped[2] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn strategies_are_named() {
        let names: Vec<_> = [
            ShapingKind::Smooth,
            ShapingKind::Oscillating {
                amplitude: 0.1,
                period_years: 3.0,
            },
            ShapingKind::Stepped {
                wave_years: 2,
                drift: 0.3,
            },
            ShapingKind::RegulatoryPlateau {
                every: 2,
                damping: 0.5,
            },
        ]
        .iter()
        .map(|k| strategy_for(k).name())
        .collect();
        assert_eq!(names, ["smooth", "oscillating", "stepped", "regulatory_plateau"]);
    }
}
