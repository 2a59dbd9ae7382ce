//! Year-by-year evolution of the net impact components.
//!
//! Market maturity climbs by a fixed step per year. Displacement grows with
//! the scenario's acceleration, and that boost fades by `displacement_decay`
//! per year. Creation compounds with adoption growth and demand compounds
//! with the efficiency improvement. Every component stays inside the bounds
//! the calculator applies today.

use serde::{Deserialize, Serialize};

use laborshift_core::TargetPeriod;

use crate::calculator::{ImpactComponents, NetImpactResult};
use crate::config::{EffectFactors, ProjectionSettings, ScenarioConfig};

/// Current components a trajectory starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentBaseline {
    pub displacement: f64,
    pub creation: f64,
    pub market_maturity: f64,
    pub demand: f64,
}

impl From<&ImpactComponents> for ComponentBaseline {
    fn from(c: &ImpactComponents) -> Self {
        Self {
            displacement: c.displacement,
            creation: c.creation,
            market_maturity: c.market_maturity,
            demand: c.demand,
        }
    }
}

impl From<&NetImpactResult> for ComponentBaseline {
    fn from(r: &NetImpactResult) -> Self {
        Self {
            displacement: r.displacement,
            creation: r.creation,
            market_maturity: r.market_maturity,
            demand: r.demand,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentYear {
    pub year: i32,
    pub offset: u32,
    pub market_maturity: f64,
    pub displacement: f64,
    pub creation: f64,
    pub demand: f64,
    /// `−displacement + creation × market_maturity + demand` for this year.
    pub net_impact: f64,
}

/// Evolve `baseline` over `1..=horizon` years under `scenario`.
pub fn evolve(
    baseline: ComponentBaseline,
    scenario: &ScenarioConfig,
    settings: &ProjectionSettings,
    effects: &EffectFactors,
    period: TargetPeriod,
    horizon: u32,
) -> Vec<ComponentYear> {
    (1..=horizon)
        .map(|offset| {
            let t = f64::from(offset);
            let market_maturity = (baseline.market_maturity + settings.maturity_step * t).clamp(0.0, 1.0);
            let boost = scenario.acceleration * (1.0 - settings.displacement_decay * t);
            let displacement = (baseline.displacement.abs() * (1.0 + boost)).clamp(0.0, effects.max_displacement);
            let creation = (baseline.creation * (1.0 + scenario.adoption_growth * t)).clamp(0.0, effects.max_creation);
            let demand = (baseline.demand * (1.0 + scenario.efficiency_improvement * t))
                .clamp(effects.min_demand, effects.max_demand);
            ComponentYear {
                year: period.year_after(offset),
                offset,
                market_maturity,
                displacement,
                creation,
                demand,
                net_impact: -displacement + creation * market_maturity + demand,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use laborshift_core::ScenarioName;

    fn baseline() -> ComponentBaseline {
        ComponentBaseline {
            displacement: 0.12,
            creation: 0.045,
            market_maturity: 0.5,
            demand: 0.009,
        }
    }

    #[test]
    fn components_follow_yearly_rules() {
        let config = ModelConfig::default();
        let scenario = config.scenarios[&ScenarioName::new("moderate")];
        let period = TargetPeriod::new(2025, 5).unwrap();
        let years = evolve(baseline(), &scenario, &config.projection, &config.effects, period, 3);

        assert_eq!(years.len(), 3);
        let y2 = years[1];
        assert_eq!(y2.year, 2027);
        assert!((y2.market_maturity - 0.7).abs() < 1e-12);
        assert!((y2.displacement - 0.12 * (1.0 + 0.2 * 0.8)).abs() < 1e-12);
        assert!((y2.creation - 0.045 * 1.6).abs() < 1e-12);
        assert!((y2.demand - 0.009 * 1.2).abs() < 1e-12);
        assert!((y2.net_impact - (-y2.displacement + y2.creation * y2.market_maturity + y2.demand)).abs() < 1e-15);
    }

    #[test]
    fn components_respect_bounds_over_long_horizons() {
        let config = ModelConfig::default();
        let scenario = config.scenarios[&ScenarioName::new("aggressive")];
        let period = TargetPeriod::new(2025, 5).unwrap();
        let heavy = ComponentBaseline {
            displacement: 0.7,
            creation: 0.4,
            market_maturity: 0.8,
            demand: -0.15,
        };
        let e = &config.effects;
        for y in evolve(heavy, &scenario, &config.projection, e, period, 50) {
            assert!((0.0..=1.0).contains(&y.market_maturity));
            assert!((0.0..=e.max_displacement).contains(&y.displacement));
            assert!((0.0..=e.max_creation).contains(&y.creation));
            assert!((e.min_demand..=e.max_demand).contains(&y.demand));
            assert!(y.net_impact.is_finite());
        }
        let years = evolve(heavy, &scenario, &config.projection, e, period, 50);
        assert_eq!(years[1].market_maturity, 1.0);
        assert_eq!(years[0].displacement, e.max_displacement);
    }
}
