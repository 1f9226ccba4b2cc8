use serde::{Deserialize, Serialize};
use strum::Display;
use validator::Validate;

/// Inputs for one optimization call.
///
/// Prices, bounds and temperatures share whatever units the caller uses
/// (typically currency/kWh, °C and kWh); the scheduler only relies on them
/// being consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ScheduleRequest {
    /// Price per unit energy for each step of the horizon
    #[validate(length(min = 1))]
    pub energy_prices: Vec<f64>,
    pub comfort_min: f64,
    pub comfort_max: f64,
    /// Temperature at the start of step 0
    pub initial_temp: f64,
    #[validate(range(min = 1))]
    pub horizon_hours: usize,
    /// Upper bound on energy applied per step
    pub hvac_max_capacity: f64,
    /// Temperature delta per unit of energy; negative for cooling
    pub temp_change_per_unit_energy: f64,
    pub cost_weight: f64,
    pub comfort_weight: f64,
}

/// Effective objective weights after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    pub cost: f64,
    pub comfort: f64,
}

impl ObjectiveWeights {
    pub fn sum(&self) -> f64 {
        self.cost + self.comfort
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalSchedule {
    /// Energy applied per step
    pub schedule: Vec<f64>,
    /// Temperature at the end of each step
    pub temperatures: Vec<f64>,
    /// `Σ price[t]·energy[t]`
    pub total_cost: f64,
    /// `Σ (below[t] + above[t])`
    pub total_comfort_deviation: f64,
    /// Weighted objective at the optimum
    pub objective_value: f64,
    pub weights: ObjectiveWeights,
}

/// Why no schedule was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum FailureStatus {
    Infeasible,
    Unbounded,
    SolverError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum OptimizationResult {
    Optimal(OptimalSchedule),
    NotSolved {
        status: FailureStatus,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        message: Option<String>,
    },
}

impl OptimizationResult {
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal(_))
    }

    pub fn optimal(&self) -> Option<&OptimalSchedule> {
        match self {
            Self::Optimal(s) => Some(s),
            Self::NotSolved { .. } => None,
        }
    }

    pub fn failure_status(&self) -> Option<FailureStatus> {
        match self {
            Self::Optimal(_) => None,
            Self::NotSolved { status, .. } => Some(*status),
        }
    }
}
