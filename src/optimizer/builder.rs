//! LP formulation of the HVAC dispatch problem
//!
//! For a horizon of H steps the problem has 4H variables, laid out as
//! `energy[0..H]`, `temp[0..H]`, `below[0..H]`, `above[0..H]`:
//! - `energy[t]` in `[0, hvac_max_capacity]` (decision)
//! - `temp[t]` free, pinned by the recurrence equalities (state)
//! - `below[t] >= 0`, `above[t] >= 0` comfort violation slacks
//!
//! and 3H constraints, emitted per step in this order:
//! - `temp[0] - k*energy[0] = initial_temp`,
//!   `temp[t] - temp[t-1] - k*energy[t] = 0`
//! - `below[t] + temp[t] >= comfort_min`
//! - `above[t] - temp[t] >= -comfort_max`
//!
//! Objective: `w_cost * Σ price[t]*energy[t] + w_comfort * Σ (below[t] + above[t])`.

use crate::domain::{ObjectiveWeights, ScheduleRequest};

use super::lp::{Constraint, LinearExpr, LinearProblem, Relation, VarId, VariableDef};
use super::types::{ScheduleError, ScheduleResult, DEFAULT_HORIZON_WARNING};

pub const PROBLEM_NAME: &str = "hvac_energy_cost_comfort";

/// A built problem plus the handles needed to read a solution back.
#[derive(Debug, Clone, PartialEq)]
pub struct HvacProblem {
    pub problem: LinearProblem,
    pub energy: Vec<VarId>,
    pub temp: Vec<VarId>,
    pub below: Vec<VarId>,
    pub above: Vec<VarId>,
    /// `Σ price[t]*energy[t]`, unweighted
    pub cost_expr: LinearExpr,
    /// `Σ (below[t] + above[t])`, unweighted
    pub comfort_expr: LinearExpr,
    pub weights: ObjectiveWeights,
}

impl HvacProblem {
    pub fn horizon(&self) -> usize {
        self.energy.len()
    }
}

#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    horizon_warning: usize,
}

impl Default for ProblemBuilder {
    fn default() -> Self {
        Self {
            horizon_warning: DEFAULT_HORIZON_WARNING,
        }
    }
}

impl ProblemBuilder {
    pub fn new(horizon_warning: usize) -> Self {
        Self { horizon_warning }
    }

    /// Builds the problem for an already-normalized pair of weights.
    pub fn build(&self, request: &ScheduleRequest, weights: ObjectiveWeights) -> ScheduleResult<HvacProblem> {
        validate_request(request)?;

        let h = request.horizon_hours;
        if h > self.horizon_warning {
            tracing::warn!(
                horizon = h,
                threshold = self.horizon_warning,
                "large optimization horizon, solve time may grow"
            );
        }

        let mut problem = LinearProblem::new(PROBLEM_NAME);

        let energy: Vec<VarId> = (0..h)
            .map(|t| {
                problem.add_variable(VariableDef::bounded(
                    format!("energy_{t}"),
                    0.0,
                    request.hvac_max_capacity,
                ))
            })
            .collect();
        let temp: Vec<VarId> = (0..h)
            .map(|t| problem.add_variable(VariableDef::free(format!("temp_{t}"))))
            .collect();
        let below: Vec<VarId> = (0..h)
            .map(|t| problem.add_variable(VariableDef::non_negative(format!("below_min_{t}"))))
            .collect();
        let above: Vec<VarId> = (0..h)
            .map(|t| problem.add_variable(VariableDef::non_negative(format!("above_max_{t}"))))
            .collect();

        let mut cost_expr = LinearExpr::new();
        for (price, e) in request.energy_prices.iter().zip(&energy) {
            cost_expr.push(*e, *price);
        }

        let mut comfort_expr = LinearExpr::new();
        for (b, a) in below.iter().zip(&above) {
            comfort_expr.push(*b, 1.0);
            comfort_expr.push(*a, 1.0);
        }

        problem.objective = cost_expr
            .scaled(weights.cost)
            .plus(&comfort_expr.scaled(weights.comfort));

        let k = request.temp_change_per_unit_energy;
        for t in 0..h {
            let recurrence = if t == 0 {
                Constraint::new(
                    format!("temp_dynamics_{t}"),
                    LinearExpr::new().term(temp[0], 1.0).term(energy[0], -k),
                    Relation::Eq,
                    request.initial_temp,
                )
            } else {
                Constraint::new(
                    format!("temp_dynamics_{t}"),
                    LinearExpr::new()
                        .term(temp[t], 1.0)
                        .term(temp[t - 1], -1.0)
                        .term(energy[t], -k),
                    Relation::Eq,
                    0.0,
                )
            };
            problem.add_constraint(recurrence);

            // below[t] >= comfort_min - temp[t]
            problem.add_constraint(Constraint::new(
                format!("comfort_below_{t}"),
                LinearExpr::new().term(below[t], 1.0).term(temp[t], 1.0),
                Relation::Ge,
                request.comfort_min,
            ));

            // above[t] >= temp[t] - comfort_max
            problem.add_constraint(Constraint::new(
                format!("comfort_above_{t}"),
                LinearExpr::new().term(above[t], 1.0).term(temp[t], -1.0),
                Relation::Ge,
                -request.comfort_max,
            ));
        }

        tracing::debug!(
            horizon = h,
            variables = problem.num_variables(),
            constraints = problem.num_constraints(),
            "built HVAC optimization problem"
        );

        Ok(HvacProblem {
            problem,
            energy,
            temp,
            below,
            above,
            cost_expr,
            comfort_expr,
            weights,
        })
    }
}

/// Structural checks performed before any solver work.
pub fn validate_request(request: &ScheduleRequest) -> ScheduleResult<()> {
    if request.horizon_hours == 0 {
        return Err(ScheduleError::invalid("horizon_hours must be positive"));
    }
    if request.energy_prices.len() != request.horizon_hours {
        return Err(ScheduleError::invalid(format!(
            "energy_prices has {} entries, expected horizon_hours = {}",
            request.energy_prices.len(),
            request.horizon_hours
        )));
    }
    if let Some(t) = request.energy_prices.iter().position(|p| !p.is_finite()) {
        return Err(ScheduleError::invalid(format!("energy_prices[{t}] is not finite")));
    }

    let scalars = [
        ("comfort_min", request.comfort_min),
        ("comfort_max", request.comfort_max),
        ("initial_temp", request.initial_temp),
        ("hvac_max_capacity", request.hvac_max_capacity),
        ("temp_change_per_unit_energy", request.temp_change_per_unit_energy),
    ];
    if let Some((name, _)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
        return Err(ScheduleError::invalid(format!("{name} is not finite")));
    }

    if request.comfort_min > request.comfort_max {
        return Err(ScheduleError::invalid(format!(
            "comfort_min ({}) exceeds comfort_max ({})",
            request.comfort_min, request.comfort_max
        )));
    }
    Ok(())
}
