//! Linear program data model
//!
//! Problems are plain data: variables with bounds, a linear objective and a
//! list of linear (in)equality constraints. Builders produce a
//! [`LinearProblem`], solver backends consume it through [`LpSolver`].

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Index of a variable inside its [`LinearProblem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub name: String,
    /// `None` means unbounded below
    pub lower: Option<f64>,
    /// `None` means unbounded above
    pub upper: Option<f64>,
}

impl VariableDef {
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: None,
            upper: None,
        }
    }

    pub fn non_negative(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: Some(0.0),
            upper: None,
        }
    }

    pub fn bounded(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// True when the bounds admit no value at all.
    pub fn is_empty_domain(&self) -> bool {
        matches!((self.lower, self.upper), (Some(lo), Some(hi)) if lo > hi)
    }
}

/// `Σ coefficient·variable + constant`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn term(mut self, var: VarId, coefficient: f64) -> Self {
        self.terms.push((var, coefficient));
        self
    }

    pub fn push(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Returns `factor · self`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|(v, c)| (*v, c * factor)).collect(),
            constant: self.constant * factor,
        }
    }

    /// Concatenates the terms of `other` onto `self`. Repeated variables are
    /// kept as separate terms; evaluation and solver backends sum them.
    pub fn plus(mut self, other: &LinearExpr) -> Self {
        self.terms.extend(other.terms.iter().copied());
        self.constant += other.constant;
        self
    }

    /// Evaluates the expression against a full assignment indexed by [`VarId`].
    /// Returns `None` if a referenced variable has no value.
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        self.terms.iter().try_fold(self.constant, |acc, (var, coefficient)| {
            values.get(var.0).map(|value| acc + coefficient * value)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Relation {
    #[strum(serialize = "=")]
    Eq,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">=")]
    Ge,
}

/// `lhs relation rhs`, with the constant part of the problem kept in `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(name: impl Into<String>, lhs: LinearExpr, relation: Relation, rhs: f64) -> Self {
        Self {
            name: name.into(),
            lhs,
            relation,
            rhs,
        }
    }

    /// Checks the constraint against an assignment within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let Some(lhs) = self.lhs.evaluate(values) else {
            return false;
        };
        match self.relation {
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
        }
    }
}

/// Minimisation problem over continuous variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearProblem {
    pub name: String,
    pub variables: Vec<VariableDef>,
    pub objective: LinearExpr,
    pub constraints: Vec<Constraint>,
}

impl LinearProblem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_variable(&mut self, def: VariableDef) -> VarId {
        self.variables.push(def);
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Checks that every expression only references declared variables.
    pub fn check_references(&self) -> Result<(), String> {
        let n = self.variables.len();
        let dangling = |expr: &LinearExpr| expr.terms.iter().any(|(v, _)| v.0 >= n);
        if dangling(&self.objective) {
            return Err("objective references an undeclared variable".to_string());
        }
        match self.constraints.iter().find(|c| dangling(&c.lhs)) {
            Some(c) => Err(format!("constraint {} references an undeclared variable", c.name)),
            None => Ok(()),
        }
    }

    /// Renders the problem in CPLEX LP text format.
    pub fn to_lp_format(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\\* {} *\\", self.name);
        let _ = writeln!(out, "Minimize");
        let _ = writeln!(out, " obj: {}", self.render_expr(&self.objective, true));
        let _ = writeln!(out, "Subject To");
        for c in &self.constraints {
            let _ = writeln!(
                out,
                " {}: {} {} {}",
                c.name,
                self.render_expr(&c.lhs, false),
                c.relation,
                c.rhs - c.lhs.constant
            );
        }
        let _ = writeln!(out, "Bounds");
        for v in &self.variables {
            match (v.lower, v.upper) {
                (None, None) => {
                    let _ = writeln!(out, " {} free", v.name);
                }
                (Some(lo), None) => {
                    let _ = writeln!(out, " {} >= {}", v.name, lo);
                }
                (None, Some(hi)) => {
                    let _ = writeln!(out, " -inf <= {} <= {}", v.name, hi);
                }
                (Some(lo), Some(hi)) => {
                    let _ = writeln!(out, " {} <= {} <= {}", lo, v.name, hi);
                }
            }
        }
        out.push_str("End\n");
        out
    }

    fn render_expr(&self, expr: &LinearExpr, with_constant: bool) -> String {
        let mut parts = Vec::with_capacity(expr.terms.len() + 1);
        for (var, coefficient) in &expr.terms {
            let name = self
                .variables
                .get(var.0)
                .map(|v| v.name.as_str())
                .unwrap_or("?");
            let sign = if parts.is_empty() {
                if *coefficient < 0.0 { "-" } else { "" }
            } else if *coefficient < 0.0 {
                "- "
            } else {
                "+ "
            };
            parts.push(format!("{}{} {}", sign, coefficient.abs(), name));
        }
        if with_constant && expr.constant != 0.0 {
            parts.push(format!("+ {}", expr.constant));
        }
        if parts.is_empty() {
            "0".to_string()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum SolverStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Error,
}

/// What a backend hands back. `values` is indexed by [`VarId`] and only
/// present when `status` is [`SolverStatus::Optimal`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub status: SolverStatus,
    pub values: Option<Vec<f64>>,
    pub message: Option<String>,
}

impl SolverOutput {
    pub fn optimal(values: Vec<f64>) -> Self {
        Self {
            status: SolverStatus::Optimal,
            values: Some(values),
            message: None,
        }
    }

    pub fn failed(status: SolverStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            values: None,
            message: Some(message.into()),
        }
    }
}

/// Solver boundary. Implementations must not retain the problem after
/// returning.
pub trait LpSolver: Send + Sync {
    fn solve(&self, problem: &LinearProblem, time_limit: Duration) -> SolverOutput;

    fn name(&self) -> &str;
}
