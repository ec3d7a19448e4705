//! Solver-agnostic linear program
//!
//! Variables, linear constraints and the objective are held as plain data so
//! the same model can be handed to any backend, written out in LP format, or
//! evaluated against an assignment without a solver.

use std::fmt;

use super::ConstraintFamily;

/// Index of a variable inside its [`LinearProgram`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarDomain {
    /// 0 or 1
    Binary,
    /// Continuous, lower bound 0, no upper bound
    NonNegative,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub domain: VarDomain,
}

/// `Σ coefficient·variable + constant`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
    constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn add_constant(&mut self, constant: f64) {
        self.constant += constant;
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Value of the expression under `values`, indexed by [`VarId::index`]
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coefficient)| coefficient * values[var.index()])
            .sum::<f64>()
            + self.constant
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
            constant: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    Eq,
    GreaterEq,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Relation::LessEq => "<=",
            Relation::Eq => "=",
            Relation::GreaterEq => ">=",
        };
        f.write_str(symbol)
    }
}

/// `lhs <relation> rhs`, tagged with the family it belongs to and a label
/// naming the vertex or arc it was generated for
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub label: String,
    pub lhs: LinearExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(
        family: ConstraintFamily,
        label: impl Into<String>,
        lhs: LinearExpr,
        relation: Relation,
        rhs: f64,
    ) -> Self {
        Self {
            family,
            label: label.into(),
            lhs,
            relation,
            rhs,
        }
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs.evaluate(values);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs + tolerance,
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
            Relation::GreaterEq => lhs >= self.rhs - tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    sense: Sense,
}

impl LinearProgram {
    pub fn new(sense: Sense) -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: LinearExpr::new(),
            sense,
        }
    }

    pub fn add_variable(&mut self, name: impl Into<String>, domain: VarDomain) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            domain,
        });
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn extend_constraints(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, var: VarId) -> &Variable {
        &self.variables[var.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn family_count(&self, family: ConstraintFamily) -> usize {
        self.constraints.iter().filter(|c| c.family == family).count()
    }

    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }

    /// Constraints `values` violates by more than `tolerance`
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<&Constraint> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied(values, tolerance))
            .collect()
    }

    /// Objective bound that holds for every feasible point, from variable
    /// domains alone. Infinite when an unbounded variable can improve the
    /// objective.
    pub fn trivial_bound(&self) -> f64 {
        let improving = |coefficient: f64| match self.sense {
            Sense::Maximize => coefficient > 0.0,
            Sense::Minimize => coefficient < 0.0,
        };

        let mut bound = self.objective.constant();
        for &(var, coefficient) in self.objective.terms() {
            if !improving(coefficient) {
                continue;
            }
            match self.variable(var).domain {
                VarDomain::Binary => bound += coefficient,
                VarDomain::NonNegative => {
                    return match self.sense {
                        Sense::Maximize => f64::INFINITY,
                        Sense::Minimize => f64::NEG_INFINITY,
                    }
                }
            }
        }
        bound
    }
}
