use strum::IntoEnumIterator;
use tracing::debug;

use super::constraints::{self, BigM, ConstraintFamily, DecisionVars};
use super::{LinearProgram, Sense, VarDomain};
use crate::domain::GraphModel;

const BIG_M_TOLERANCE: f64 = 1e-9;

/// Builds the flow-based connectivity model for a graph instance.
///
/// Building is pure: the same graph and options always produce the same
/// program, with variables and constraints in the same order.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    big_m: BigM,
}

/// The assembled program together with the handles needed to read a
/// solution back
#[derive(Debug, Clone)]
pub struct FlowModel {
    program: LinearProgram,
    vars: DecisionVars,
    big_m: f64,
}

impl FlowModel {
    pub fn program(&self) -> &LinearProgram {
        &self.program
    }

    pub fn vars(&self) -> &DecisionVars {
        &self.vars
    }

    pub fn big_m(&self) -> f64 {
        self.big_m
    }
}

impl ModelBuilder {
    pub fn new(big_m: BigM) -> Self {
        Self { big_m }
    }

    pub fn build(&self, graph: &GraphModel) -> FlowModel {
        let mut program = LinearProgram::new(Sense::Maximize);

        let selected = graph
            .vertices()
            .map(|j| program.add_variable(format!("select_{j}"), VarDomain::Binary))
            .collect();
        let flow = graph
            .arcs()
            .iter()
            .map(|arc| {
                program.add_variable(
                    format!("flow_{}_{}", arc.tail, arc.head),
                    VarDomain::NonNegative,
                )
            })
            .collect();
        let vars = DecisionVars { selected, flow };

        let big_m = self.big_m.value(graph, BIG_M_TOLERANCE);

        program.add_constraint(constraints::budget(graph, &vars));
        program.extend_constraints(constraints::terminal_forcing(graph, &vars));
        program.extend_constraints(constraints::flow_capacity(graph, &vars, big_m));
        program.extend_constraints(constraints::flow_balance(graph, &vars));
        program.add_constraint(constraints::source_flow(graph, &vars));
        program.set_objective(constraints::objective(graph, &vars));

        for family in ConstraintFamily::iter() {
            debug!(%family, count = program.family_count(family), "constraint family built");
        }
        debug!(
            variables = program.variables().len(),
            constraints = program.constraints().len(),
            big_m,
            "flow model built"
        );

        FlowModel {
            program,
            vars,
            big_m,
        }
    }
}
