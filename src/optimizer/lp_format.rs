//! CPLEX LP text rendering, for inspecting a built model or feeding it to an
//! external solver by hand.

use std::fmt;

use super::{LinearExpr, LinearProgram, Sense, VarDomain};

impl fmt::Display for LinearProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\\ subgraph-select flow model")?;
        match self.sense() {
            Sense::Maximize => writeln!(f, "Maximize")?,
            Sense::Minimize => writeln!(f, "Minimize")?,
        }
        write!(f, " obj:")?;
        write_expr(f, self, self.objective(), true)?;
        writeln!(f)?;

        writeln!(f, "Subject To")?;
        for constraint in self.constraints() {
            write!(f, " {}:", constraint.label)?;
            write_expr(f, self, &constraint.lhs, false)?;
            writeln!(
                f,
                " {} {}",
                constraint.relation,
                number(constraint.rhs - constraint.lhs.constant())
            )?;
        }

        let continuous: Vec<&str> = self
            .variables()
            .iter()
            .filter(|v| v.domain == VarDomain::NonNegative)
            .map(|v| v.name.as_str())
            .collect();
        if !continuous.is_empty() {
            writeln!(f, "Bounds")?;
            for name in continuous {
                writeln!(f, " {name} >= 0")?;
            }
        }

        let binaries: Vec<&str> = self
            .variables()
            .iter()
            .filter(|v| v.domain == VarDomain::Binary)
            .map(|v| v.name.as_str())
            .collect();
        if !binaries.is_empty() {
            writeln!(f, "Binaries")?;
            for name in binaries {
                writeln!(f, " {name}")?;
            }
        }

        writeln!(f, "End")
    }
}

fn write_expr(
    f: &mut fmt::Formatter<'_>,
    program: &LinearProgram,
    expr: &LinearExpr,
    with_constant: bool,
) -> fmt::Result {
    if expr.terms().is_empty() {
        // LP format rejects empty rows; 0 times any variable keeps it valid
        if let Some(first) = program.variables().first() {
            write!(f, " 0 {}", first.name)?;
        }
    }
    for (position, &(var, coefficient)) in expr.terms().iter().enumerate() {
        let name = &program.variable(var).name;
        let sign = if coefficient < 0.0 { "-" } else { "+" };
        if position == 0 && sign == "+" {
            write!(f, " {} {}", number(coefficient), name)?;
        } else {
            write!(f, " {} {} {}", sign, number(coefficient.abs()), name)?;
        }
    }
    if with_constant && expr.constant() != 0.0 {
        let sign = if expr.constant() < 0.0 { "-" } else { "+" };
        write!(f, " {} {}", sign, number(expr.constant().abs()))?;
    }
    Ok(())
}

fn number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
