//! Helpers shared by the passes that inspect or synthesize expressions.

use crate::ast::{Declaration, Expression, Ty};
use std::collections::HashSet;

/// Canonical textual form of an expression, used to detect repeated
/// computations. Identifiers key by name and literals by their text, so two
/// structurally identical expressions always produce the same key.
pub(super) fn structural_key(expr: &Expression) -> String {
    match expr {
        Expression::Identifier(name) => name.clone(),
        Expression::Constant(constant) => constant.value.clone(),
        Expression::Binary { operator, lhs, rhs } => format!(
            "{} {operator} {}",
            structural_key(lhs),
            structural_key(rhs)
        ),
    }
}

/// Every identifier name the expression reads.
pub(super) fn dependencies(expr: &Expression) -> HashSet<String> {
    fn collect(expr: &Expression, names: &mut HashSet<String>) {
        match expr {
            Expression::Identifier(name) => {
                names.insert(name.clone());
            }
            Expression::Constant(_) => {}
            Expression::Binary { lhs, rhs, .. } => {
                collect(lhs, names);
                collect(rhs, names);
            }
        }
    }

    let mut names = HashSet::new();
    collect(expr, &mut names);
    names
}

pub(super) fn temp_declaration(
    name: String,
    init: Expression,
) -> Declaration {
    Declaration {
        name,
        ty: Ty::Int,
        init: Some(init),
    }
}
