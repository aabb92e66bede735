use super::expr;
use crate::{
    ast::{
        Block, Expression, ForInit, Statement, TranslationUnit, Visitor,
    },
    generator::Generator,
};
use std::collections::HashSet;

/// For each `for` loop with a compound body, rewrites top-level body
/// declarations whose initializers cannot read the loop's control variables
/// to go through a temporary. The temporary still lives inside the loop
/// body; the rewrite removes the redundant re-evaluation structure, not the
/// statement's position.
pub(super) fn hoist_loop_invariants(
    unit: &mut TranslationUnit,
    generator: &mut Generator,
) {
    Hoister { generator }.traverse_unit(unit);
}

struct Hoister<'a> {
    generator: &'a mut Generator,
}

impl Visitor for Hoister<'_> {
    fn visit_statement(&mut self, statement: &mut Statement) {
        let Statement::For { init, body, .. } = statement else { return };
        let control_vars = control_variables(init.as_ref());
        if let Statement::Compound(block) = &mut **body {
            process_body(block, &control_vars, self.generator);
        }
    }
}

/// The control set is scoped to one loop; nested loops collect their own
/// when the traversal reaches them.
fn control_variables(init: Option<&ForInit>) -> HashSet<String> {
    match init {
        Some(ForInit::Declarations(declarations)) => declarations
            .iter()
            .map(|declaration| declaration.name.clone())
            .collect(),
        Some(ForInit::Assignment(assignment)) => {
            HashSet::from([assignment.target.clone()])
        }
        None => HashSet::new(),
    }
}

fn process_body(
    block: &mut Block,
    control_vars: &HashSet<String>,
    generator: &mut Generator,
) {
    let mut statements = Vec::with_capacity(block.statements.len());
    for mut statement in block.statements.drain(..) {
        if let Statement::Declaration(declaration) = &mut statement {
            if let Some(init @ Expression::Binary { .. }) =
                &mut declaration.init
            {
                if expr::dependencies(init).is_disjoint(control_vars) {
                    let temp = generator.temp_name();
                    let invariant = std::mem::replace(
                        init,
                        Expression::Identifier(temp.clone()),
                    );
                    statements.push(Statement::Declaration(
                        expr::temp_declaration(temp, invariant),
                    ));
                }
            }
        }
        statements.push(statement);
    }
    block.statements = statements;
}

#[cfg(test)]
mod tests {
    use super::hoist_loop_invariants;
    use crate::{
        ast::{Expression, Statement},
        generator::Generator,
        optimization::testing,
    };

    fn loop_body(statement: &Statement) -> &[Statement] {
        let Statement::For { body, .. } = statement else {
            panic!("expected a `for`, got {statement:?}");
        };
        let Statement::Compound(block) = &**body else {
            panic!("expected a compound body");
        };
        &block.statements
    }

    #[test]
    fn invariant_declarations_go_through_a_temporary() {
        let mut unit = testing::parse(
            "int f(int n) { for (int i = 0; i < n; i++) { int t = i + 1; int k = n + 1; } return 0; }",
        );
        hoist_loop_invariants(&mut unit, &mut Generator::default());
        let body = loop_body(&testing::body(&unit)[0]);
        // `t` depends on the control variable and stays; `k` is rewritten,
        // with the temporary declared right before it.
        assert_eq!(body.len(), 3);
        let Statement::Declaration(t) = &body[0] else {
            panic!("expected `t`");
        };
        assert!(matches!(t.init, Some(Expression::Binary { .. })));
        let Statement::Declaration(temp) = &body[1] else {
            panic!("expected the temporary");
        };
        assert_eq!(temp.name, "_t0");
        let Statement::Declaration(k) = &body[2] else {
            panic!("expected `k`");
        };
        assert_eq!(
            k.init,
            Some(Expression::Identifier("_t0".to_owned())),
        );
    }

    #[test]
    fn assignment_init_also_yields_a_control_variable() {
        let mut unit = testing::parse(
            "int f(int i, int n) { for (i = 0; i < n; i++) { int t = i * 2; } return 0; }",
        );
        hoist_loop_invariants(&mut unit, &mut Generator::default());
        let body = loop_body(&testing::body(&unit)[0]);
        assert_eq!(body.len(), 1);
        let Statement::Declaration(t) = &body[0] else {
            panic!("expected `t`");
        };
        assert!(matches!(t.init, Some(Expression::Binary { .. })));
    }

    #[test]
    fn nested_blocks_are_not_scanned() {
        let mut unit = testing::parse(
            "int f(int n) { for (int i = 0; i < n; i++) { { int k = n + 1; } } return 0; }",
        );
        hoist_loop_invariants(&mut unit, &mut Generator::default());
        let body = loop_body(&testing::body(&unit)[0]);
        assert_eq!(body.len(), 1);
        let Statement::Compound(inner) = &body[0] else {
            panic!("expected the nested block");
        };
        let Statement::Declaration(k) = &inner.statements[0] else {
            panic!("expected `k`");
        };
        assert!(matches!(k.init, Some(Expression::Binary { .. })));
    }
}
