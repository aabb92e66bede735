use crate::ast::{
    Assignment, BinaryOperator, Block, Constant, Declaration, Expression,
    ForInit, Statement, TranslationUnit,
};
use std::collections::{HashMap, HashSet};

/// Re-runs the folder over the tree until the recorded-constant mapping
/// stops changing between iterations. The folder itself persists across
/// iterations, so the reassigned-variable set only ever grows.
pub(super) fn fold_constants(unit: &mut TranslationUnit) {
    let mut folder = Folder::default();
    let mut previous = HashMap::new();
    loop {
        folder.traverse_unit(unit);
        if folder.constants == previous {
            break;
        }
        previous = folder.constants.clone();
    }
}

#[derive(Default)]
struct Folder {
    constants: HashMap<String, Constant>,
    loop_vars: HashSet<String>,
    assigned: HashSet<String>,
    in_condition: bool,
}

impl Folder {
    fn traverse_unit(&mut self, unit: &mut TranslationUnit) {
        for function in &mut unit.functions {
            self.traverse_block(&mut function.body);
        }
    }

    fn traverse_block(&mut self, block: &mut Block) {
        for statement in &mut block.statements {
            self.traverse_statement(statement);
        }
    }

    fn traverse_statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Declaration(declaration) => {
                self.declaration(declaration);
            }
            Statement::Assignment(assignment) => self.assignment(assignment),
            Statement::Compound(block) => self.traverse_block(block),
            Statement::If {
                condition,
                then,
                else_,
            } => {
                self.in_condition = true;
                self.fold(condition);
                self.in_condition = false;
                self.traverse_statement(then);
                if let Some(else_) = else_ {
                    self.traverse_statement(else_);
                }
            }
            Statement::While { condition, body } => {
                self.in_condition = true;
                self.fold(condition);
                self.in_condition = false;
                self.traverse_statement(body);
            }
            Statement::For {
                init,
                condition,
                step,
                body,
            } => {
                self.collect_loop_vars(init.as_ref());
                self.in_condition = true;
                match init {
                    Some(ForInit::Declarations(declarations)) => {
                        for declaration in declarations {
                            self.declaration(declaration);
                        }
                    }
                    Some(ForInit::Assignment(assignment)) => {
                        self.assignment(assignment);
                    }
                    None => {}
                }
                if let Some(condition) = condition {
                    self.fold(condition);
                }
                if let Some(step) = step {
                    self.assignment(step);
                }
                self.in_condition = false;
                self.traverse_statement(body);
            }
            // The folder never rewrites return values.
            Statement::Return(_) => {}
        }
    }

    fn declaration(&mut self, declaration: &mut Declaration) {
        let Some(init) = &mut declaration.init else { return };
        self.fold(init);
        if let Expression::Constant(constant) = init {
            if !self.loop_vars.contains(&declaration.name)
                && !self.assigned.contains(&declaration.name)
                && !self.in_condition
            {
                self.constants
                    .insert(declaration.name.clone(), constant.clone());
            }
        }
    }

    fn assignment(&mut self, assignment: &mut Assignment) {
        self.fold(&mut assignment.value);
        // From here on the name is never again eligible for substitution;
        // a stale value must not travel past this write.
        self.assigned.insert(assignment.target.clone());
        if let Expression::Constant(constant) = &assignment.value {
            if !self.loop_vars.contains(&assignment.target)
                && !self.in_condition
            {
                self.constants
                    .insert(assignment.target.clone(), constant.clone());
            }
        }
    }

    fn fold(&mut self, expr: &mut Expression) {
        match expr {
            Expression::Identifier(name) => {
                let substitution = (!self.in_condition
                    && !self.loop_vars.contains(name)
                    && !self.assigned.contains(name))
                .then(|| self.constants.get(name).cloned())
                .flatten();
                if let Some(constant) = substitution {
                    *expr = Expression::Constant(constant);
                }
            }
            Expression::Constant(_) => {}
            Expression::Binary { operator, lhs, rhs } => {
                self.fold(lhs);
                self.fold(rhs);
                let folded = if let (
                    Expression::Constant(lhs),
                    Expression::Constant(rhs),
                ) = (&**lhs, &**rhs)
                {
                    evaluate(*operator, lhs, rhs).ok()
                } else {
                    None
                };
                if let Some(constant) = folded {
                    *expr = Expression::Constant(constant);
                }
            }
        }
    }

    /// The set is never cleared mid-pass; a nested loop's counters stay
    /// excluded for the rest of the traversal.
    fn collect_loop_vars(&mut self, init: Option<&ForInit>) {
        match init {
            Some(ForInit::Declarations(declarations)) => {
                self.loop_vars.extend(
                    declarations.iter().map(|it| it.name.clone()),
                );
            }
            Some(ForInit::Assignment(assignment)) => {
                self.loop_vars.insert(assignment.target.clone());
            }
            None => {}
        }
    }
}

/// Why a constant expression was left unfolded.
enum EvalError {
    Overflow,
    DivisionByZero,
    MalformedLiteral,
}

fn evaluate(
    operator: BinaryOperator,
    lhs: &Constant,
    rhs: &Constant,
) -> Result<Constant, EvalError> {
    let lhs: i64 =
        lhs.value.parse().map_err(|_| EvalError::MalformedLiteral)?;
    let rhs: i64 =
        rhs.value.parse().map_err(|_| EvalError::MalformedLiteral)?;
    let result = match operator {
        BinaryOperator::Add => {
            lhs.checked_add(rhs).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Sub => {
            lhs.checked_sub(rhs).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Mul => {
            lhs.checked_mul(rhs).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Div => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs.checked_div(rhs).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Mod => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs.checked_rem(rhs).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Shl => shift_amount(rhs)
            .and_then(|amount| lhs.checked_shl(amount))
            .ok_or(EvalError::Overflow)?,
        BinaryOperator::Shr => shift_amount(rhs)
            .and_then(|amount| lhs.checked_shr(amount))
            .ok_or(EvalError::Overflow)?,
        BinaryOperator::Lt => i64::from(lhs < rhs),
        BinaryOperator::Gt => i64::from(lhs > rhs),
        BinaryOperator::Le => i64::from(lhs <= rhs),
        BinaryOperator::Ge => i64::from(lhs >= rhs),
        BinaryOperator::Eq => i64::from(lhs == rhs),
        BinaryOperator::Ne => i64::from(lhs != rhs),
    };
    Ok(Constant::int(result.to_string()))
}

fn shift_amount(amount: i64) -> Option<u32> {
    u32::try_from(amount).ok().filter(|amount| *amount < 64)
}

#[cfg(test)]
mod tests {
    use super::fold_constants;
    use crate::{
        ast::{Constant, Expression, Statement},
        optimization::testing,
    };

    fn declaration_init(statement: &Statement) -> &Expression {
        let Statement::Declaration(declaration) = statement else {
            panic!("expected a declaration, got {statement:?}");
        };
        declaration.init.as_ref().unwrap()
    }

    #[test]
    fn folds_literal_arithmetic() {
        let mut unit =
            testing::parse("int main() { int a = 2 + 3; return a; }");
        fold_constants(&mut unit);
        assert_eq!(
            *declaration_init(&testing::body(&unit)[0]),
            Expression::Constant(Constant::int("5")),
        );
    }

    #[test]
    fn propagates_known_constants() {
        let mut unit = testing::parse(
            "int main() { int a = 4; int b = a * 2; return b; }",
        );
        fold_constants(&mut unit);
        assert_eq!(
            *declaration_init(&testing::body(&unit)[1]),
            Expression::Constant(Constant::int("8")),
        );
    }

    #[test]
    fn reassignment_blocks_propagation() {
        let mut unit = testing::parse(
            "int main() { int a = 4; a = a + 1; int b = a * 2; return b; }",
        );
        fold_constants(&mut unit);
        // `a + 1` itself folds (`a` had not been reassigned yet), but `b`
        // must keep reading `a`.
        let Statement::Assignment(assignment) = &testing::body(&unit)[1]
        else {
            panic!("expected an assignment");
        };
        assert_eq!(
            assignment.value,
            Expression::Constant(Constant::int("5")),
        );
        assert!(matches!(
            declaration_init(&testing::body(&unit)[2]),
            Expression::Binary { .. },
        ));
    }

    #[test]
    fn conditions_are_not_substituted() {
        let mut unit = testing::parse(
            "int main() { int a = 1; if (a > 0) { return 1; } return 0; }",
        );
        fold_constants(&mut unit);
        let Statement::If { condition, .. } = &testing::body(&unit)[1] else {
            panic!("expected an `if`");
        };
        assert!(matches!(condition, Expression::Binary { .. }));
    }

    #[test]
    fn condition_arithmetic_still_folds() {
        let mut unit = testing::parse(
            "int main() { if (2 + 3 > 4) { return 1; } return 0; }",
        );
        fold_constants(&mut unit);
        let Statement::If { condition, .. } = &testing::body(&unit)[0] else {
            panic!("expected an `if`");
        };
        assert_eq!(*condition, Expression::Constant(Constant::int("1")));
    }

    #[test]
    fn loop_variables_are_excluded() {
        let mut unit = testing::parse(
            "int main() { for (int i = 0; i < 9; i++) { int x = i + 1; } return 0; }",
        );
        fold_constants(&mut unit);
        let Statement::For { body, .. } = &testing::body(&unit)[0] else {
            panic!("expected a `for`");
        };
        let Statement::Compound(block) = &**body else {
            panic!("expected a compound body");
        };
        // `i` never substitutes even though its declaration is constant.
        assert!(matches!(
            declaration_init(&block.statements[0]),
            Expression::Binary { .. },
        ));
    }

    #[test]
    fn division_by_zero_is_left_unfolded() {
        let mut unit =
            testing::parse("int main() { int a = 1 / 0; return a; }");
        fold_constants(&mut unit);
        assert!(matches!(
            declaration_init(&testing::body(&unit)[0]),
            Expression::Binary { .. },
        ));
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let mut unit = testing::parse(
            "int main() { int a = 4; a = a + 1; int b = a * 2; return b; }",
        );
        fold_constants(&mut unit);
        let snapshot = unit.clone();
        fold_constants(&mut unit);
        assert_eq!(unit, snapshot);
    }
}
