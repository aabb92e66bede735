use crate::ast::{
    BinaryOperator, Constant, Expression, TranslationUnit, Visitor,
};

/// Rewrites multiplication and division of an identifier by a positive
/// power of two into a shift, keeping the variable on the left.
pub(super) fn reduce_strength(unit: &mut TranslationUnit) {
    Reducer.traverse_unit(unit);
}

struct Reducer;

impl Visitor for Reducer {
    fn traverse_expression(&mut self, expr: &mut Expression) {
        // Post-order: normalize the operands before the operation itself.
        if let Expression::Binary { lhs, rhs, .. } = expr {
            self.traverse_expression(lhs);
            self.traverse_expression(rhs);
        }
        reduce(expr);
    }
}

fn reduce(expr: &mut Expression) {
    let Expression::Binary { operator, lhs, rhs } = expr else { return };
    if !matches!(*operator, BinaryOperator::Mul | BinaryOperator::Div) {
        return;
    }
    let (swapped, constant) = match (&**lhs, &**rhs) {
        (Expression::Identifier(_), Expression::Constant(constant)) => {
            (false, constant)
        }
        (Expression::Constant(constant), Expression::Identifier(_)) => {
            (true, constant)
        }
        _ => return,
    };
    let Ok(value) = constant.value.parse::<i64>() else { return };
    if value <= 0 || value & (value - 1) != 0 {
        return;
    }
    let shift = value.trailing_zeros();
    *operator = if matches!(*operator, BinaryOperator::Mul) {
        BinaryOperator::Shl
    } else {
        BinaryOperator::Shr
    };
    if swapped {
        std::mem::swap(lhs, rhs);
    }
    **rhs = Expression::Constant(Constant::int(shift.to_string()));
}

#[cfg(test)]
mod tests {
    use super::reduce_strength;
    use crate::{
        ast::{BinaryOperator, Constant, Expression, Statement},
        optimization::testing,
    };

    fn declaration_init(statement: &Statement) -> &Expression {
        let Statement::Declaration(declaration) = statement else {
            panic!("expected a declaration, got {statement:?}");
        };
        declaration.init.as_ref().unwrap()
    }

    #[test]
    fn multiplication_becomes_a_left_shift() {
        let mut unit =
            testing::parse("int f(int x) { int y = x * 8; return y; }");
        reduce_strength(&mut unit);
        assert_eq!(
            *declaration_init(&testing::body(&unit)[0]),
            Expression::Binary {
                operator: BinaryOperator::Shl,
                lhs: Box::new(Expression::Identifier("x".to_owned())),
                rhs: Box::new(Expression::Constant(Constant::int("3"))),
            },
        );
    }

    #[test]
    fn constant_on_the_left_is_swapped_into_place() {
        let mut unit =
            testing::parse("int f(int x) { int y = 8 * x; return y; }");
        reduce_strength(&mut unit);
        assert_eq!(
            *declaration_init(&testing::body(&unit)[0]),
            Expression::Binary {
                operator: BinaryOperator::Shl,
                lhs: Box::new(Expression::Identifier("x".to_owned())),
                rhs: Box::new(Expression::Constant(Constant::int("3"))),
            },
        );
    }

    #[test]
    fn division_becomes_a_right_shift() {
        let mut unit =
            testing::parse("int f(int x) { int y = x / 4; return y; }");
        reduce_strength(&mut unit);
        assert_eq!(
            *declaration_init(&testing::body(&unit)[0]),
            Expression::Binary {
                operator: BinaryOperator::Shr,
                lhs: Box::new(Expression::Identifier("x".to_owned())),
                rhs: Box::new(Expression::Constant(Constant::int("2"))),
            },
        );
    }

    #[test]
    fn non_powers_of_two_are_left_alone() {
        let mut unit =
            testing::parse("int f(int x) { int y = x * 6; return y; }");
        reduce_strength(&mut unit);
        assert_eq!(
            *declaration_init(&testing::body(&unit)[0]),
            Expression::Binary {
                operator: BinaryOperator::Mul,
                lhs: Box::new(Expression::Identifier("x".to_owned())),
                rhs: Box::new(Expression::Constant(Constant::int("6"))),
            },
        );
    }

    #[test]
    fn nested_operations_are_normalized() {
        let mut unit = testing::parse(
            "int f(int x, int z) { return x * 8 + z * 4; }",
        );
        reduce_strength(&mut unit);
        let Statement::Return(Some(Expression::Binary { lhs, rhs, .. })) =
            &testing::body(&unit)[0]
        else {
            panic!("expected a return with a binary value");
        };
        assert!(matches!(
            &**lhs,
            Expression::Binary { operator: BinaryOperator::Shl, .. },
        ));
        assert!(matches!(
            &**rhs,
            Expression::Binary { operator: BinaryOperator::Shl, .. },
        ));
    }
}
