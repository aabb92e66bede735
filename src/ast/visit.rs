use super::{
    Assignment, Block, Expression, ForInit, Statement, TranslationUnit,
};

/// Define a struct, implement this trait, override some `visit_*` methods and
/// traverse the tree.
pub trait Visitor {
    fn visit_block(&mut self, _block: &mut Block) {}

    fn visit_statement(&mut self, _statement: &mut Statement) {}

    fn visit_assignment(&mut self, _assignment: &mut Assignment) {}

    fn visit_expression(&mut self, _expr: &mut Expression) {}

    fn traverse_unit(&mut self, unit: &mut TranslationUnit) {
        for function in &mut unit.functions {
            self.traverse_block(&mut function.body);
        }
    }

    fn traverse_block(&mut self, block: &mut Block) {
        self.visit_block(block);
        for statement in &mut block.statements {
            self.traverse_statement(statement);
        }
    }

    fn traverse_statement(&mut self, statement: &mut Statement) {
        self.visit_statement(statement);
        match statement {
            Statement::Declaration(declaration) => {
                if let Some(init) = &mut declaration.init {
                    self.traverse_expression(init);
                }
            }
            Statement::Assignment(assignment) => {
                self.traverse_assignment(assignment);
            }
            Statement::Compound(block) => self.traverse_block(block),
            Statement::If {
                condition,
                then,
                else_,
            } => {
                self.traverse_expression(condition);
                self.traverse_statement(then);
                if let Some(else_) = else_ {
                    self.traverse_statement(else_);
                }
            }
            Statement::While { condition, body } => {
                self.traverse_expression(condition);
                self.traverse_statement(body);
            }
            Statement::For {
                init,
                condition,
                step,
                body,
            } => {
                match init {
                    Some(ForInit::Declarations(declarations)) => {
                        for declaration in declarations {
                            if let Some(init) = &mut declaration.init {
                                self.traverse_expression(init);
                            }
                        }
                    }
                    Some(ForInit::Assignment(assignment)) => {
                        self.traverse_assignment(assignment);
                    }
                    None => {}
                }
                if let Some(condition) = condition {
                    self.traverse_expression(condition);
                }
                if let Some(step) = step {
                    self.traverse_assignment(step);
                }
                self.traverse_statement(body);
            }
            Statement::Return(value) => {
                if let Some(value) = value {
                    self.traverse_expression(value);
                }
            }
        }
    }

    fn traverse_assignment(&mut self, assignment: &mut Assignment) {
        self.visit_assignment(assignment);
        self.traverse_expression(&mut assignment.value);
    }

    fn traverse_expression(&mut self, expr: &mut Expression) {
        self.visit_expression(expr);
        if let Expression::Binary { lhs, rhs, .. } = expr {
            self.traverse_expression(lhs);
            self.traverse_expression(rhs);
        }
    }
}
