use crate::ast::{
    Assignment, Block, Expression, Statement, TranslationUnit, Visitor,
};
use std::collections::{HashSet, VecDeque};

/// Two phases, in order: collect every referenced name anywhere in the
/// tree, then rewrite each function body's statement sequence. The used
/// set is whole-program, not block-scoped; a name used anywhere keeps every
/// same-named declaration alive.
pub(super) fn remove_dead_code(unit: &mut TranslationUnit) {
    let mut finder = Finder {
        used: HashSet::new(),
    };
    finder.traverse_unit(unit);
    let used = finder.used;
    for function in &mut unit.functions {
        clean_block(&mut function.body, &used);
    }
}

struct Finder {
    used: HashSet<String>,
}

impl Visitor for Finder {
    fn visit_assignment(&mut self, assignment: &mut Assignment) {
        self.used.insert(assignment.target.clone());
    }

    fn visit_expression(&mut self, expr: &mut Expression) {
        if let Expression::Identifier(name) = expr {
            self.used.insert(name.clone());
        }
    }
}

fn clean_block(block: &mut Block, used: &HashSet<String>) {
    let mut pending: VecDeque<Statement> =
        block.statements.drain(..).collect();
    let mut kept = Vec::new();
    while let Some(statement) = pending.pop_front() {
        match statement {
            // `if (0)` disappears along with both branches; a compound
            // `if (1)` branch is spliced in place and rescanned, so a
            // spliced `return` still truncates the block.
            Statement::If {
                condition: Expression::Constant(condition),
                then,
                else_: _,
            } if condition.value == "0"
                || (condition.value == "1"
                    && matches!(*then, Statement::Compound(_))) =>
            {
                if condition.value == "1" {
                    if let Statement::Compound(branch) = *then {
                        for statement in
                            branch.statements.into_iter().rev()
                        {
                            pending.push_front(statement);
                        }
                    }
                }
            }
            Statement::While {
                condition: Expression::Constant(condition),
                ..
            } if condition.value == "0" => {}
            Statement::Declaration(declaration)
                if !used.contains(&declaration.name) => {}
            statement => {
                let is_return = matches!(statement, Statement::Return(_));
                kept.push(statement);
                if is_return {
                    break;
                }
            }
        }
    }
    block.statements = kept;
}
