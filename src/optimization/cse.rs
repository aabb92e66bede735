use super::expr;
use crate::{
    ast::{Block, Expression, Statement, TranslationUnit, Visitor},
    generator::Generator,
};
use std::collections::{HashMap, HashSet};

/// Within each block independently, computes syntactically identical
/// declaration initializers once and reuses the value through a temporary.
/// Only declarations with binary-operation initializers are considered, and
/// only when everything the initializer reads was declared earlier in the
/// same block.
pub(super) fn eliminate_common_subexpressions(
    unit: &mut TranslationUnit,
    generator: &mut Generator,
) {
    CseVisitor { generator }.traverse_unit(unit);
}

struct CseVisitor<'a> {
    generator: &'a mut Generator,
}

impl Visitor for CseVisitor<'_> {
    fn visit_block(&mut self, block: &mut Block) {
        let mut temps_by_key: HashMap<String, String> = HashMap::new();
        let mut declared = HashSet::new();
        let mut statements = Vec::with_capacity(block.statements.len());
        for mut statement in block.statements.drain(..) {
            if let Statement::Declaration(declaration) = &mut statement {
                if let Some(init @ Expression::Binary { .. }) =
                    &mut declaration.init
                {
                    let known = expr::dependencies(init)
                        .iter()
                        .all(|name| declared.contains(name));
                    if known {
                        let key = expr::structural_key(init);
                        if let Some(temp) = temps_by_key.get(&key) {
                            *init = Expression::Identifier(temp.clone());
                        } else {
                            let temp = self.generator.temp_name();
                            temps_by_key.insert(key, temp.clone());
                            let shared = std::mem::replace(
                                init,
                                Expression::Identifier(temp.clone()),
                            );
                            statements.push(Statement::Declaration(
                                expr::temp_declaration(temp, shared),
                            ));
                        }
                    }
                }
                declared.insert(declaration.name.clone());
            }
            statements.push(statement);
        }
        block.statements = statements;
    }
}
