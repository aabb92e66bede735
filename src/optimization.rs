//! The optimization pipeline. Passes run in a fixed order over the whole
//! tree, mutating it in place; each pass receives the tree its predecessor
//! left behind and there is no rollback.

mod constant_folding;
mod cse;
mod dce;
mod expr;
mod licm;
mod strength_reduction;

use crate::{ast::TranslationUnit, generator::Generator};

pub fn optimize(unit: &mut TranslationUnit) {
    let mut generator = Generator::default();
    constant_folding::fold_constants(unit);
    cse::eliminate_common_subexpressions(unit, &mut generator);
    strength_reduction::reduce_strength(unit);
    licm::hoist_loop_invariants(unit, &mut generator);
    dce::remove_dead_code(unit);
}
