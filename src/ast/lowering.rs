use super::{
    Assignment, BinaryOperator, Block, Constant, Declaration, Expression,
    ForInit, Function, Parameter, Statement, TranslationUnit, Ty,
};
use crate::{
    diagnostics::{primary, span, Diagnostics},
    parser::{SyntaxKind, SyntaxNode},
    syntax,
};
use codemap::File;
use rowan::{ast::AstNode, TextRange};

/// All error reporting uses the `Diagnostics` struct. This typedef is only
/// used to make short-circuiting more convenient; a failed statement is
/// dropped from its block rather than aborting the lowering.
type Result<T> = std::result::Result<T, ()>;

pub fn lower(
    unit: SyntaxNode,
    file: &File,
    diagnostics: &mut Diagnostics,
) -> TranslationUnit {
    TranslationUnit::lower(
        &syntax::TranslationUnit::cast(unit).unwrap(),
        file,
        diagnostics,
    )
}

impl TranslationUnit {
    fn lower(
        ast: &syntax::TranslationUnit,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        Self {
            functions: ast
                .functions()
                .filter_map(|function| {
                    Function::lower(&function, file, diagnostics).ok()
                })
                .collect(),
        }
    }
}

impl Function {
    fn lower(
        ast: &syntax::Function,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let defined_here = || {
            [primary(
                span(file, ast.syntax().text_range()),
                "defined here",
            )]
        };

        let name = ast.name().ok_or_else(|| {
            diagnostics.error("function has no name", defined_here());
        })?;

        let parameters = ast
            .parameters()
            .filter_map(|parameter| {
                Some(Parameter {
                    name: parameter.name()?.text().to_owned(),
                    ty: Ty::Int,
                })
            })
            .collect();

        let body = ast.body().ok_or_else(|| {
            diagnostics.error("function has no body", defined_here());
        })?;

        Ok(Self {
            name: name.text().to_owned(),
            parameters,
            body: Block::lower(&body, file, diagnostics),
        })
    }
}

impl Block {
    fn lower(
        ast: &syntax::BlockStmt,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut statements = Vec::new();
        for statement in ast.statements() {
            // A declaration statement may carry several declarators; each
            // becomes its own statement.
            if let syntax::Statement::Declaration(declaration) = &statement {
                statements.extend(
                    declaration
                        .declarators()
                        .filter_map(|declarator| {
                            Declaration::lower(&declarator, file, diagnostics)
                                .ok()
                        })
                        .map(Statement::Declaration),
                );
            } else {
                statements.extend(
                    Statement::lower(&statement, file, diagnostics).ok(),
                );
            }
        }
        Self { statements }
    }
}

impl Statement {
    fn lower(
        ast: &syntax::Statement,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        match ast {
            syntax::Statement::Block(block) => {
                Ok(Self::Compound(Block::lower(block, file, diagnostics)))
            }
            syntax::Statement::Declaration(declaration) => {
                let mut declarators = declaration.declarators();
                let first = declarators.next().ok_or(())?;
                if declarators.next().is_some() {
                    diagnostics.error(
                        "declaration list is not allowed here",
                        [primary(
                            span(file, declaration.syntax().text_range()),
                            "",
                        )],
                    );
                }
                Declaration::lower(&first, file, diagnostics)
                    .map(Self::Declaration)
            }
            syntax::Statement::Assignment(assignment) => {
                Assignment::lower(assignment, file, diagnostics)
                    .map(Self::Assignment)
            }
            syntax::Statement::Increment(increment) => {
                Assignment::lower_increment(increment).map(Self::Assignment)
            }
            syntax::Statement::If(if_) => {
                let condition = Expression::lower_opt(
                    if_.condition(),
                    file,
                    diagnostics,
                    if_.syntax().text_range(),
                )?;
                let then = if_.then_branch().ok_or_else(|| {
                    diagnostics.error(
                        "`if` has no body",
                        [primary(span(file, if_.syntax().text_range()), "")],
                    );
                })?;
                let then = Self::lower(&then, file, diagnostics)?;
                let else_ = match if_.else_branch() {
                    Some(else_) => {
                        Some(Box::new(Self::lower(&else_, file, diagnostics)?))
                    }
                    None => None,
                };
                Ok(Self::If {
                    condition,
                    then: Box::new(then),
                    else_,
                })
            }
            syntax::Statement::While(while_) => {
                let condition = Expression::lower_opt(
                    while_.condition(),
                    file,
                    diagnostics,
                    while_.syntax().text_range(),
                )?;
                let body = while_.body().ok_or_else(|| {
                    diagnostics.error(
                        "`while` has no body",
                        [primary(
                            span(file, while_.syntax().text_range()),
                            "",
                        )],
                    );
                })?;
                Ok(Self::While {
                    condition,
                    body: Box::new(Self::lower(&body, file, diagnostics)?),
                })
            }
            syntax::Statement::For(for_) => {
                // A malformed init clause becomes `None`; loop-control
                // detection downstream simply skips it.
                let init = for_
                    .init()
                    .and_then(|init| ForInit::lower(&init, file, diagnostics));
                let condition = match for_.condition() {
                    Some(condition) => Some(Expression::lower(
                        &condition,
                        file,
                        diagnostics,
                    )?),
                    None => None,
                };
                let step = for_
                    .step()
                    .and_then(|step| lower_step(&step, file, diagnostics));
                let body = for_.body().ok_or_else(|| {
                    diagnostics.error(
                        "`for` has no body",
                        [primary(span(file, for_.syntax().text_range()), "")],
                    );
                })?;
                Ok(Self::For {
                    init,
                    condition,
                    step,
                    body: Box::new(Self::lower(&body, file, diagnostics)?),
                })
            }
            syntax::Statement::Return(return_) => match return_.value() {
                Some(value) => Expression::lower(&value, file, diagnostics)
                    .map(|value| Self::Return(Some(value))),
                None => Ok(Self::Return(None)),
            },
        }
    }
}

impl ForInit {
    fn lower(
        ast: &syntax::ForInit,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Option<Self> {
        if let Some(declaration) = ast.declaration() {
            let declarations = declaration
                .declarators()
                .filter_map(|declarator| {
                    Declaration::lower(&declarator, file, diagnostics).ok()
                })
                .collect::<Vec<_>>();
            (!declarations.is_empty()).then_some(Self::Declarations(declarations))
        } else if let Some(assignment) = ast.assignment() {
            Assignment::lower(&assignment, file, diagnostics)
                .ok()
                .map(Self::Assignment)
        } else if let Some(increment) = ast.increment() {
            Assignment::lower_increment(&increment)
                .ok()
                .map(Self::Assignment)
        } else {
            None
        }
    }
}

fn lower_step(
    ast: &syntax::ForStep,
    file: &File,
    diagnostics: &mut Diagnostics,
) -> Option<Assignment> {
    if let Some(assignment) = ast.assignment() {
        Assignment::lower(&assignment, file, diagnostics).ok()
    } else if let Some(increment) = ast.increment() {
        Assignment::lower_increment(&increment).ok()
    } else {
        None
    }
}

impl Declaration {
    fn lower(
        ast: &syntax::Declarator,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let name = ast.name().ok_or(())?;
        let init = match ast.value() {
            Some(value) => {
                Some(Expression::lower(&value, file, diagnostics)?)
            }
            None => None,
        };
        Ok(Self {
            name: name.text().to_owned(),
            ty: Ty::Int,
            init,
        })
    }
}

impl Assignment {
    fn lower(
        ast: &syntax::Assignment,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        Ok(Self {
            target: ast.target().ok_or(())?.text().to_owned(),
            value: Expression::lower_opt(
                ast.value(),
                file,
                diagnostics,
                ast.syntax().text_range(),
            )?,
        })
    }

    /// `i++` and `i--` have no tree node of their own; they lower to
    /// `i = i + 1` and `i = i - 1`.
    fn lower_increment(ast: &syntax::Increment) -> Result<Self> {
        let target = ast.target().ok_or(())?.text().to_owned();
        let operator = if ast.is_decrement() {
            BinaryOperator::Sub
        } else {
            BinaryOperator::Add
        };
        Ok(Self {
            value: Expression::Binary {
                operator,
                lhs: Box::new(Expression::Identifier(target.clone())),
                rhs: Box::new(Expression::Constant(Constant::int("1"))),
            },
            target,
        })
    }
}

impl Expression {
    fn lower_opt(
        ast: Option<syntax::Expression>,
        file: &File,
        diagnostics: &mut Diagnostics,
        fallback: TextRange,
    ) -> Result<Self> {
        match ast {
            Some(expression) => Self::lower(&expression, file, diagnostics),
            None => {
                diagnostics.error(
                    "missing expression",
                    [primary(span(file, fallback), "")],
                );
                Err(())
            }
        }
    }

    fn lower(
        ast: &syntax::Expression,
        file: &File,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        match ast {
            syntax::Expression::Literal(literal) => {
                let value = literal.value().ok_or(())?;
                let text = if literal.is_negative() {
                    format!("-{}", value.text())
                } else {
                    value.text().to_owned()
                };
                Ok(Self::Constant(Constant::int(text)))
            }
            syntax::Expression::NameRef(name_ref) => Ok(Self::Identifier(
                name_ref.identifier().ok_or(())?.text().to_owned(),
            )),
            syntax::Expression::Paren(paren) => Self::lower_opt(
                paren.inner(),
                file,
                diagnostics,
                paren.syntax().text_range(),
            ),
            syntax::Expression::Binary(binary) => {
                let operator = binary
                    .operator()
                    .and_then(|token| binary_operator(token.kind()))
                    .ok_or(())?;
                let lhs = Self::lower_opt(
                    binary.lhs(),
                    file,
                    diagnostics,
                    binary.syntax().text_range(),
                )?;
                let rhs = Self::lower_opt(
                    binary.rhs(),
                    file,
                    diagnostics,
                    binary.syntax().text_range(),
                )?;
                Ok(Self::Binary {
                    operator,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                })
            }
        }
    }
}

const fn binary_operator(kind: SyntaxKind) -> Option<BinaryOperator> {
    match kind {
        SyntaxKind::PLUS => Some(BinaryOperator::Add),
        SyntaxKind::MINUS => Some(BinaryOperator::Sub),
        SyntaxKind::STAR => Some(BinaryOperator::Mul),
        SyntaxKind::SLASH => Some(BinaryOperator::Div),
        SyntaxKind::PERCENT => Some(BinaryOperator::Mod),
        SyntaxKind::SHL => Some(BinaryOperator::Shl),
        SyntaxKind::SHR => Some(BinaryOperator::Shr),
        SyntaxKind::LT => Some(BinaryOperator::Lt),
        SyntaxKind::GT => Some(BinaryOperator::Gt),
        SyntaxKind::LE => Some(BinaryOperator::Le),
        SyntaxKind::GE => Some(BinaryOperator::Ge),
        SyntaxKind::EQ_EQ => Some(BinaryOperator::Eq),
        SyntaxKind::NE => Some(BinaryOperator::Ne),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::lower;
    use crate::{
        ast::{
            BinaryOperator, Constant, Expression, Statement,
            TranslationUnit,
        },
        diagnostics::Diagnostics,
        parser,
    };
    use codemap::CodeMap;

    fn lower_source(source_code: &str) -> (TranslationUnit, bool) {
        let mut code_map = CodeMap::new();
        let file =
            code_map.add_file("<test>".to_owned(), source_code.to_owned());
        let mut diagnostics = Diagnostics::default();
        let cst = parser::parse(&file, &mut diagnostics);
        let unit = lower(cst, &file, &mut diagnostics);
        (unit, diagnostics.has_errors())
    }

    #[test]
    fn increments_desugar_to_assignments() {
        let (unit, has_errors) = lower_source(
            "int main() { for (int i = 0; i < 9; i++) { } return 0; }",
        );
        assert!(!has_errors);
        let Statement::For { step, .. } = &unit.functions[0].body.statements[0]
        else {
            panic!("expected a `for`");
        };
        let step = step.as_ref().unwrap();
        assert_eq!(step.target, "i");
        assert_eq!(
            step.value,
            Expression::Binary {
                operator: BinaryOperator::Add,
                lhs: Box::new(Expression::Identifier("i".to_owned())),
                rhs: Box::new(Expression::Constant(Constant::int("1"))),
            },
        );
    }

    #[test]
    fn declarator_lists_split_into_statements() {
        let (unit, has_errors) = lower_source(
            "int main() { int a = 1, b = 2; return a + b; }",
        );
        assert!(!has_errors);
        let statements = &unit.functions[0].body.statements;
        assert_eq!(statements.len(), 3);
        for (statement, name) in statements.iter().zip(["a", "b"]) {
            let Statement::Declaration(declaration) = statement else {
                panic!("expected a declaration");
            };
            assert_eq!(declaration.name, name);
        }
    }

    #[test]
    fn negative_literals_keep_their_sign() {
        let (unit, has_errors) =
            lower_source("int main() { int a = -5; return a; }");
        assert!(!has_errors);
        let Statement::Declaration(declaration) =
            &unit.functions[0].body.statements[0]
        else {
            panic!("expected a declaration");
        };
        assert_eq!(
            declaration.init,
            Some(Expression::Constant(Constant::int("-5"))),
        );
    }

    #[test]
    fn malformed_input_reports_instead_of_panicking() {
        let (_, has_errors) = lower_source("int main() { int = 5; }");
        assert!(has_errors);
    }
}
