//! Renders the tree back into C source text.

use crate::ast::{
    Assignment, BinaryOperator, Block, Declaration, Expression, ForInit,
    Function, Statement, TranslationUnit, Ty,
};

pub fn render(unit: &TranslationUnit) -> String {
    let mut writer = Writer {
        out: String::new(),
        indent: 0,
    };
    for (index, function) in unit.functions.iter().enumerate() {
        if index > 0 {
            writer.out.push('\n');
        }
        writer.function(function);
    }
    writer.out
}

struct Writer {
    out: String,
    indent: usize,
}

impl Writer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn function(&mut self, function: &Function) {
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| format!("{} {}", parameter.ty, parameter.name))
            .collect::<Vec<_>>()
            .join(", ");
        self.line(&format!("int {}({parameters})", function.name));
        self.block(&function.body);
    }

    fn block(&mut self, block: &Block) {
        self.line("{");
        self.indent += 1;
        for statement in &block.statements {
            self.statement(statement);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Declaration(declaration) => {
                self.line(&format!("{};", declaration_text(declaration)));
            }
            Statement::Assignment(assignment) => {
                self.line(&format!("{};", assignment_text(assignment)));
            }
            Statement::Compound(block) => self.block(block),
            Statement::If {
                condition,
                then,
                else_,
            } => {
                self.line(&format!("if ({})", expression_text(condition)));
                self.body(then);
                if let Some(else_) = else_ {
                    self.line("else");
                    self.body(else_);
                }
            }
            Statement::While { condition, body } => {
                self.line(&format!("while ({})", expression_text(condition)));
                self.body(body);
            }
            Statement::For {
                init,
                condition,
                step,
                body,
            } => {
                let init = init.as_ref().map_or_else(String::new, init_text);
                let condition = condition
                    .as_ref()
                    .map(expression_text)
                    .unwrap_or_default();
                let step = step
                    .as_ref()
                    .map(assignment_text)
                    .unwrap_or_default();
                self.line(&format!("for ({init}; {condition}; {step})"));
                self.body(body);
            }
            Statement::Return(value) => match value {
                Some(value) => {
                    self.line(&format!("return {};", expression_text(value)));
                }
                None => self.line("return;"),
            },
        }
    }

    /// A loop or branch body: braces for a compound statement, an indented
    /// line for anything else.
    fn body(&mut self, statement: &Statement) {
        if let Statement::Compound(block) = statement {
            self.block(block);
        } else {
            self.indent += 1;
            self.statement(statement);
            self.indent -= 1;
        }
    }
}

fn init_text(init: &ForInit) -> String {
    match init {
        ForInit::Declarations(declarations) => {
            let ty = declarations.first().map_or(Ty::Int, |it| it.ty);
            let declarators = declarations
                .iter()
                .map(|declaration| match &declaration.init {
                    Some(init) => format!(
                        "{} = {}",
                        declaration.name,
                        expression_text(init)
                    ),
                    None => declaration.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{ty} {declarators}")
        }
        ForInit::Assignment(assignment) => assignment_text(assignment),
    }
}

fn declaration_text(declaration: &Declaration) -> String {
    match &declaration.init {
        Some(init) => format!(
            "{} {} = {}",
            declaration.ty,
            declaration.name,
            expression_text(init)
        ),
        None => format!("{} {}", declaration.ty, declaration.name),
    }
}

fn assignment_text(assignment: &Assignment) -> String {
    format!(
        "{} = {}",
        assignment.target,
        expression_text(&assignment.value)
    )
}

fn expression_text(expr: &Expression) -> String {
    match expr {
        Expression::Identifier(name) => name.clone(),
        Expression::Constant(constant) => constant.value.clone(),
        Expression::Binary { operator, lhs, rhs } => format!(
            "{} {operator} {}",
            operand_text(lhs, *operator, false),
            operand_text(rhs, *operator, true),
        ),
    }
}

/// Parenthesizes an operand when leaving it bare would change how the
/// expression parses back.
fn operand_text(
    expr: &Expression,
    parent: BinaryOperator,
    is_rhs: bool,
) -> String {
    let text = expression_text(expr);
    if let Expression::Binary { operator, .. } = expr {
        if operator.precedence() < parent.precedence()
            || (operator.precedence() == parent.precedence() && is_rhs)
        {
            return format!("({text})");
        }
    }
    text
}
