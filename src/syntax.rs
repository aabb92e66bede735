#![allow(clippy::enum_glob_use)]

//! Typed wrappers over the raw syntax tree.

use crate::parser::{
    SyntaxKind::{self, *},
    SyntaxNode, SyntaxToken,
};
use rowan::ast::{support, AstNode};

macro_rules! ast_node {
    ($Name:ident: $kind:expr) => {
        pub struct $Name {
            syntax: SyntaxNode,
        }

        impl AstNode for $Name {
            type Language = crate::parser::Lang;

            fn can_cast(kind: SyntaxKind) -> bool {
                kind == $kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                if Self::can_cast(syntax.kind()) {
                    Some(Self { syntax })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(TranslationUnit: TRANSLATION_UNIT);

impl TranslationUnit {
    pub fn functions(&self) -> impl Iterator<Item = Function> {
        support::children(&self.syntax)
    }
}

ast_node!(Function: FUNCTION);

impl Function {
    pub fn name(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, IDENTIFIER)
    }

    pub fn parameters(&self) -> impl Iterator<Item = Param> {
        support::child::<ParamList>(&self.syntax)
            .into_iter()
            .flat_map(|list| support::children(&list.syntax))
    }

    pub fn body(&self) -> Option<BlockStmt> {
        support::child(&self.syntax)
    }
}

ast_node!(ParamList: PARAM_LIST);

ast_node!(Param: PARAM);

impl Param {
    pub fn name(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, IDENTIFIER)
    }
}

ast_node!(BlockStmt: BLOCK);

impl BlockStmt {
    pub fn statements(&self) -> impl Iterator<Item = Statement> {
        support::children(&self.syntax)
    }
}

ast_node!(Declaration: DECLARATION);

impl Declaration {
    pub fn declarators(&self) -> impl Iterator<Item = Declarator> {
        support::children(&self.syntax)
    }
}

ast_node!(Declarator: DECLARATOR);

impl Declarator {
    pub fn name(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, IDENTIFIER)
    }

    pub fn value(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

ast_node!(Assignment: ASSIGNMENT);

impl Assignment {
    pub fn target(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, IDENTIFIER)
    }

    pub fn value(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

ast_node!(Increment: INCREMENT);

impl Increment {
    pub fn target(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, IDENTIFIER)
    }

    pub fn is_decrement(&self) -> bool {
        support::token(&self.syntax, MINUS_MINUS).is_some()
    }
}

ast_node!(IfStmt: IF_STMT);

impl IfStmt {
    pub fn condition(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn then_branch(&self) -> Option<Statement> {
        support::children(&self.syntax).next()
    }

    pub fn else_branch(&self) -> Option<Statement> {
        support::children(&self.syntax).nth(1)
    }
}

ast_node!(WhileStmt: WHILE_STMT);

impl WhileStmt {
    pub fn condition(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn body(&self) -> Option<Statement> {
        support::children(&self.syntax).next()
    }
}

ast_node!(ForStmt: FOR_STMT);

impl ForStmt {
    pub fn init(&self) -> Option<ForInit> {
        support::child(&self.syntax)
    }

    /// The loop test. Clauses of the init and step are nested inside their
    /// own nodes, so this is the only direct expression child.
    pub fn condition(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn step(&self) -> Option<ForStep> {
        support::child(&self.syntax)
    }

    pub fn body(&self) -> Option<Statement> {
        support::child(&self.syntax)
    }
}

ast_node!(ForInit: FOR_INIT);

impl ForInit {
    pub fn declaration(&self) -> Option<Declaration> {
        support::child(&self.syntax)
    }

    pub fn assignment(&self) -> Option<Assignment> {
        support::child(&self.syntax)
    }

    pub fn increment(&self) -> Option<Increment> {
        support::child(&self.syntax)
    }
}

ast_node!(ForStep: FOR_STEP);

impl ForStep {
    pub fn assignment(&self) -> Option<Assignment> {
        support::child(&self.syntax)
    }

    pub fn increment(&self) -> Option<Increment> {
        support::child(&self.syntax)
    }
}

ast_node!(ReturnStmt: RETURN_STMT);

impl ReturnStmt {
    pub fn value(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

ast_node!(BinaryExpr: BINARY_EXPR);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<Expression> {
        support::children(&self.syntax).next()
    }

    pub fn rhs(&self) -> Option<Expression> {
        support::children(&self.syntax).nth(1)
    }

    pub fn operator(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(rowan::NodeOrToken::into_token)
            .find(|token| is_operator(token.kind()))
    }
}

const fn is_operator(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        PLUS | MINUS
            | STAR
            | SLASH
            | PERCENT
            | SHL
            | SHR
            | LT
            | GT
            | LE
            | GE
            | EQ_EQ
            | NE
    )
}

ast_node!(ParenExpr: PAREN_EXPR);

impl ParenExpr {
    pub fn inner(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}

ast_node!(Literal: LITERAL);

impl Literal {
    pub fn value(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, NUMBER)
    }

    pub fn is_negative(&self) -> bool {
        support::token(&self.syntax, MINUS).is_some()
    }
}

ast_node!(NameRef: NAME_REF);

impl NameRef {
    pub fn identifier(&self) -> Option<SyntaxToken> {
        support::token(&self.syntax, IDENTIFIER)
    }
}

pub enum Statement {
    Block(BlockStmt),
    Declaration(Declaration),
    Assignment(Assignment),
    Increment(Increment),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Return(ReturnStmt),
}

impl AstNode for Statement {
    type Language = crate::parser::Lang;

    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(
            kind,
            BLOCK
                | DECLARATION
                | ASSIGNMENT
                | INCREMENT
                | IF_STMT
                | WHILE_STMT
                | FOR_STMT
                | RETURN_STMT
        )
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            BLOCK => BlockStmt::cast(syntax).map(Self::Block),
            DECLARATION => Declaration::cast(syntax).map(Self::Declaration),
            ASSIGNMENT => Assignment::cast(syntax).map(Self::Assignment),
            INCREMENT => Increment::cast(syntax).map(Self::Increment),
            IF_STMT => IfStmt::cast(syntax).map(Self::If),
            WHILE_STMT => WhileStmt::cast(syntax).map(Self::While),
            FOR_STMT => ForStmt::cast(syntax).map(Self::For),
            RETURN_STMT => ReturnStmt::cast(syntax).map(Self::Return),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Block(it) => it.syntax(),
            Self::Declaration(it) => it.syntax(),
            Self::Assignment(it) => it.syntax(),
            Self::Increment(it) => it.syntax(),
            Self::If(it) => it.syntax(),
            Self::While(it) => it.syntax(),
            Self::For(it) => it.syntax(),
            Self::Return(it) => it.syntax(),
        }
    }
}

pub enum Expression {
    Binary(BinaryExpr),
    Paren(ParenExpr),
    Literal(Literal),
    NameRef(NameRef),
}

impl AstNode for Expression {
    type Language = crate::parser::Lang;

    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, BINARY_EXPR | PAREN_EXPR | LITERAL | NAME_REF)
    }

    fn cast(syntax: SyntaxNode) -> Option<Self> {
        match syntax.kind() {
            BINARY_EXPR => BinaryExpr::cast(syntax).map(Self::Binary),
            PAREN_EXPR => ParenExpr::cast(syntax).map(Self::Paren),
            LITERAL => Literal::cast(syntax).map(Self::Literal),
            NAME_REF => NameRef::cast(syntax).map(Self::NameRef),
            _ => None,
        }
    }

    fn syntax(&self) -> &SyntaxNode {
        match self {
            Self::Binary(it) => it.syntax(),
            Self::Paren(it) => it.syntax(),
            Self::Literal(it) => it.syntax(),
            Self::NameRef(it) => it.syntax(),
        }
    }
}
