#![allow(clippy::enum_glob_use)]

use crate::diagnostics::{primary, Diagnostics};
use codemap::Span;
use logos::Logos;
use rowan::{Checkpoint, GreenNodeBuilder};
use std::iter::Peekable;

pub fn parse(
    file: &codemap::File,
    diagnostics: &mut Diagnostics,
) -> SyntaxNode {
    let source_code = file.source();
    Parser {
        builder: GreenNodeBuilder::new(),
        iter: SyntaxKind::lexer(source_code)
            .spanned()
            .map(|(token, span)| Token {
                kind: token.unwrap_or(ERROR),
                text: &source_code[span.clone()],
                span: file.span.subspan(span.start as u64, span.end as u64),
            })
            .peekable(),
        span: file.span,
        diagnostics,
    }
    .parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Logos)]
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[repr(u16)]
pub enum SyntaxKind {
    EOF = 0,
    #[regex(r"(\p{Whitespace}|//[^\n]*|/\*[^*]*\*+([^/*][^*]*\*+)*/)+")]
    TRIVIA,

    TRANSLATION_UNIT,
    FUNCTION,
    PARAM_LIST,
    PARAM,
    BLOCK,
    DECLARATION,
    DECLARATOR,
    ASSIGNMENT,
    INCREMENT,
    IF_STMT,
    WHILE_STMT,
    FOR_STMT,
    FOR_INIT,
    FOR_STEP,
    RETURN_STMT,
    BINARY_EXPR,
    PAREN_EXPR,
    LITERAL,
    NAME_REF,

    #[token("{")]
    LBRACE,
    #[token("}")]
    RBRACE,
    #[token("(")]
    LPAREN,
    #[token(")")]
    RPAREN,
    #[token(";")]
    SEMICOLON,
    #[token(",")]
    COMMA,
    #[token("=")]
    EQ,
    #[token("+")]
    PLUS,
    #[token("-")]
    MINUS,
    #[token("*")]
    STAR,
    #[token("/")]
    SLASH,
    #[token("%")]
    PERCENT,
    #[token("<<")]
    SHL,
    #[token(">>")]
    SHR,
    #[token("<")]
    LT,
    #[token(">")]
    GT,
    #[token("<=")]
    LE,
    #[token(">=")]
    GE,
    #[token("==")]
    EQ_EQ,
    #[token("!=")]
    NE,
    #[token("++")]
    PLUS_PLUS,
    #[token("--")]
    MINUS_MINUS,

    #[token("int")]
    KW_INT,
    #[token("if")]
    KW_IF,
    #[token("else")]
    KW_ELSE,
    #[token("while")]
    KW_WHILE,
    #[token("for")]
    KW_FOR,
    #[token("return")]
    KW_RETURN,

    #[regex(r"[0-9]+")]
    NUMBER,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    IDENTIFIER,

    ERROR,
}

use SyntaxKind::*;

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {}

impl rowan::Language for Lang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= ERROR as u16);
        // SAFETY: `SyntaxKind` is `repr(u16)` and the assertion ensures that
        // `raw` is within range.
        unsafe { std::mem::transmute(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<Lang>;
pub type SyntaxToken = rowan::SyntaxToken<Lang>;

const fn binding_power(kind: SyntaxKind) -> Option<u8> {
    match kind {
        EQ_EQ | NE => Some(1),
        LT | GT | LE | GE => Some(2),
        SHL | SHR => Some(3),
        PLUS | MINUS => Some(4),
        STAR | SLASH | PERCENT => Some(5),
        _ => None,
    }
}

struct Token<'src> {
    kind: SyntaxKind,
    text: &'src str,
    span: Span,
}

struct Parser<'src, I: Iterator<Item = Token<'src>>> {
    builder: GreenNodeBuilder<'static>,
    iter: Peekable<I>,
    span: Span,
    diagnostics: &'src mut Diagnostics,
}

impl<'src, I: Iterator<Item = Token<'src>>> Parser<'src, I> {
    fn skip_trivia(&mut self) {
        while self.iter.peek().is_some_and(|token| token.kind == TRIVIA) {
            self.bump();
        }
    }

    fn peek(&mut self) -> SyntaxKind {
        self.skip_trivia();
        self.iter.peek().map_or(EOF, |token| token.kind)
    }

    fn peek_span(&mut self) -> Span {
        self.skip_trivia();
        self.iter.peek().map_or_else(
            || {
                let len = self.span.len();
                self.span.subspan(len, len)
            },
            |token| token.span,
        )
    }

    fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek() == kind
    }

    fn bump(&mut self) {
        if let Some(token) = self.iter.next() {
            self.builder.token(token.kind.into(), token.text);
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn checkpoint(&mut self) -> Checkpoint {
        self.skip_trivia();
        self.builder.checkpoint()
    }

    /// Wraps the next token in an error node so the tree stays complete.
    fn error(&mut self) {
        self.builder.start_node(ERROR.into());
        self.bump();
        self.builder.finish_node();
    }

    fn expect(&mut self, kind: SyntaxKind) -> Option<Span> {
        if self.at(kind) {
            let span = self.peek_span();
            self.bump();
            Some(span)
        } else {
            let span = self.peek_span();
            self.diagnostics
                .error("unexpected token", [primary(span, "")]);
            None
        }
    }

    fn parse(mut self) -> SyntaxNode {
        self.builder.start_node(TRANSLATION_UNIT.into());
        while !self.at(EOF) {
            self.parse_function();
        }
        self.builder.finish_node();
        SyntaxNode::new_root(self.builder.finish())
    }

    fn parse_function(&mut self) {
        if !self.at(KW_INT) {
            let span = self.peek_span();
            self.diagnostics.error(
                "expected function definition",
                [primary(span, "")],
            );
            self.error();
            return;
        }
        self.builder.start_node(FUNCTION.into());
        self.bump(); // KW_INT
        self.expect(IDENTIFIER);
        self.expect(LPAREN);
        self.parse_parameter_list();
        self.expect(RPAREN);
        if self.at(LBRACE) {
            self.parse_block();
        } else {
            let span = self.peek_span();
            self.diagnostics.error(
                "function has no body",
                [primary(span, "")],
            );
        }
        self.builder.finish_node();
    }

    fn parse_parameter_list(&mut self) {
        self.builder.start_node(PARAM_LIST.into());
        while self.at(KW_INT) {
            self.builder.start_node(PARAM.into());
            self.bump(); // KW_INT
            self.expect(IDENTIFIER);
            self.builder.finish_node();
            if !self.eat(COMMA) {
                break;
            }
        }
        self.builder.finish_node();
    }

    fn parse_block(&mut self) {
        self.builder.start_node(BLOCK.into());
        let lbrace_span = self.peek_span();
        self.bump(); // LBRACE
        loop {
            if self.eat(RBRACE) {
                break;
            }
            if self.at(EOF) {
                self.diagnostics
                    .error("unclosed block", [primary(lbrace_span, "")]);
                break;
            }
            self.parse_statement();
        }
        self.builder.finish_node();
    }

    fn parse_statement(&mut self) {
        match self.peek() {
            LBRACE => self.parse_block(),
            KW_INT => self.parse_declaration(true),
            IDENTIFIER => {
                self.parse_assignment_or_increment();
                self.expect(SEMICOLON);
            }
            KW_IF => self.parse_if(),
            KW_WHILE => self.parse_while(),
            KW_FOR => self.parse_for(),
            KW_RETURN => self.parse_return(),
            _ => {
                let span = self.peek_span();
                self.diagnostics.error(
                    "expected statement",
                    [primary(span, "")],
                );
                self.error();
            }
        }
    }

    fn parse_declaration(&mut self, terminated: bool) {
        self.builder.start_node(DECLARATION.into());
        self.bump(); // KW_INT
        loop {
            self.builder.start_node(DECLARATOR.into());
            self.expect(IDENTIFIER);
            if self.eat(EQ) {
                self.parse_expression();
            }
            self.builder.finish_node();
            if !self.eat(COMMA) {
                break;
            }
        }
        if terminated {
            self.expect(SEMICOLON);
        }
        self.builder.finish_node();
    }

    fn parse_assignment_or_increment(&mut self) {
        let checkpoint = self.checkpoint();
        self.bump(); // IDENTIFIER
        if self.at(PLUS_PLUS) || self.at(MINUS_MINUS) {
            self.builder.start_node_at(checkpoint, INCREMENT.into());
            self.bump();
        } else {
            self.builder.start_node_at(checkpoint, ASSIGNMENT.into());
            self.expect(EQ);
            self.parse_expression();
        }
        self.builder.finish_node();
    }

    fn parse_if(&mut self) {
        self.builder.start_node(IF_STMT.into());
        self.bump(); // KW_IF
        self.expect(LPAREN);
        self.parse_expression();
        self.expect(RPAREN);
        self.parse_statement();
        if self.eat(KW_ELSE) {
            self.parse_statement();
        }
        self.builder.finish_node();
    }

    fn parse_while(&mut self) {
        self.builder.start_node(WHILE_STMT.into());
        self.bump(); // KW_WHILE
        self.expect(LPAREN);
        self.parse_expression();
        self.expect(RPAREN);
        self.parse_statement();
        self.builder.finish_node();
    }

    fn parse_for(&mut self) {
        self.builder.start_node(FOR_STMT.into());
        self.bump(); // KW_FOR
        self.expect(LPAREN);
        if !self.at(SEMICOLON) {
            self.builder.start_node(FOR_INIT.into());
            match self.peek() {
                KW_INT => self.parse_declaration(false),
                IDENTIFIER => self.parse_assignment_or_increment(),
                _ => self.error(),
            }
            self.builder.finish_node();
        }
        self.expect(SEMICOLON);
        if !self.at(SEMICOLON) {
            self.parse_expression();
        }
        self.expect(SEMICOLON);
        if !self.at(RPAREN) {
            self.builder.start_node(FOR_STEP.into());
            match self.peek() {
                IDENTIFIER => self.parse_assignment_or_increment(),
                _ => self.error(),
            }
            self.builder.finish_node();
        }
        self.expect(RPAREN);
        self.parse_statement();
        self.builder.finish_node();
    }

    fn parse_return(&mut self) {
        self.builder.start_node(RETURN_STMT.into());
        self.bump(); // KW_RETURN
        if !self.at(SEMICOLON) {
            self.parse_expression();
        }
        self.expect(SEMICOLON);
        self.builder.finish_node();
    }

    fn parse_expression(&mut self) {
        self.parse_binary_expression(0);
    }

    fn parse_binary_expression(&mut self, minimum_binding_power: u8) {
        let checkpoint = self.checkpoint();
        self.parse_primary_expression();
        while let Some(power) = binding_power(self.peek()) {
            if power < minimum_binding_power {
                break;
            }
            self.builder.start_node_at(checkpoint, BINARY_EXPR.into());
            self.bump(); // the operator
            self.parse_binary_expression(power + 1);
            self.builder.finish_node();
        }
    }

    fn parse_primary_expression(&mut self) {
        match self.peek() {
            NUMBER => {
                self.builder.start_node(LITERAL.into());
                self.bump();
                self.builder.finish_node();
            }
            // Negative literals exist only in prefix position; there is no
            // general unary operator.
            MINUS => {
                self.builder.start_node(LITERAL.into());
                self.bump();
                if self.at(NUMBER) {
                    self.bump();
                } else {
                    let span = self.peek_span();
                    self.diagnostics.error(
                        "expected expression",
                        [primary(span, "")],
                    );
                }
                self.builder.finish_node();
            }
            IDENTIFIER => {
                self.builder.start_node(NAME_REF.into());
                self.bump();
                self.builder.finish_node();
            }
            LPAREN => {
                self.builder.start_node(PAREN_EXPR.into());
                self.bump();
                self.parse_expression();
                self.expect(RPAREN);
                self.builder.finish_node();
            }
            _ => {
                let span = self.peek_span();
                self.diagnostics.error(
                    "expected expression",
                    [primary(span, "")],
                );
                self.builder.start_node(ERROR.into());
                self.builder.finish_node();
            }
        }
    }
}
