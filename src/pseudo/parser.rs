//! Pseudocode parser - recursive descent over the flat token stream
//!
//! One parsing function per precedence tier. The parser distinguishes probe
//! operations (`check*`, consume a match if present) from expect operations
//! (`expect*`, consume or fail) and aborts on the first malformed construct.

use std::fmt;

use tracing::debug;

use crate::error::SyntaxError;
use crate::pseudo::lexer::{Keyword, Token, TokenKind, TypeName};

/// Declared type of a variable or array element. `INTEGER`/`REAL` collapse
/// to `Number`, `STRING`/`CHAR` to `Text`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    Number,
    Text,
    Boolean,
}

impl DeclaredType {
    pub fn from_type_name(name: TypeName) -> Self {
        match name {
            TypeName::Integer | TypeName::Real => DeclaredType::Number,
            TypeName::Char | TypeName::String => DeclaredType::Text,
            TypeName::Boolean => DeclaredType::Boolean,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Number => write!(f, "number"),
            DeclaredType::Text => write!(f, "text"),
            DeclaredType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Expression types
#[derive(Clone, Debug)]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// String or char literal
    String(String),
    /// Boolean literal
    Boolean(bool),
    /// Variable reference
    Variable(String),
    /// Array element access: name[index]
    ArrayAccess(String, Box<Expr>),
    /// Binary operation
    BinaryOp(Box<Expr>, BinOp, Box<Expr>),
    /// Unary operation
    UnaryOp(UnaryOp, Box<Expr>),
}

/// Binary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Eq => "=",
            BinOp::Ne => "<>",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        };
        write!(f, "{}", symbol)
    }
}

/// Unary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOp::Pos => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "NOT",
        };
        write!(f, "{}", symbol)
    }
}

/// Statement types
#[derive(Clone, Debug)]
pub enum Stmt {
    /// DECLARE name : type
    VarDecl {
        name: String,
        declared_type: DeclaredType,
    },

    /// DECLARE name : ARRAY[lower:upper] OF type
    ArrayDecl {
        name: String,
        element_type: DeclaredType,
        lower: Expr,
        upper: Expr,
    },

    /// name <- expr
    Assign { name: String, value: Expr },

    /// name[index] <- expr
    ArrayAssign {
        name: String,
        index: Expr,
        value: Expr,
    },

    /// IF/THEN/ELSE/ENDIF
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },

    /// WHILE/ENDWHILE loop
    While { condition: Expr, body: Vec<Stmt> },

    /// FOR/NEXT loop
    For {
        var: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },

    /// OUTPUT statement
    Output(Expr),
}

/// Parser for the pseudocode grammar
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    /// Consume the next token if it equals `kind` (probe; never errors).
    fn check(&mut self, kind: &TokenKind) -> bool {
        if self.peek().map(|t| &t.kind) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn check_keyword(&mut self, keyword: Keyword) -> bool {
        self.check(&TokenKind::Keyword(keyword))
    }

    /// Consume the next token, requiring it to equal `kind`.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), SyntaxError> {
        match self.peek() {
            Some(t) if t.kind == *kind => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(SyntaxError::UnexpectedToken {
                expected: kind.to_string(),
                found: t.kind.to_string(),
                line: t.line,
                column: t.column,
            }),
            None => Err(SyntaxError::UnexpectedEnd {
                expected: kind.to_string(),
            }),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), SyntaxError> {
        self.expect(&TokenKind::Keyword(keyword))
    }

    fn expect_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            Some(t) => Err(SyntaxError::UnexpectedToken {
                expected: "identifier".to_string(),
                found: t.kind.to_string(),
                line: t.line,
                column: t.column,
            }),
            None => Err(SyntaxError::UnexpectedEnd {
                expected: "identifier".to_string(),
            }),
        }
    }

    fn expect_type_name(&mut self) -> Result<TypeName, SyntaxError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::TypeName(name),
                ..
            }) => {
                let name = *name;
                self.pos += 1;
                Ok(name)
            }
            Some(t) => Err(SyntaxError::UnexpectedToken {
                expected: "type name".to_string(),
                found: t.kind.to_string(),
                line: t.line,
                column: t.column,
            }),
            None => Err(SyntaxError::UnexpectedEnd {
                expected: "type name".to_string(),
            }),
        }
    }

    /// Build an error for an unexpected token at the current position.
    fn unexpected(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(t) => SyntaxError::UnexpectedToken {
                expected: expected.to_string(),
                found: t.kind.to_string(),
                line: t.line,
                column: t.column,
            },
            None => SyntaxError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    /// Parse the entire program
    pub fn parse(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut statements = Vec::new();
        while self.pos < self.tokens.len() {
            statements.push(self.parse_statement()?);
        }
        debug!(statements = statements.len(), "parse complete");
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, SyntaxError> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Keyword(Keyword::Declare)) => self.parse_declaration(),
            Some(TokenKind::Identifier(_)) => self.parse_assignment(),
            Some(TokenKind::Keyword(Keyword::If)) => self.parse_if(),
            Some(TokenKind::Keyword(Keyword::While)) => self.parse_while(),
            Some(TokenKind::Keyword(Keyword::For)) => self.parse_for(),
            Some(TokenKind::Keyword(Keyword::Output)) => self.parse_output(),
            Some(_) => Err(self.unexpected("statement")),
            None => Err(SyntaxError::UnexpectedEnd {
                expected: "statement".to_string(),
            }),
        }
    }

    fn parse_declaration(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::Declare)?;
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::Colon)?;

        if self.check_keyword(Keyword::Array) {
            self.expect(&TokenKind::LeftBracket)?;
            let lower = self.parse_expression()?;
            self.expect(&TokenKind::Colon)?;
            let upper = self.parse_expression()?;
            self.expect(&TokenKind::RightBracket)?;
            self.expect_keyword(Keyword::Of)?;
            let element_type = DeclaredType::from_type_name(self.expect_type_name()?);
            Ok(Stmt::ArrayDecl {
                name,
                element_type,
                lower,
                upper,
            })
        } else {
            let declared_type = DeclaredType::from_type_name(self.expect_type_name()?);
            Ok(Stmt::VarDecl {
                name,
                declared_type,
            })
        }
    }

    fn parse_assignment(&mut self) -> Result<Stmt, SyntaxError> {
        let name = self.expect_identifier()?;

        if self.check(&TokenKind::LeftBracket) {
            let index = self.parse_expression()?;
            self.expect(&TokenKind::RightBracket)?;
            self.expect(&TokenKind::Assign)?;
            let value = self.parse_expression()?;
            Ok(Stmt::ArrayAssign { name, index, value })
        } else {
            self.expect(&TokenKind::Assign)?;
            let value = self.parse_expression()?;
            Ok(Stmt::Assign { name, value })
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::If)?;
        let condition = self.parse_expression()?;
        self.expect_keyword(Keyword::Then)?;

        let mut then_branch = Vec::new();
        loop {
            if self.check_keyword(Keyword::EndIf) {
                return Ok(Stmt::If {
                    condition,
                    then_branch,
                    else_branch: None,
                });
            }
            if self.check_keyword(Keyword::Else) {
                break;
            }
            if self.peek().is_none() {
                return Err(SyntaxError::UnexpectedEnd {
                    expected: "'ENDIF'".to_string(),
                });
            }
            then_branch.push(self.parse_statement()?);
        }

        let mut else_branch = Vec::new();
        while !self.check_keyword(Keyword::EndIf) {
            if self.peek().is_none() {
                return Err(SyntaxError::UnexpectedEnd {
                    expected: "'ENDIF'".to_string(),
                });
            }
            else_branch.push(self.parse_statement()?);
        }

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch: Some(else_branch),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::While)?;
        let condition = self.parse_expression()?;

        let mut body = Vec::new();
        while !self.check_keyword(Keyword::EndWhile) {
            if self.peek().is_none() {
                return Err(SyntaxError::UnexpectedEnd {
                    expected: "'ENDWHILE'".to_string(),
                });
            }
            body.push(self.parse_statement()?);
        }

        Ok(Stmt::While { condition, body })
    }

    fn parse_for(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::For)?;
        let var = self.expect_identifier()?;
        self.expect(&TokenKind::Assign)?;
        let start = self.parse_expression()?;
        self.expect_keyword(Keyword::To)?;
        let end = self.parse_expression()?;

        let step = if self.check_keyword(Keyword::Step) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let mut body = Vec::new();
        while !self.check_keyword(Keyword::Next) {
            if self.peek().is_none() {
                return Err(SyntaxError::UnexpectedEnd {
                    expected: "'NEXT'".to_string(),
                });
            }
            body.push(self.parse_statement()?);
        }

        // The closing NEXT must name the loop variable.
        let counter = match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                line,
                column,
            }) => {
                let counter = (name.clone(), *line, *column);
                self.pos += 1;
                counter
            }
            Some(t) => {
                return Err(SyntaxError::UnexpectedToken {
                    expected: "identifier".to_string(),
                    found: t.kind.to_string(),
                    line: t.line,
                    column: t.column,
                })
            }
            None => {
                return Err(SyntaxError::UnexpectedEnd {
                    expected: "identifier".to_string(),
                })
            }
        };
        if counter.0 != var {
            return Err(SyntaxError::MismatchedNext {
                expected: var,
                found: counter.0,
                line: counter.1,
                column: counter.2,
            });
        }

        Ok(Stmt::For {
            var,
            start,
            end,
            step,
            body,
        })
    }

    fn parse_output(&mut self) -> Result<Stmt, SyntaxError> {
        self.expect_keyword(Keyword::Output)?;
        let expr = self.parse_expression()?;
        Ok(Stmt::Output(expr))
    }

    /// Parse an expression
    pub fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_comparison()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Equal) => BinOp::Eq,
                Some(TokenKind::NotEqual) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_comparison()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_additive()?;

        loop {
            // AND and OR share this tier with the relational operators;
            // there is no dedicated logical tier.
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Less) => BinOp::Lt,
                Some(TokenKind::Greater) => BinOp::Gt,
                Some(TokenKind::LessEqual) => BinOp::Le,
                Some(TokenKind::GreaterEqual) => BinOp::Ge,
                Some(TokenKind::Keyword(Keyword::And)) => BinOp::And,
                Some(TokenKind::Keyword(Keyword::Or)) => BinOp::Or,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Expr::BinaryOp(Box::new(left), op, Box::new(right));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Keyword(Keyword::Not)) => Some(UnaryOp::Not),
            Some(TokenKind::Plus) => Some(UnaryOp::Pos),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            _ => None,
        };

        if let Some(op) = op {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(Expr::UnaryOp(op, Box::new(operand)));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Number(n)) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            Some(TokenKind::String(s)) => {
                self.pos += 1;
                Ok(Expr::String(s))
            }
            Some(TokenKind::Char(c)) => {
                self.pos += 1;
                Ok(Expr::String(c))
            }
            Some(TokenKind::Boolean(b)) => {
                self.pos += 1;
                Ok(Expr::Boolean(b))
            }
            Some(TokenKind::Identifier(name)) => {
                self.pos += 1;
                if self.check(&TokenKind::LeftBracket) {
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RightBracket)?;
                    Ok(Expr::ArrayAccess(name, Box::new(index)))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Some(TokenKind::LeftParen) => {
                self.pos += 1;
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            Some(_) => Err(self.unexpected("expression")),
            None => Err(SyntaxError::UnexpectedEnd {
                expected: "expression".to_string(),
            }),
        }
    }
}

/// Render an indented tree dump of a parsed program.
pub fn dump_program(program: &[Stmt]) -> String {
    let mut out = String::new();
    out.push_str("Program\n");
    for stmt in program {
        dump_stmt(stmt, "  ", &mut out);
    }
    out
}

fn dump_stmt(stmt: &Stmt, prefix: &str, out: &mut String) {
    let nested = format!("{}  ", prefix);
    match stmt {
        Stmt::VarDecl {
            name,
            declared_type,
        } => {
            out.push_str(&format!("{}VarDecl {} : {}\n", prefix, name, declared_type));
        }
        Stmt::ArrayDecl {
            name,
            element_type,
            lower,
            upper,
        } => {
            out.push_str(&format!("{}ArrayDecl {} : {}\n", prefix, name, element_type));
            dump_expr(lower, &nested, out);
            dump_expr(upper, &nested, out);
        }
        Stmt::Assign { name, value } => {
            out.push_str(&format!("{}Assign {}\n", prefix, name));
            dump_expr(value, &nested, out);
        }
        Stmt::ArrayAssign { name, index, value } => {
            out.push_str(&format!("{}AssignIndex {}\n", prefix, name));
            dump_expr(index, &nested, out);
            dump_expr(value, &nested, out);
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push_str(&format!("{}If\n", prefix));
            dump_expr(condition, &nested, out);
            for stmt in then_branch {
                dump_stmt(stmt, &nested, out);
            }
            if let Some(else_branch) = else_branch {
                out.push_str(&format!("{}Else\n", prefix));
                for stmt in else_branch {
                    dump_stmt(stmt, &nested, out);
                }
            }
        }
        Stmt::While { condition, body } => {
            out.push_str(&format!("{}While\n", prefix));
            dump_expr(condition, &nested, out);
            for stmt in body {
                dump_stmt(stmt, &nested, out);
            }
        }
        Stmt::For {
            var,
            start,
            end,
            step,
            body,
        } => {
            out.push_str(&format!("{}For {}\n", prefix, var));
            dump_expr(start, &nested, out);
            dump_expr(end, &nested, out);
            if let Some(step) = step {
                dump_expr(step, &nested, out);
            }
            for stmt in body {
                dump_stmt(stmt, &nested, out);
            }
        }
        Stmt::Output(expr) => {
            out.push_str(&format!("{}Output\n", prefix));
            dump_expr(expr, &nested, out);
        }
    }
}

fn dump_expr(expr: &Expr, prefix: &str, out: &mut String) {
    let nested = format!("{}  ", prefix);
    match expr {
        Expr::Number(n) => out.push_str(&format!("{}Number {}\n", prefix, n)),
        Expr::String(s) => out.push_str(&format!("{}String \"{}\"\n", prefix, s)),
        Expr::Boolean(b) => out.push_str(&format!("{}Boolean {}\n", prefix, b)),
        Expr::Variable(name) => out.push_str(&format!("{}Variable {}\n", prefix, name)),
        Expr::ArrayAccess(name, index) => {
            out.push_str(&format!("{}Index {}\n", prefix, name));
            dump_expr(index, &nested, out);
        }
        Expr::BinaryOp(lhs, op, rhs) => {
            out.push_str(&format!("{}Binary {}\n", prefix, op));
            dump_expr(lhs, &nested, out);
            dump_expr(rhs, &nested, out);
        }
        Expr::UnaryOp(op, operand) => {
            out.push_str(&format!("{}Unary {}\n", prefix, op));
            dump_expr(operand, &nested, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pseudo::lexer::Lexer;

    fn parse_source(source: &str) -> Result<Vec<Stmt>, SyntaxError> {
        let tokens = Lexer::new(source).tokenize().expect("should scan");
        Parser::new(tokens).parse()
    }

    fn parse_expr_source(source: &str) -> Expr {
        let tokens = Lexer::new(source).tokenize().expect("should scan");
        let mut parser = Parser::new(tokens);
        parser.parse_expression().expect("should parse")
    }

    #[test]
    fn test_var_declaration() {
        let program = parse_source("DECLARE x : INTEGER").expect("should parse");
        assert!(matches!(
            &program[0],
            Stmt::VarDecl { name, declared_type: DeclaredType::Number } if name == "x"
        ));
    }

    #[test]
    fn test_array_declaration() {
        let program = parse_source("DECLARE a : ARRAY[1:10] OF STRING").expect("should parse");
        assert!(matches!(
            &program[0],
            Stmt::ArrayDecl { name, element_type: DeclaredType::Text, .. } if name == "a"
        ));
    }

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        let expr = parse_expr_source("2 + 3 * 4");
        // (2 + (3 * 4))
        match expr {
            Expr::BinaryOp(lhs, BinOp::Add, rhs) => {
                assert!(matches!(*lhs, Expr::Number(n) if n == 2.0));
                assert!(matches!(*rhs, Expr::BinaryOp(_, BinOp::Mul, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_and_shares_the_relational_tier() {
        // AND binds as tightly as '<', so this is (((1 < 2) AND 3) < 4).
        let expr = parse_expr_source("1 < 2 AND 3 < 4");
        match expr {
            Expr::BinaryOp(lhs, BinOp::Lt, rhs) => {
                assert!(matches!(*lhs, Expr::BinaryOp(_, BinOp::And, _)));
                assert!(matches!(*rhs, Expr::Number(n) if n == 4.0));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_equality_binds_looser_than_or() {
        // ((x = (1 OR y)) = 2)
        let expr = parse_expr_source("x = 1 OR y = 2");
        match expr {
            Expr::BinaryOp(lhs, BinOp::Eq, rhs) => {
                assert!(matches!(*rhs, Expr::Number(n) if n == 2.0));
                match *lhs {
                    Expr::BinaryOp(_, BinOp::Eq, inner) => {
                        assert!(matches!(*inner, Expr::BinaryOp(_, BinOp::Or, _)));
                    }
                    other => panic!("unexpected tree: {:?}", other),
                }
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_unary_chain_and_parens() {
        let expr = parse_expr_source("NOT (x < -1)");
        match expr {
            Expr::UnaryOp(UnaryOp::Not, operand) => match *operand {
                Expr::BinaryOp(_, BinOp::Lt, rhs) => {
                    assert!(matches!(*rhs, Expr::UnaryOp(UnaryOp::Neg, _)));
                }
                other => panic!("unexpected tree: {:?}", other),
            },
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_if_with_else() {
        let program =
            parse_source("IF x > 1 THEN OUTPUT \"a\" ELSE OUTPUT \"b\" ENDIF").expect("should parse");
        match &program[0] {
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert_eq!(then_branch.len(), 1);
                assert_eq!(else_branch.as_ref().map(|b| b.len()), Some(1));
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_for_defaults_step() {
        let program = parse_source("FOR i <- 1 TO 10 OUTPUT i NEXT i").expect("should parse");
        match &program[0] {
            Stmt::For { var, step, body, .. } => {
                assert_eq!(var, "i");
                assert!(step.is_none());
                assert_eq!(body.len(), 1);
            }
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_for_with_step() {
        let program = parse_source("FOR i <- 1 TO 10 STEP 2 OUTPUT i NEXT i").expect("should parse");
        match &program[0] {
            Stmt::For { step, .. } => assert!(step.is_some()),
            other => panic!("unexpected statement: {:?}", other),
        }
    }

    #[test]
    fn test_next_identifier_must_match() {
        let err = parse_source("FOR i <- 1 TO 3 OUTPUT i NEXT j").unwrap_err();
        assert!(matches!(
            err,
            SyntaxError::MismatchedNext { expected, found, .. }
                if expected == "i" && found == "j"
        ));
    }

    #[test]
    fn test_missing_endif() {
        let err = parse_source("IF TRUE THEN OUTPUT 1").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnexpectedEnd {
                expected: "'ENDIF'".to_string()
            }
        );
    }

    #[test]
    fn test_reserved_keywords_are_not_statements() {
        let err = parse_source("CALL doit").unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedToken { expected, .. } if expected == "statement"));
    }

    #[test]
    fn test_error_carries_position() {
        let err = parse_source("DECLARE x INTEGER").unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnexpectedToken {
                expected: "':'".to_string(),
                found: "'INTEGER'".to_string(),
                line: 1,
                column: 11,
            }
        );
    }

    #[test]
    fn test_dump_shapes_the_tree() {
        let program = parse_source("DECLARE x : INTEGER\nx <- 2 + 3").expect("should parse");
        let dump = dump_program(&program);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "Program");
        assert_eq!(lines[1], "  VarDecl x : number");
        assert_eq!(lines[2], "  Assign x");
        assert_eq!(lines[3], "    Binary +");
        assert_eq!(lines[4], "      Number 2");
        assert_eq!(lines[5], "      Number 3");
    }
}
