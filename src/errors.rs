use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind};
use thiserror::Error;

use crate::ast::{TyVar, Type};
use crate::lexer::Token;

/// Syntax errors. Every variant carries the 0-based character position it
/// was detected at.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Illegal character '{ch}' at {position}")]
    IllegalCharacter { ch: char, position: usize },

    #[error("Unexpected token {token} at {position} in {rule}()")]
    UnexpectedToken {
        token: Token,
        position: usize,
        rule: &'static str,
    },

    #[error("No right parenthesis at {position}")]
    UnmatchedParenthesis { position: usize },

    #[error("Unexpected trailing token {token} at {position}")]
    TrailingInput { token: Token, position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            ParseError::IllegalCharacter { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnmatchedParenthesis { position }
            | ParseError::TrailingInput { position, .. } => *position,
        }
    }

    pub fn span(&self) -> Range<usize> {
        let position = self.position();
        position..position + 1
    }

    pub fn to_ariadne_report<'a>(&self, filename: &'a str) -> Report<'a, (&'a str, Range<usize>)> {
        let label = match self {
            ParseError::IllegalCharacter { ch, .. } => format!("'{}' is not part of the grammar", ch),
            ParseError::UnexpectedToken { token, rule, .. } => {
                format!("{} cannot appear here ({})", token, rule)
            }
            ParseError::UnmatchedParenthesis { .. } => "expected ')'".to_string(),
            ParseError::TrailingInput { token, .. } => {
                format!("{} follows a complete expression", token)
            }
        };

        Report::build(ReportKind::Error, (filename, self.span()))
            .with_message(format!("{}", self))
            .with_label(
                Label::new((filename, self.span()))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
    }
}

/// Typing errors. Both mean the expression has no simple type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Occurs check failed: variable '{var}' occurs in type {ty}")]
    InfiniteType { var: TyVar, ty: Type },

    #[error("Constraint system has no solved form: {left} = {right}")]
    UnsolvableConstraintSystem { left: Type, right: Type },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Type error: {0}")]
    Type(#[from] TypeError),
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
pub type TypeResult<T> = std::result::Result<T, TypeError>;
pub type Result<T> = std::result::Result<T, Error>;
