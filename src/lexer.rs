use std::fmt;

use logos::Logos;

use crate::errors::{ParseError, ParseResult};

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"\s+")]
pub enum Token {
    // Lookahead before the first token has been read
    Start,

    #[regex(r"[a-z][a-z0-9']*", |lex| lex.slice().to_owned())]
    Var(String),

    #[token("\\")]
    Lambda,
    #[token(".")]
    Dot,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Start => write!(f, "START"),
            Token::Var(name) => write!(f, "VAR({})", name),
            Token::Lambda => write!(f, "LAMBDA"),
            Token::Dot => write!(f, "DOT"),
            Token::LeftParen => write!(f, "LPAREN"),
            Token::RightParen => write!(f, "RPAREN"),
            Token::End => write!(f, "END"),
        }
    }
}

/// A token together with the 0-based character index it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

impl Spanned {
    pub fn new(token: Token, position: usize) -> Self {
        Self { token, position }
    }
}

pub struct Lexer<'input> {
    source: &'input str,
    logos_lexer: logos::Lexer<'input, Token>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Lexer {
            source: input,
            logos_lexer: Token::lexer(input),
        }
    }

    /// Reads the next token. Once the input is exhausted every call yields
    /// `Token::End` positioned just past the last character.
    pub fn next_token(&mut self) -> ParseResult<Spanned> {
        match self.logos_lexer.next() {
            Some(Ok(token)) => Ok(Spanned::new(token, self.position())),
            Some(Err(())) => Err(ParseError::IllegalCharacter {
                ch: self.logos_lexer.slice().chars().next().unwrap_or('\u{fffd}'),
                position: self.position(),
            }),
            None => Ok(Spanned::new(Token::End, self.source.chars().count())),
        }
    }

    fn position(&self) -> usize {
        let start = self.logos_lexer.span().start;
        self.source[..start].chars().count()
    }
}

/// Lexes the whole input, up to and including the end token.
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::End;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|spanned| spanned.token)
            .collect()
    }

    #[test]
    fn test_symbols() {
        assert_eq!(
            kinds("\\ . ( )"),
            vec![
                Token::Lambda,
                Token::Dot,
                Token::LeftParen,
                Token::RightParen,
                Token::End
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            kinds("x a' z8' foo42"),
            vec![
                Token::Var("x".to_string()),
                Token::Var("a'".to_string()),
                Token::Var("z8'".to_string()),
                Token::Var("foo42".to_string()),
                Token::End
            ]
        );
    }

    #[test]
    fn test_lambda_without_spaces() {
        assert_eq!(
            kinds("\\x.x"),
            vec![
                Token::Lambda,
                Token::Var("x".to_string()),
                Token::Dot,
                Token::Var("x".to_string()),
                Token::End
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize(" (f  x)").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![1, 2, 5, 6, 7]);
    }

    #[test]
    fn test_end_repeats() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().token, Token::Var("x".to_string()));
        assert_eq!(lexer.next_token().unwrap(), Spanned::new(Token::End, 1));
        assert_eq!(lexer.next_token().unwrap(), Spanned::new(Token::End, 1));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![Token::End]);
        assert_eq!(kinds(" \t\n\r "), vec![Token::End]);
    }

    #[test]
    fn test_illegal_character() {
        assert_eq!(
            tokenize("\\x. X"),
            Err(ParseError::IllegalCharacter {
                ch: 'X',
                position: 4
            })
        );
        assert_eq!(
            tokenize("f + g"),
            Err(ParseError::IllegalCharacter {
                ch: '+',
                position: 2
            })
        );
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        assert_eq!(
            tokenize("1x"),
            Err(ParseError::IllegalCharacter {
                ch: '1',
                position: 0
            })
        );
    }
}
