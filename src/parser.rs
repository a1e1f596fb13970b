use crate::ast::Term;
use crate::errors::{ParseError, ParseResult};
use crate::lexer::{Lexer, Spanned, Token};

/// Recursive descent over
///
/// ```text
/// expression  := LAMBDA VAR DOT expression | application
/// application := atom+
/// atom        := VAR | LPAREN expression RPAREN
/// ```
///
/// with one token of lookahead.
pub struct Parser<'input> {
    lexer: Lexer<'input>,
    current: Spanned,
}

impl<'input> Parser<'input> {
    pub fn new(input: &'input str) -> Self {
        Parser {
            lexer: Lexer::new(input),
            current: Spanned::new(Token::Start, 0),
        }
    }

    pub fn parse(mut self) -> ParseResult<Term> {
        self.advance()?;
        let term = self.expression()?;
        match self.current.token {
            Token::End => Ok(term),
            _ => Err(ParseError::TrailingInput {
                token: self.current.token.clone(),
                position: self.current.position,
            }),
        }
    }

    fn advance(&mut self) -> ParseResult<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, rule: &'static str) -> ParseError {
        ParseError::UnexpectedToken {
            token: self.current.token.clone(),
            position: self.current.position,
            rule,
        }
    }

    fn expression(&mut self) -> ParseResult<Term> {
        match self.current.token {
            Token::Lambda => self.abstraction(),
            Token::Var(_) | Token::LeftParen => self.application(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn abstraction(&mut self) -> ParseResult<Term> {
        self.advance()?;
        let Token::Var(param) = self.current.token.clone() else {
            return Err(self.unexpected("abstraction"));
        };
        self.advance()?;
        if self.current.token != Token::Dot {
            return Err(self.unexpected("abstraction"));
        }
        self.advance()?;
        let body = self.expression()?;
        Ok(Term::abs(&param, body))
    }

    /// Collects atoms until END or RPAREN. A lambda becomes the last
    /// applicant, so `f \x.x` applies `f` to the abstraction.
    fn application(&mut self) -> ParseResult<Term> {
        let mut applicants = Vec::new();
        loop {
            match self.current.token {
                Token::Var(_) | Token::LeftParen => applicants.push(self.atom()?),
                Token::Lambda => {
                    applicants.push(self.expression()?);
                    break;
                }
                Token::End | Token::RightParen => break,
                _ => return Err(self.unexpected("application")),
            }
        }

        // ((a b) c)
        applicants
            .into_iter()
            .reduce(Term::app)
            .ok_or_else(|| self.unexpected("application"))
    }

    fn atom(&mut self) -> ParseResult<Term> {
        match self.current.token.clone() {
            Token::LeftParen => {
                self.advance()?;
                let term = self.expression()?;
                if self.current.token != Token::RightParen {
                    return Err(ParseError::UnmatchedParenthesis {
                        position: self.current.position,
                    });
                }
                self.advance()?;
                Ok(term)
            }
            Token::Var(name) => {
                self.advance()?;
                Ok(Term::Var(name))
            }
            _ => Err(self.unexpected("atom")),
        }
    }
}

pub fn parse(input: &str) -> ParseResult<Term> {
    Parser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Term {
        Term::var(name)
    }

    fn app(f: Term, a: Term) -> Term {
        Term::app(f, a)
    }

    fn abs(param: &str, body: Term) -> Term {
        Term::abs(param, body)
    }

    enum Expected {
        Pass(Term),
        Fail(ParseError),
    }

    fn pass(term: Term) -> Expected {
        Expected::Pass(term)
    }

    fn fail(error: ParseError) -> Expected {
        Expected::Fail(error)
    }

    #[test]
    fn parse() {
        let cases: Vec<(&str, Expected)> = vec![
            ("x", pass(var("x"))),
            ("  x  ", pass(var("x"))),
            ("f x", pass(app(var("f"), var("x")))),
            ("a b c", pass(app(app(var("a"), var("b")), var("c")))),
            ("a (b c)", pass(app(var("a"), app(var("b"), var("c"))))),
            ("\\x.x", pass(abs("x", var("x")))),
            ("\\x.\\y.x", pass(abs("x", abs("y", var("x"))))),
            ("\\x. x y", pass(abs("x", app(var("x"), var("y"))))),
            ("f \\x.x", pass(app(var("f"), abs("x", var("x"))))),
            (
                "f g \\x.x",
                pass(app(app(var("f"), var("g")), abs("x", var("x")))),
            ),
            (
                "(\\x.x) (\\y.y)",
                pass(app(abs("x", var("x")), abs("y", var("y")))),
            ),
            ("((x))", pass(var("x"))),
            (
                "\\x.(\\y.y)\\z.z",
                pass(abs("x", app(abs("y", var("y")), abs("z", var("z"))))),
            ),
            (
                "",
                fail(ParseError::UnexpectedToken {
                    token: Token::End,
                    position: 0,
                    rule: "expression",
                }),
            ),
            (
                "()",
                fail(ParseError::UnexpectedToken {
                    token: Token::RightParen,
                    position: 1,
                    rule: "expression",
                }),
            ),
            ("(x", fail(ParseError::UnmatchedParenthesis { position: 2 })),
            (
                "x)",
                fail(ParseError::TrailingInput {
                    token: Token::RightParen,
                    position: 1,
                }),
            ),
            (
                "x . y",
                fail(ParseError::UnexpectedToken {
                    token: Token::Dot,
                    position: 2,
                    rule: "application",
                }),
            ),
            (
                "\\.x",
                fail(ParseError::UnexpectedToken {
                    token: Token::Dot,
                    position: 1,
                    rule: "abstraction",
                }),
            ),
            (
                "\\x y",
                fail(ParseError::UnexpectedToken {
                    token: Token::Var("y".to_string()),
                    position: 3,
                    rule: "abstraction",
                }),
            ),
            (
                "\\x.",
                fail(ParseError::UnexpectedToken {
                    token: Token::End,
                    position: 3,
                    rule: "expression",
                }),
            ),
            (
                "x # y",
                fail(ParseError::IllegalCharacter {
                    ch: '#',
                    position: 2,
                }),
            ),
        ];
        for (input, expected) in cases {
            match expected {
                Expected::Pass(expected) => match super::parse(input) {
                    Ok(actual) => assert_eq!(expected, actual, "input {:?}", input),
                    Err(e) => panic!("expected {:?} for {:?}, got {:?}", expected, input, e),
                },
                Expected::Fail(expected) => match super::parse(input) {
                    Ok(actual) => panic!("expected failure for {:?}, got {:?}", input, actual),
                    Err(e) => assert_eq!(expected, e, "input {:?}", input),
                },
            }
        }
    }

    #[test]
    fn test_print_then_parse() {
        for input in ["a b c", "\\x.\\y.\\z. x z (y z)", "(\\m.\\n. n m) (\\f.\\x. f x)"] {
            let term = super::parse(input).unwrap();
            assert_eq!(super::parse(&term.to_string()).unwrap(), term);
        }
    }
}
