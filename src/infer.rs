use std::fmt;

use log::debug;

use crate::ast::{Term, Type};
use crate::constraints::{ConstraintBuilder, Equation, Typed};
use crate::errors::{ParseResult, TypeError, TypeResult};
use crate::parser::parse;
use crate::proof::Derivation;
use crate::unify::{Substitution, Unifier};

pub const NO_TYPE: &str = "Expression has no type";

/// State of one inference run. Everything is reset when a new run starts,
/// so a value can be reused and separate values never interfere.
pub struct TypeInference {
    builder: ConstraintBuilder,
    equations: Vec<Equation>,
    substitution: Substitution,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInference {
    pub fn new() -> Self {
        Self {
            builder: ConstraintBuilder::new(),
            equations: Vec::new(),
            substitution: Substitution::new(),
        }
    }

    fn reset(&mut self) {
        self.builder.reset();
        self.equations.clear();
        self.substitution = Substitution::new();
    }

    /// Generates constraints for `term`, solves them, and resolves every
    /// node into a derivation.
    pub fn infer(&mut self, term: &Term) -> TypeResult<Derivation> {
        let typed = self.constrain(term);
        self.solve()?;
        Ok(Derivation::build(&typed, &self.substitution))
    }

    fn constrain(&mut self, term: &Term) -> Typed {
        self.reset();
        let typed = self.builder.build(term);
        self.equations = self.builder.take_equations();
        debug!("{} constraints for {}", self.equations.len(), term);
        typed
    }

    fn solve(&mut self) -> TypeResult<()> {
        let mut unifier = Unifier::new(std::mem::take(&mut self.equations));
        let result = unifier.solve();
        self.equations = unifier.into_equations();
        self.substitution = result?;
        debug!("solved: {}", self.substitution);
        Ok(())
    }

    /// Equations of the last run, in their final rewritten state.
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    /// Whether every equation of the last run is deleted or canonical and
    /// satisfied by the final substitution.
    pub fn is_solved(&self) -> bool {
        Unifier::new(self.equations.clone()).is_solved_by(&self.substitution)
    }
}

pub fn run_inference(term: &Term) -> TypeResult<Derivation> {
    TypeInference::new().infer(term)
}

pub fn infer_type_only(term: &Term) -> TypeResult<Type> {
    run_inference(term).map(|derivation| derivation.ty)
}

/// Result of checking an expression that parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Typed(Derivation),
    NoType(TypeError),
}

impl Outcome {
    pub fn derivation(&self) -> Option<&Derivation> {
        match self {
            Outcome::Typed(derivation) => Some(derivation),
            Outcome::NoType(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Typed(derivation) => write!(f, "{}", derivation),
            Outcome::NoType(_) => writeln!(f, "{}", NO_TYPE),
        }
    }
}

/// Parses and types `input`. Syntax errors propagate; typing errors become
/// `Outcome::NoType`.
pub fn check_expression(input: &str) -> ParseResult<Outcome> {
    let term = parse(input)?;
    Ok(match run_inference(&term) {
        Ok(derivation) => Outcome::Typed(derivation),
        Err(e) => {
            debug!("{}: {}", input, e);
            Outcome::NoType(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TyVar;

    fn infer(input: &str) -> TypeResult<Derivation> {
        run_inference(&parse(input).unwrap())
    }

    #[test]
    fn test_runs_do_not_share_counters() {
        let mut inference = TypeInference::new();
        let term = parse("\\x.\\y.x").unwrap();
        let first = inference.infer(&term).unwrap();
        let second = inference.infer(&term).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.ty,
            Type::arrow(
                Type::Var(TyVar(1)),
                Type::arrow(Type::Var(TyVar(2)), Type::Var(TyVar(1)))
            )
        );
    }

    #[test]
    fn test_failed_run_does_not_leak() {
        let mut inference = TypeInference::new();
        assert!(inference.infer(&parse("\\x. x x").unwrap()).is_err());
        let derivation = inference.infer(&parse("y").unwrap()).unwrap();
        assert_eq!(derivation.ty, Type::Var(TyVar(1)));
        assert!(inference.is_solved());
    }

    #[test]
    fn test_self_application_is_infinite() {
        assert!(matches!(
            infer("\\x. x x"),
            Err(TypeError::InfiniteType { .. })
        ));
    }

    #[test]
    fn test_equations_are_solved() {
        let mut inference = TypeInference::new();
        inference
            .infer(&parse("\\x.\\y.\\z. x z (y z)").unwrap())
            .unwrap();
        assert!(inference.is_solved());
        assert!(!inference.substitution().is_empty());
    }

    #[test]
    fn test_outcome_display() {
        let outcome = check_expression("(\\x. x x)(\\x. x x)").unwrap();
        assert_eq!(outcome.to_string(), "Expression has no type\n");
        assert!(outcome.derivation().is_none());

        let outcome = check_expression("y").unwrap();
        assert_eq!(outcome.to_string(), "y : t1 |- y : t1 [rule #1]\n");
    }

    #[test]
    fn test_syntax_errors_propagate() {
        assert!(check_expression("(x").is_err());
    }
}
