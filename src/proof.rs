use std::fmt;

use crate::ast::{Term, Type};
use crate::constraints::{Context, Typed, TypedNode};
use crate::unify::Substitution;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Var,
    App,
    Abs,
}

impl Rule {
    pub fn number(self) -> u8 {
        match self {
            Rule::Var => 1,
            Rule::App => 2,
            Rule::Abs => 3,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[rule #{}]", self.number())
    }
}

/// One step of a typing derivation with its premises.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation {
    pub context: Context,
    pub term: Term,
    pub ty: Type,
    pub rule: Rule,
    pub premises: Vec<Derivation>,
}

impl Derivation {
    /// Resolves every node of `typed` through `subst`. A node's context is
    /// its own bindings on top of whatever its ancestors bind.
    pub fn build(typed: &Typed, subst: &Substitution) -> Self {
        Self::build_under(typed, subst, &Context::new())
    }

    fn build_under(typed: &Typed, subst: &Substitution, inherited: &Context) -> Self {
        let mut context = inherited.clone();
        context.extend(subst.apply_context(&typed.context));

        let (rule, premises) = match &typed.node {
            TypedNode::Var(_) => (Rule::Var, vec![]),
            TypedNode::App(func, arg) => (
                Rule::App,
                vec![
                    Self::build_under(func, subst, &context),
                    Self::build_under(arg, subst, &context),
                ],
            ),
            TypedNode::Abs(_, body) => (Rule::Abs, vec![Self::build_under(body, subst, &context)]),
        };

        Self {
            context,
            term: typed.term(),
            ty: subst.apply(&typed.ty),
            rule,
            premises,
        }
    }

    /// The judgement of this step without indentation.
    pub fn judgement(&self) -> String {
        let bindings: Vec<String> = self
            .context
            .iter()
            .map(|(name, ty)| format!("{} : {}", name, ty))
            .collect();
        let context = if bindings.is_empty() {
            String::new()
        } else {
            format!("{} ", bindings.join(", "))
        };
        format!("{}|- {} : {} {}", context, self.term, self.ty, self.rule)
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_lines(0, &mut lines);
        lines
    }

    fn collect_lines(&self, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", "*   ".repeat(depth), self.judgement()));
        for premise in &self.premises {
            premise.collect_lines(depth + 1, lines);
        }
    }

    fn display_with_indent(&self, f: &mut fmt::Formatter, depth: usize) -> fmt::Result {
        writeln!(f, "{}{}", "*   ".repeat(depth), self.judgement())?;
        for premise in &self.premises {
            premise.display_with_indent(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.display_with_indent(f, 0)
    }
}
