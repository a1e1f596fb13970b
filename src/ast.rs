use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub type Name = String;

// Value-level AST

/// The variable introduced by an abstraction. It is never a derivation step
/// of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binder(pub Name);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Var(Name),
    Abs(Binder, Box<Term>),
    App(Box<Term>, Box<Term>),
}

impl Term {
    pub fn var(name: &str) -> Self {
        Term::Var(name.to_string())
    }

    pub fn abs(param: &str, body: Term) -> Self {
        Term::Abs(Binder(param.to_string()), Box::new(body))
    }

    pub fn app(func: Term, arg: Term) -> Self {
        Term::App(Box::new(func), Box::new(arg))
    }

    pub fn free_vars(&self) -> BTreeSet<Name> {
        match self {
            Term::Var(name) => {
                let mut set = BTreeSet::new();
                set.insert(name.clone());
                set
            }
            Term::Abs(Binder(param), body) => {
                let mut set = body.free_vars();
                set.remove(param);
                set
            }
            Term::App(func, arg) => {
                let mut set = func.free_vars();
                set.extend(arg.free_vars());
                set
            }
        }
    }
}

impl fmt::Display for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\{}.", self.0)
    }
}

/// Fully parenthesized: `x`, `(f a)`, `(\x.body)`. The output parses back to
/// the same tree.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Var(name) => write!(f, "{}", name),
            Term::Abs(binder, body) => write!(f, "({}{})", binder, body),
            Term::App(func, arg) => write!(f, "({} {})", func, arg),
        }
    }
}

// Type-level AST

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TyVar(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Var(TyVar),
    Arrow(Box<Type>, Box<Type>),
}

impl Type {
    pub fn arrow(from: Type, to: Type) -> Self {
        Type::Arrow(Box::new(from), Box::new(to))
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    pub fn as_var(&self) -> Option<TyVar> {
        match self {
            Type::Var(var) => Some(*var),
            Type::Arrow(_, _) => None,
        }
    }

    pub fn occurs(&self, var: TyVar) -> bool {
        match self {
            Type::Var(v) => *v == var,
            Type::Arrow(t1, t2) => t1.occurs(var) || t2.occurs(var),
        }
    }

    /// Replaces every occurrence of `var` in place. Returns whether anything
    /// changed.
    pub fn substitute(&mut self, var: TyVar, replacement: &Type) -> bool {
        match self {
            Type::Var(v) if *v == var => {
                *self = replacement.clone();
                true
            }
            Type::Var(_) => false,
            Type::Arrow(t1, t2) => {
                let left = t1.substitute(var, replacement);
                let right = t2.substitute(var, replacement);
                left || right
            }
        }
    }

    /// Type variables in order of first appearance, left to right.
    pub fn type_vars(&self) -> Vec<TyVar> {
        fn collect(ty: &Type, vars: &mut Vec<TyVar>) {
            match ty {
                Type::Var(v) => {
                    if !vars.contains(v) {
                        vars.push(*v);
                    }
                }
                Type::Arrow(t1, t2) => {
                    collect(t1, vars);
                    collect(t2, vars);
                }
            }
        }
        let mut vars = Vec::new();
        collect(self, &mut vars);
        vars
    }

    /// Displays the type with its variables renamed `a`, `b`, `c`, ... in
    /// order of first appearance.
    pub fn normalized(&self) -> Normalized<'_> {
        let names = self
            .type_vars()
            .into_iter()
            .enumerate()
            .map(|(i, var)| (var, letter_name(i)))
            .collect();
        Normalized { ty: self, names }
    }
}

fn letter_name(index: usize) -> String {
    let letter = ((index % 26) as u8 + b'a') as char;
    match index / 26 {
        0 => letter.to_string(),
        n => format!("{}{}", letter, n),
    }
}

impl fmt::Display for TyVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Var(var) => write!(f, "{}", var),
            Type::Arrow(t1, t2) => write!(f, "({} -> {})", t1, t2),
        }
    }
}

pub struct Normalized<'a> {
    ty: &'a Type,
    names: HashMap<TyVar, String>,
}

impl Normalized<'_> {
    fn write(&self, ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match ty {
            Type::Var(var) => match self.names.get(var) {
                Some(name) => write!(f, "{}", name),
                None => write!(f, "{}", var),
            },
            Type::Arrow(t1, t2) => {
                write!(f, "(")?;
                self.write(t1, f)?;
                write!(f, " -> ")?;
                self.write(t2, f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Normalized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(self.ty, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(n: usize) -> Type {
        Type::Var(TyVar(n))
    }

    #[test]
    fn test_term_display() {
        let k = Term::abs("x", Term::abs("y", Term::var("x")));
        assert_eq!(k.to_string(), "(\\x.(\\y.x))");

        let spine = Term::app(Term::app(Term::var("a"), Term::var("b")), Term::var("c"));
        assert_eq!(spine.to_string(), "((a b) c)");
    }

    #[test]
    fn test_free_vars() {
        let term = Term::app(Term::abs("x", Term::app(Term::var("x"), Term::var("y"))), Term::var("x"));
        let free: Vec<Name> = term.free_vars().into_iter().collect();
        assert_eq!(free, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_type_display() {
        let ty = Type::arrow(tv(1), Type::arrow(tv(2), tv(1)));
        assert_eq!(ty.to_string(), "(t1 -> (t2 -> t1))");
    }

    #[test]
    fn test_substitute_in_place() {
        let mut ty = Type::arrow(tv(1), Type::arrow(tv(2), tv(1)));
        assert!(ty.substitute(TyVar(1), &Type::arrow(tv(3), tv(3))));
        assert_eq!(ty.to_string(), "((t3 -> t3) -> (t2 -> (t3 -> t3)))");
        assert!(!ty.substitute(TyVar(1), &tv(4)));
    }

    #[test]
    fn test_occurs_does_not_confuse_prefixes() {
        let ty = Type::arrow(tv(10), tv(11));
        assert!(!ty.occurs(TyVar(1)));
        assert!(ty.occurs(TyVar(11)));
    }

    #[test]
    fn test_normalized() {
        let ty = Type::arrow(Type::arrow(tv(7), tv(3)), Type::arrow(tv(7), tv(9)));
        assert_eq!(ty.normalized().to_string(), "((a -> b) -> (a -> c))");
        assert_eq!(letter_name(27), "b1");
    }
}
