use std::collections::BTreeMap;
use std::fmt;

use log::trace;

use crate::ast::{Binder, Name, Term, TyVar, Type};

/// Free term variable -> the type it must have.
pub type Context = BTreeMap<Name, Type>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub left: Type,
    pub right: Type,
    /// Already applied as a substitution.
    pub used: bool,
    /// Removed from consideration, either discharged or trivially true.
    pub deleted: bool,
}

impl Equation {
    pub fn new(left: Type, right: Type) -> Self {
        Self {
            left,
            right,
            used: false,
            deleted: false,
        }
    }

    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }

    pub fn sides_equal(&self) -> bool {
        self.left == self.right
    }

    /// `v = T` with `v` not occurring in `T`.
    pub fn is_canonical(&self) -> bool {
        match self.left.as_var() {
            Some(var) => !self.right.occurs(var),
            None => false,
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

/// A term annotated with the type and context inferred for every node.
#[derive(Debug, Clone, PartialEq)]
pub struct Typed {
    pub ty: Type,
    pub context: Context,
    pub node: TypedNode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedNode {
    Var(Name),
    Abs(Binder, Box<Typed>),
    App(Box<Typed>, Box<Typed>),
}

impl Typed {
    pub fn term(&self) -> Term {
        match &self.node {
            TypedNode::Var(name) => Term::Var(name.clone()),
            TypedNode::Abs(binder, body) => Term::Abs(binder.clone(), Box::new(body.term())),
            TypedNode::App(func, arg) => Term::app(func.term(), arg.term()),
        }
    }
}

/// Walks a term bottom-up, handing out fresh type variables and collecting
/// one global list of equations.
pub struct ConstraintBuilder {
    counter: usize,
    equations: Vec<Equation>,
}

impl Default for ConstraintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintBuilder {
    pub fn new() -> Self {
        Self {
            counter: 0,
            equations: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.equations.clear();
    }

    pub fn fresh_tyvar(&mut self) -> Type {
        self.counter += 1;
        Type::Var(TyVar(self.counter))
    }

    pub fn take_equations(&mut self) -> Vec<Equation> {
        std::mem::take(&mut self.equations)
    }

    fn push(&mut self, left: Type, right: Type) {
        let equation = Equation::new(left, right);
        trace!("constraint {}", equation);
        self.equations.push(equation);
    }

    pub fn build(&mut self, term: &Term) -> Typed {
        match term {
            Term::Var(name) => self.build_var(name),
            Term::App(func, arg) => self.build_app(func, arg),
            Term::Abs(binder, body) => self.build_abs(binder, body),
        }
    }

    fn build_var(&mut self, name: &str) -> Typed {
        let ty = self.fresh_tyvar();
        let mut context = Context::new();
        context.insert(name.to_string(), ty.clone());
        Typed {
            ty,
            context,
            node: TypedNode::Var(name.to_string()),
        }
    }

    fn build_app(&mut self, func: &Term, arg: &Term) -> Typed {
        let func = self.build(func);
        let arg = self.build(arg);
        let ty = self.fresh_tyvar();

        self.push(func.ty.clone(), Type::arrow(arg.ty.clone(), ty.clone()));

        // A name used on both sides must get one type; the unifier decides it.
        let mut context = func.context.clone();
        for (name, arg_ty) in &arg.context {
            match context.get(name) {
                Some(func_ty) if func_ty != arg_ty => {
                    let func_ty = func_ty.clone();
                    self.push(func_ty, arg_ty.clone());
                }
                Some(_) => {}
                None => {
                    context.insert(name.clone(), arg_ty.clone());
                }
            }
        }

        Typed {
            ty,
            context,
            node: TypedNode::App(Box::new(func), Box::new(arg)),
        }
    }

    fn build_abs(&mut self, binder: &Binder, body: &Term) -> Typed {
        let mut body = self.build(body);
        let mut context = body.context.clone();

        let param_ty = match context.remove(&binder.0) {
            Some(ty) => ty,
            None => {
                let ty = self.fresh_tyvar();
                body.context.insert(binder.0.clone(), ty.clone());
                ty
            }
        };

        Typed {
            ty: Type::arrow(param_ty, body.ty.clone()),
            context,
            node: TypedNode::Abs(binder.clone(), Box::new(body)),
        }
    }
}
