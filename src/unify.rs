use std::collections::{BTreeMap, HashSet};
use std::fmt;

use log::debug;

use crate::ast::{TyVar, Type};
use crate::constraints::{Context, Equation};
use crate::errors::{TypeError, TypeResult};

/// Solved type variables. Lookups are applied transitively, so a solution
/// that mentions another solved variable is resolved as well.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution(BTreeMap<TyVar, Type>);

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `v = T` from every equation still in play.
    pub fn from_equations(equations: &[Equation]) -> Self {
        let mut subst = Self::new();
        for equation in equations.iter().filter(|eq| !eq.deleted) {
            if let Some(var) = equation.left.as_var() {
                subst.0.insert(var, equation.right.clone());
            }
        }
        subst
    }

    pub fn insert(&mut self, var: TyVar, ty: Type) {
        self.0.insert(var, ty);
    }

    pub fn get(&self, var: TyVar) -> Option<&Type> {
        self.0.get(&var)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn apply_once(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(var) => self.0.get(var).cloned().unwrap_or_else(|| ty.clone()),
            Type::Arrow(t1, t2) => Type::arrow(self.apply_once(t1), self.apply_once(t2)),
        }
    }

    pub fn apply(&self, ty: &Type) -> Type {
        let mut current = ty.clone();
        // A solved system is acyclic, so each round resolves at least one
        // level and `len() + 1` rounds reach the fixpoint.
        for _ in 0..=self.0.len() {
            let next = self.apply_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    pub fn apply_context(&self, context: &Context) -> Context {
        context
            .iter()
            .map(|(name, ty)| (name.clone(), self.apply(ty)))
            .collect()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries: Vec<String> = self
            .0
            .iter()
            .map(|(var, ty)| format!("{} := {}", var, ty))
            .collect();
        write!(f, "{{{}}}", entries.join(", "))
    }
}

/// Rewrites an equation system to solved form: every equation still in play
/// reads `v = T`, no two share `v`, and no `v` occurs in any right-hand side.
///
/// Each scan applies the first rule that makes progress and restarts:
/// orientation, triviality, decomposition, elimination. Elimination retires
/// one variable for good, decomposition removes an arrow from each side,
/// orientation fires at most once per equation between the other rules, and
/// triviality only deletes, so the loop terminates.
#[derive(Debug, Clone)]
pub struct Unifier {
    equations: Vec<Equation>,
}

impl Unifier {
    pub fn new(equations: Vec<Equation>) -> Self {
        Self { equations }
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn into_equations(self) -> Vec<Equation> {
        self.equations
    }

    pub fn solve(&mut self) -> TypeResult<Substitution> {
        loop {
            let progressed = self.run_to_fixpoint()?;
            match self.first_unsolved() {
                None => break,
                Some(index) if !progressed => {
                    let equation = &self.equations[index];
                    return Err(TypeError::UnsolvableConstraintSystem {
                        left: equation.left.clone(),
                        right: equation.right.clone(),
                    });
                }
                Some(index) => {
                    debug!("system not solved at {}, rescanning", self.equations[index]);
                }
            }
        }
        Ok(Substitution::from_equations(&self.equations))
    }

    fn run_to_fixpoint(&mut self) -> TypeResult<bool> {
        let mut progressed = false;
        while self.step()? {
            progressed = true;
        }
        Ok(progressed)
    }

    /// Applies the first applicable rule. Returns false when none applies.
    fn step(&mut self) -> TypeResult<bool> {
        for i in 0..self.equations.len() {
            let equation = &mut self.equations[i];
            if equation.deleted {
                continue;
            }

            if !equation.left.is_var() && equation.right.is_var() {
                equation.swap_sides();
                debug!("orient: {}", equation);
                return Ok(true);
            }

            if equation.sides_equal() {
                equation.deleted = true;
                debug!("delete: {}", equation);
                return Ok(true);
            }

            let decomposed = match (&equation.left, &equation.right) {
                (Type::Arrow(a1, b1), Type::Arrow(a2, b2)) => Some((
                    Equation::new((**a1).clone(), (**a2).clone()),
                    Equation::new((**b1).clone(), (**b2).clone()),
                )),
                _ => None,
            };
            if let Some((args, results)) = decomposed {
                equation.deleted = true;
                debug!("decompose: {} into {} and {}", equation, args, results);
                self.equations.push(args);
                self.equations.push(results);
                return Ok(true);
            }

            if let Some(var) = equation.left.as_var() {
                if !equation.used {
                    self.eliminate(i, var)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn eliminate(&mut self, index: usize, var: TyVar) -> TypeResult<()> {
        let replacement = self.equations[index].right.clone();
        if replacement.occurs(var) {
            return Err(TypeError::InfiniteType {
                var,
                ty: replacement,
            });
        }

        self.equations[index].used = true;
        debug!("eliminate: {} := {}", var, replacement);

        for (j, other) in self.equations.iter_mut().enumerate() {
            if j == index || other.deleted {
                continue;
            }
            other.left.substitute(var, &replacement);
            other.right.substitute(var, &replacement);
        }
        Ok(())
    }

    /// Index of the first equation in play that is not in solved form.
    fn first_unsolved(&self) -> Option<usize> {
        let active: Vec<(usize, &Equation)> = self
            .equations
            .iter()
            .enumerate()
            .filter(|(_, eq)| !eq.deleted)
            .collect();

        let mut seen = HashSet::new();
        for (index, equation) in &active {
            let Some(var) = equation.left.as_var() else {
                return Some(*index);
            };
            if equation.sides_equal() || !seen.insert(var) {
                return Some(*index);
            }
            if active.iter().any(|(_, other)| other.right.occurs(var)) {
                return Some(*index);
            }
        }
        None
    }

    /// True when every equation in play is canonical and holds under `subst`.
    pub fn is_solved_by(&self, subst: &Substitution) -> bool {
        self.equations
            .iter()
            .filter(|eq| !eq.deleted)
            .all(|eq| eq.is_canonical() && subst.apply(&eq.left) == subst.apply(&eq.right))
    }
}
