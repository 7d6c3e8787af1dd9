use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::path::Path;
use std::slice::Iter;

use itertools::Itertools;

use crate::encoder::VarIndex;
use crate::error::Result;

pub use clause::Clause;

pub mod clause;
pub mod dimacs;
mod parsing;

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
}

impl Cnf {
    pub fn new() -> Self {
        Self { clauses: Vec::new() }
    }

    /// Parses the clause-text form, e.g. `(a|!b)&(!a|b)`.
    pub fn parse(text: &str) -> Result<Self> {
        parsing::parse_clause_text(text)
    }

    /// Reads a line-based clause file (DIMACS-style integer literals).
    pub fn from_clause_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        dimacs::parse_clause_file(path)
    }

    pub fn from_clause_lines(reader: impl BufRead) -> Result<Self> {
        dimacs::parse_clause_lines(reader)
    }

    pub fn iter(&self) -> Iter<'_, Clause> {
        self.clauses.iter()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn add_clause(&mut self, clause: impl Into<Clause>) {
        self.clauses.push(clause.into());
    }

    /// Distinct variable names in first-seen order.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.clauses
            .iter()
            .flat_map(|c| c.iter())
            .map(|lit| lit.name())
            .filter(|name| seen.insert(*name))
            .collect_vec()
    }

    /// Discrete CNF semantics: every clause must contain a true literal.
    ///
    /// `values` is indexed by `index`; variables unknown to `index` are treated as false.
    pub fn is_satisfied_by(&self, index: &VarIndex, values: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause.iter().any(|lit| {
                let value = index.index_of(lit.name()).map(|i| values[i]).unwrap_or(false);
                lit.eval(value)
            })
        })
    }
}

impl<I> From<I> for Cnf
where
    I: IntoIterator,
    I::Item: Into<Clause>,
{
    fn from(iter: I) -> Self {
        let mut cnf = Self::new();
        for clause in iter.into_iter() {
            cnf.add_clause(clause)
        }
        cnf
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.clauses.iter().join("&"))
    }
}
