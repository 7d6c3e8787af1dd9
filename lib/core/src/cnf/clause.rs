use std::fmt::{Display, Formatter};
use std::slice::Iter;

use itertools::Itertools;

use crate::lit::Lit;

/// Disjunction of literals. The empty clause is never satisfied.
#[derive(Debug, Clone, Default)]
pub struct Clause {
    pub lits: Vec<Lit>,
}

impl Clause {
    pub fn new(lits: Vec<Lit>) -> Self {
        Clause { lits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> Iter<'_, Lit> {
        self.lits.iter()
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }
}

impl<I> From<I> for Clause
where
    I: IntoIterator,
    I::Item: Into<Lit>,
{
    fn from(iter: I) -> Self {
        Self::new(iter.into_iter().map_into::<Lit>().collect())
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.lits.iter().join("|"))
    }
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        if self.lits.len() != other.lits.len() {
            return false;
        }
        let lhs = self.lits.iter().sorted_unstable();
        let rhs = other.lits.iter().sorted_unstable();
        itertools::equal(lhs, rhs)
    }
}

impl Eq for Clause {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_display() {
        let clause = Clause::from([Lit::pos("a"), Lit::neg("b")]);
        assert_eq!(format!("{}", clause), "(a|!b)");
        assert_eq!(format!("{}", Clause::empty()), "()");
    }

    #[test]
    fn test_clause_eq_ignores_order() {
        let lhs = Clause::from([Lit::pos("a"), Lit::neg("b")]);
        let rhs = Clause::from([Lit::neg("b"), Lit::pos("a")]);
        assert_eq!(lhs, rhs);
        assert_ne!(lhs, Clause::from([Lit::pos("a"), Lit::pos("b")]));
    }
}
