//! Random formulas for property tests.

use itertools::Itertools;
use quickcheck::{Arbitrary, Gen};

use crate::cnf::{Clause, Cnf};
use crate::lit::Lit;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

/// Small random formula over a handful of variable names.
#[derive(Debug, Clone)]
pub struct SmallCnf(pub Cnf);

impl Arbitrary for SmallCnf {
    fn arbitrary(g: &mut Gen) -> Self {
        let num_clauses = usize::arbitrary(g) % 6 + 1;
        let clauses = (0..num_clauses)
            .map(|_| {
                let len = usize::arbitrary(g) % 3 + 1;
                Clause::new(
                    (0..len)
                        .map(|_| Lit::new(*g.choose(&NAMES).unwrap(), bool::arbitrary(g)))
                        .collect(),
                )
            })
            .collect_vec();
        SmallCnf(Cnf::from(clauses))
    }
}
