use std::fmt::{Display, Formatter};
use std::ops;
use std::str::FromStr;

use snafu::ensure;

use crate::error::{Error, MalformedClauseTextSnafu};

/// Characters which separate literals, clauses and negations in clause text.
pub const SEPARATORS: [char; 5] = ['&', '|', '(', ')', '!'];

/// A named boolean variable, possibly negated.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Lit {
    name: String,
    negated: bool,
}

impl Lit {
    pub fn new(name: impl Into<String>, negated: bool) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "literal name must not be empty");
        Lit { name, negated }
    }

    pub fn pos(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    pub fn neg(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    /// Truth value of this literal under the given value of its variable.
    pub const fn eval(&self, value: bool) -> bool {
        value ^ self.negated
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "!")?;
        }
        write!(f, "{}", self.name)
    }
}

impl FromStr for Lit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negated, name) = match s.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        ensure!(
            !name.is_empty(),
            MalformedClauseTextSnafu {
                clause: s,
                reason: "empty literal",
            }
        );
        ensure!(
            !name.contains(SEPARATORS),
            MalformedClauseTextSnafu {
                clause: s,
                reason: "separator inside a literal",
            }
        );
        Ok(Lit::new(name, negated))
    }
}

// -Lit
impl ops::Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Lit {
            name: self.name,
            negated: !self.negated,
        }
    }
}

// !Lit
impl ops::Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        -self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit_new() {
        let lit = Lit::new("x", true);
        assert_eq!(lit.name(), "x");
        assert!(lit.is_negated());
    }

    #[test]
    fn test_lit_display() {
        assert_eq!(format!("{}", Lit::pos("a")), "a");
        assert_eq!(format!("{}", Lit::neg("a")), "!a");
    }

    #[test]
    fn test_lit_parse() {
        assert_eq!("a42".parse::<Lit>().unwrap(), Lit::pos("a42"));
        assert_eq!("!7".parse::<Lit>().unwrap(), Lit::neg("7"));
    }

    #[test]
    fn test_lit_parse_rejects_malformed() {
        for s in ["", "!", "!!a", "a!b", "a&b"] {
            assert!(
                matches!(s.parse::<Lit>(), Err(Error::MalformedClauseText { .. })),
                "'{}' must be rejected",
                s
            );
        }
    }

    #[test]
    fn test_lit_neg() {
        let lit = Lit::pos("x");
        assert_eq!(-lit.clone(), Lit::neg("x"));
        assert_eq!(!!lit.clone(), lit);
    }

    #[test]
    fn test_lit_eval() {
        assert!(Lit::pos("x").eval(true));
        assert!(!Lit::pos("x").eval(false));
        assert!(Lit::neg("x").eval(false));
        assert!(!Lit::neg("x").eval(true));
    }
}
