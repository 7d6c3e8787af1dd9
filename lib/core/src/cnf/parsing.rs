use log::{debug, warn};
use snafu::OptionExt;

use crate::cnf::{Clause, Cnf};
use crate::error::{MalformedClauseTextSnafu, Result};
use crate::lit::Lit;

pub fn parse_clause_text(text: &str) -> Result<Cnf> {
    let trimmed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if trimmed.is_empty() {
        warn!("Empty formula, treating it as trivially satisfiable");
        return Ok(Cnf::new());
    }

    let mut cnf = Cnf::new();
    for clause in trimmed.split('&') {
        cnf.add_clause(parse_clause(clause)?);
    }
    debug!("Parsed {} clauses", cnf.len());
    Ok(cnf)
}

fn parse_clause(clause: &str) -> Result<Clause> {
    let inner = clause
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .context(MalformedClauseTextSnafu {
            clause,
            reason: "clause must be enclosed in parentheses",
        })?;

    // Empty disjunction:
    if inner.is_empty() {
        return Ok(Clause::empty());
    }

    let lits = inner.split('|').map(|token| token.parse::<Lit>()).collect::<Result<Vec<_>>>()?;
    Ok(Clause::new(lits))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::error::Error;

    use super::*;

    #[test]
    fn test_parse_simple() {
        let cnf = parse_clause_text("(a|!b)&(!a|b)").unwrap();
        assert_eq!(
            cnf,
            Cnf::from([
                Clause::from([Lit::pos("a"), Lit::neg("b")]),
                Clause::from([Lit::neg("a"), Lit::pos("b")]),
            ])
        );
    }

    #[test]
    fn test_parse_strips_whitespace() {
        let cnf = parse_clause_text(" ( a | ! b )\t&\n( c ) ").unwrap();
        assert_eq!(cnf.to_string(), "(a|!b)&(c)");
    }

    #[test]
    fn test_parse_empty_clause() {
        let cnf = parse_clause_text("()").unwrap();
        assert_eq!(cnf.len(), 1);
        assert!(cnf.clauses[0].is_empty());
    }

    #[test]
    fn test_parse_empty_formula() {
        assert!(parse_clause_text("").unwrap().is_empty());
        assert!(parse_clause_text("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_missing_parentheses() {
        for text in ["a|b", "(a|b", "a|b)", "(a)&b", "(a)&"] {
            assert!(
                matches!(parse_clause_text(text), Err(Error::MalformedClauseText { .. })),
                "'{}' must be rejected",
                text
            );
        }
    }

    #[test]
    fn test_parse_rejects_empty_token() {
        for text in ["(a|)", "(|a)", "(a||b)", "(!)", "(a)&&(b)"] {
            assert!(
                matches!(parse_clause_text(text), Err(Error::MalformedClauseText { .. })),
                "'{}' must be rejected",
                text
            );
        }
    }
}
