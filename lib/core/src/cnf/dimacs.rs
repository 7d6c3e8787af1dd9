//! Line-based clause files.
//!
//! Lines starting with `c` (comment) or `p` (header) are skipped, as are lines of at most
//! one character (blank lines, and the `%`/`0` trailer found in SATLIB benchmark files).
//! Every other line is one clause: signed integer literals terminated by `0`.
//! Literal `k` refers to the variable named `"k"`, and `-k` to its negation.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use itertools::Itertools;
use log::debug;
use snafu::ResultExt;

use crate::cnf::{Clause, Cnf};
use crate::error::{MalformedClauseLineSnafu, ReadClauseFileSnafu, ReadClauseLineSnafu, Result};
use crate::lit::Lit;

pub fn parse_clause_file<P: AsRef<Path>>(path: P) -> Result<Cnf> {
    let path = path.as_ref();
    let file = File::open(path).context(ReadClauseFileSnafu { path })?;
    let cnf = parse_clause_lines(BufReader::new(file))?;
    debug!("Read {} clauses from '{}'", cnf.len(), path.display());
    Ok(cnf)
}

pub fn parse_clause_lines(reader: impl BufRead) -> Result<Cnf> {
    let mut cnf = Cnf::new();
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.context(ReadClauseLineSnafu { line: line_number })?;
        if let Some(clause) = parse_clause_line(&line, line_number)? {
            cnf.add_clause(clause);
        }
    }
    Ok(cnf)
}

/// Converts the lines of a clause file into the clause-text form handed to the encoder.
pub fn dimacs_to_clause_text(reader: impl BufRead) -> Result<String> {
    Ok(parse_clause_lines(reader)?.to_string())
}

fn is_skipped(line: &str) -> bool {
    line.starts_with('c') || line.starts_with('p') || line.chars().count() <= 1
}

fn parse_clause_line(line: &str, line_number: usize) -> Result<Option<Clause>> {
    let line = line.trim();
    if is_skipped(line) {
        return Ok(None);
    }

    let malformed = |reason: String| {
        MalformedClauseLineSnafu {
            line: line_number,
            content: line,
            reason,
        }
        .fail()
    };

    let mut values = Vec::new();
    for token in line.split_whitespace() {
        match token.parse::<i64>() {
            Ok(value) => values.push(value),
            Err(e) => return malformed(format!("could not parse literal '{}': {}", token, e)),
        }
    }

    let Some((&last, lits)) = values.split_last() else {
        return malformed("no literals".to_string());
    };
    if last != 0 {
        return malformed("clause must be terminated by 0".to_string());
    }
    if lits.contains(&0) {
        return malformed("0 must only terminate the clause".to_string());
    }

    let lits = lits.iter().map(|&v| Lit::new(v.unsigned_abs().to_string(), v < 0)).collect_vec();
    Ok(Some(Clause::new(lits)))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::error::Error;

    use super::*;

    #[test]
    fn test_parse_lines() {
        let text = "c example\np cnf 2 1\n1 -2 0\n";
        let cnf = parse_clause_lines(text.as_bytes()).unwrap();
        assert_eq!(cnf, Cnf::from([Clause::from([Lit::pos("1"), Lit::neg("2")])]));
    }

    #[test]
    fn test_clause_text() {
        let text = "c example\n1 -2 0\n";
        assert_eq!(dimacs_to_clause_text(text.as_bytes()).unwrap(), "(1|!2)");
    }

    #[test]
    fn test_multidigit_variables() {
        // Trailing zeros of a variable are not the terminator:
        let text = "10 -20 0\n";
        assert_eq!(dimacs_to_clause_text(text.as_bytes()).unwrap(), "(10|!20)");
    }

    #[test]
    fn test_skips_satlib_trailer() {
        let text = "p cnf 3 2\n 1 2 -3 0\n-1 3 0\n%\n0\n\n";
        let cnf = parse_clause_lines(text.as_bytes()).unwrap();
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.to_string(), "(1|2|!3)&(!1|3)");
    }

    #[test]
    fn test_rejects_malformed_lines() {
        for text in ["1 -2\n", "1 x 0\n", "1 0 2 0\n", "1 - 2 0\n"] {
            match parse_clause_lines(text.as_bytes()) {
                Err(Error::MalformedClauseLine { line, .. }) => assert_eq!(line, 1),
                other => panic!("'{}' must be rejected, got {:?}", text.trim(), other),
            }
        }
    }

    #[test]
    fn test_reports_line_number() {
        let text = "c header\n1 2 0\n3 oops 0\n";
        match parse_clause_lines(text.as_bytes()) {
            Err(Error::MalformedClauseLine { line, content, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "3 oops 0");
            }
            other => panic!("expected a malformed line, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let result = parse_clause_file("/definitely/not/here.cnf");
        assert!(matches!(result, Err(Error::ReadClauseFile { .. })));
    }
}
