use std::io;
use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Malformed clause `{}`: {}", clause, reason))]
    MalformedClauseText { clause: String, reason: &'static str },

    #[snafu(display("Malformed clause line {}: `{}`: {}", line, content, reason))]
    MalformedClauseLine {
        line: usize,
        content: String,
        reason: String,
    },

    #[snafu(display("Could not read clause file '{}': {}", path.display(), source))]
    ReadClauseFile { path: PathBuf, source: io::Error },

    #[snafu(display("Could not read clause line {}: {}", line, source))]
    ReadClauseLine { line: usize, source: io::Error },

    #[snafu(display("Search did not converge within {} evaluations", evaluations))]
    NonConvergence { evaluations: u64 },
}
