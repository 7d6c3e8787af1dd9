pub mod classify;
pub mod cnf;
pub mod encoder;
pub mod error;
pub mod lit;
pub mod options;
pub mod search;
pub mod trace;
pub mod utils;

#[cfg(test)]
mod arbitrary;

pub use classify::{classify, classify_from_clause_file, Classification, Classifier, Mode, Verdict};
pub use error::{Error, Result};
