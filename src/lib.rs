//! Satisfiability classification through continuous relaxation and derivative-free search.

pub use sat_relax_core as core;
