//! Continuous relaxation of a CNF formula.
//!
//! Every variable becomes one coordinate of a point in `R^n`, where values near `1` mean
//! "true" and values near `0` mean "false". The default [`Encoding::Dnf`] turns the negated
//! formula into a sum of products of squares:
//!
//! ```text
//! (a | b) & (a | !b) = 1
//!   <=> (!a & !b) | (!a & b) = 0
//!   <=> (1-a)^2 * (1-b)^2 + (1-a)^2 * b^2 = 0
//! ```
//!
//! so the objective is non-negative and vanishes exactly on points where each clause has a
//! literal sitting at its satisfying extreme.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::debug;
use ndarray::ArrayView1;

use crate::cnf::Cnf;
use crate::error::Result;
use crate::search::Objective;

pub const DEFAULT_STEEPNESS: f64 = 5.0;

/// Mapping from variable names to coordinates, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarIndex {
    map: HashMap<String, usize>,
    names: Vec<String>,
}

impl VarIndex {
    pub fn from_cnf(cnf: &Cnf) -> Self {
        let mut index = Self::default();
        for lit in cnf.iter().flat_map(|c| c.iter()) {
            index.insert(lit.name());
        }
        index
    }

    fn insert(&mut self, name: &str) -> usize {
        if let Some(&i) = self.map.get(name) {
            return i;
        }
        let i = self.names.len();
        self.map.insert(name.to_string(), i);
        self.names.push(name.to_string());
        i
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.map.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(index, name)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}

impl Display for VarIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (i, name) in self.iter() {
            map.entry(&format_args!("{}", name), &i);
        }
        map.finish()
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Encoding {
    /// Sum over clauses of the product of squared literal "falsity".
    /// Satisfied at value `0`.
    Dnf,
    /// Nested steep sigmoids approximating the boolean gates.
    /// Satisfied at value `1` (approximately).
    Sigmoid { steepness: f64 },
}

impl Encoding {
    pub fn sigmoid() -> Self {
        Encoding::Sigmoid {
            steepness: DEFAULT_STEEPNESS,
        }
    }

    /// Objective value corresponding to a satisfied formula.
    pub const fn satisfied_value(&self) -> f64 {
        match self {
            Encoding::Dnf => 0.0,
            Encoding::Sigmoid { .. } => 1.0,
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Dnf => write!(f, "dnf"),
            Encoding::Sigmoid { steepness } => write!(f, "sigmoid(k={})", steepness),
        }
    }
}

/// Smooth approximation of a 0/1 gate: `(tanh((x - 0.5) * k) + 1) / 2`.
pub fn rect(x: f64, steepness: f64) -> f64 {
    (((x - 0.5) * steepness).tanh() + 1.0) / 2.0
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EncoderOptions {
    pub encoding: Encoding,
    /// Clip points to `[0, 1]^n` before evaluating.
    pub clamp_inputs: bool,
}

pub const DEFAULT_ENCODER_OPTIONS: EncoderOptions = EncoderOptions {
    encoding: Encoding::Dnf,
    clamp_inputs: true,
};

impl Default for EncoderOptions {
    fn default() -> Self {
        DEFAULT_ENCODER_OPTIONS
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LiteralTerm {
    pub index: usize,
    pub negated: bool,
}

impl LiteralTerm {
    pub fn eval(&self, x: ArrayView1<f64>, encoding: Encoding) -> f64 {
        let v = x[self.index];
        match (encoding, self.negated) {
            (Encoding::Dnf, false) => (1.0 - v).powi(2),
            (Encoding::Dnf, true) => v.powi(2),
            (Encoding::Sigmoid { steepness }, false) => rect(v, steepness),
            (Encoding::Sigmoid { steepness }, true) => rect(1.0 - rect(v, steepness), steepness),
        }
    }
}

/// The objective built from a formula. Pure: equal points give equal values.
#[derive(Debug, Clone)]
pub struct Relaxation {
    clauses: Vec<Vec<LiteralTerm>>,
    num_vars: usize,
    encoding: Encoding,
    clamp_inputs: bool,
}

impl Relaxation {
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn clamps_inputs(&self) -> bool {
        self.clamp_inputs
    }

    pub fn terms(&self) -> &[Vec<LiteralTerm>] {
        &self.clauses
    }

    /// Same objective, evaluated without clipping (for diagnostics only).
    pub fn unclamped(&self) -> Self {
        Self {
            clamp_inputs: false,
            ..self.clone()
        }
    }

    pub fn eval(&self, x: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(x.len(), self.num_vars, "point dimension must match the number of variables");
        if self.clamp_inputs {
            let clamped = x.mapv(|v| v.clamp(0.0, 1.0));
            self.eval_raw(clamped.view())
        } else {
            self.eval_raw(x)
        }
    }

    fn eval_raw(&self, x: ArrayView1<f64>) -> f64 {
        match self.encoding {
            Encoding::Dnf => self
                .clauses
                .iter()
                .map(|clause| clause.iter().map(|t| t.eval(x, self.encoding)).product::<f64>())
                .sum(),
            Encoding::Sigmoid { steepness } => {
                let product = self
                    .clauses
                    .iter()
                    .map(|clause| rect(clause.iter().map(|t| t.eval(x, self.encoding)).sum(), steepness))
                    .product::<f64>();
                rect(product, steepness)
            }
        }
    }
}

impl Objective for Relaxation {
    fn eval(&self, x: ArrayView1<f64>) -> f64 {
        Relaxation::eval(self, x)
    }
}

pub fn encode(cnf: &Cnf, options: &EncoderOptions) -> (Relaxation, VarIndex) {
    let mut index = VarIndex::default();
    let clauses = cnf
        .iter()
        .map(|clause| {
            clause
                .iter()
                .map(|lit| LiteralTerm {
                    index: index.insert(lit.name()),
                    negated: lit.is_negated(),
                })
                .collect_vec()
        })
        .collect_vec();
    debug!(
        "Encoded {} clauses over {} variables using {} encoding",
        clauses.len(),
        index.len(),
        options.encoding
    );
    let relaxation = Relaxation {
        clauses,
        num_vars: index.len(),
        encoding: options.encoding,
        clamp_inputs: options.clamp_inputs,
    };
    (relaxation, index)
}

pub fn encode_text(text: &str, options: &EncoderOptions) -> Result<(Relaxation, VarIndex)> {
    let cnf = Cnf::parse(text)?;
    Ok(encode(&cnf, options))
}

#[cfg(test)]
mod tests {
    use ndarray::{arr1, Array1};
    use quickcheck_macros::quickcheck;
    use test_log::test;

    use crate::arbitrary::SmallCnf;

    use super::*;

    fn point_from(raw: &[u16], n: usize) -> Array1<f64> {
        // Spread over [-0.5, 1.5] to exercise clamping.
        (0..n)
            .map(|i| raw.get(i).map_or(0.25, |&r| r as f64 / u16::MAX as f64 * 2.0 - 0.5))
            .collect()
    }

    #[test]
    fn test_dnf_terms() {
        let (f, index) = encode_text("(a|!b)", &DEFAULT_ENCODER_OPTIONS).unwrap();
        assert_eq!(index.index_of("a"), Some(0));
        assert_eq!(index.index_of("b"), Some(1));
        assert_eq!(f.eval(arr1(&[0.0, 1.0]).view()), 1.0);
        assert_eq!(f.eval(arr1(&[1.0, 1.0]).view()), 0.0);
        assert_eq!(f.eval(arr1(&[0.0, 0.0]).view()), 0.0);
        assert!((f.eval(arr1(&[0.5, 0.5]).view()) - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_literal_reuses_index() {
        let (f, index) = encode_text("(a|b)&(!a|c)&(b)", &DEFAULT_ENCODER_OPTIONS).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(f.num_vars(), 3);
        assert_eq!(f.terms()[0][0].index, f.terms()[1][0].index);
        assert!(f.terms()[1][0].negated);
    }

    #[test]
    fn test_empty_clause_is_one() {
        let (f, index) = encode_text("()", &DEFAULT_ENCODER_OPTIONS).unwrap();
        assert!(index.is_empty());
        assert_eq!(f.eval(Array1::zeros(0).view()), 1.0);
    }

    #[test]
    fn test_empty_formula_is_zero() {
        let (f, _) = encode_text("", &DEFAULT_ENCODER_OPTIONS).unwrap();
        assert_eq!(f.eval(Array1::zeros(0).view()), 0.0);
    }

    #[test]
    fn test_clamping() {
        let (f, _) = encode_text("(a)", &DEFAULT_ENCODER_OPTIONS).unwrap();
        assert_eq!(f.eval(arr1(&[2.0]).view()), 0.0);
        assert_eq!(f.eval(arr1(&[-1.0]).view()), 1.0);
        let g = f.unclamped();
        assert_eq!(g.eval(arr1(&[2.0]).view()), 1.0);
        assert_eq!(g.eval(arr1(&[-1.0]).view()), 4.0);
    }

    #[test]
    fn test_sigmoid_shares_index() {
        let text = "(x|!y)&(y|z)";
        let (_, dnf_index) = encode_text(text, &DEFAULT_ENCODER_OPTIONS).unwrap();
        let options = EncoderOptions {
            encoding: Encoding::sigmoid(),
            ..DEFAULT_ENCODER_OPTIONS
        };
        let (f, sigmoid_index) = encode_text(text, &options).unwrap();
        assert_eq!(dnf_index, sigmoid_index);

        // Satisfying corner scores close to 1, a violating one clearly lower.
        let good = f.eval(arr1(&[1.0, 1.0, 1.0]).view());
        let bad = f.eval(arr1(&[0.0, 1.0, 0.0]).view());
        assert!((good - 1.0).abs() < 0.01, "good = {}", good);
        assert!(bad < good, "bad = {}, good = {}", bad, good);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "point dimension must match")]
    fn test_dimension_mismatch_is_caught_in_debug() {
        let (f, _) = encode_text("(a|b)", &DEFAULT_ENCODER_OPTIONS).unwrap();
        f.eval(arr1(&[0.0, 0.0, 0.0]).view());
    }

    #[test]
    fn test_rect() {
        assert!((rect(0.5, 5.0) - 0.5).abs() < 1e-12);
        assert!(rect(1.0, 5.0) > 0.99);
        assert!(rect(0.0, 5.0) < 0.01);
    }

    #[quickcheck]
    fn index_is_bijection(cnf: SmallCnf) -> bool {
        let (_, index) = encode(&cnf.0, &DEFAULT_ENCODER_OPTIONS);
        let names = cnf.0.variables();
        index.len() == names.len()
            && names.iter().enumerate().all(|(i, name)| index.index_of(name) == Some(i))
            && (0..index.len()).all(|i| index.name_of(i).and_then(|n| index.index_of(n)) == Some(i))
    }

    #[quickcheck]
    fn encoding_is_deterministic(cnf: SmallCnf, raw: Vec<u16>) -> bool {
        let (f, index1) = encode(&cnf.0, &DEFAULT_ENCODER_OPTIONS);
        let (g, index2) = encode(&cnf.0, &DEFAULT_ENCODER_OPTIONS);
        let x = point_from(&raw, f.num_vars());
        index1 == index2 && f.eval(x.view()) == g.eval(x.view())
    }

    #[quickcheck]
    fn dnf_is_non_negative(cnf: SmallCnf, raw: Vec<u16>, clamp: bool) -> bool {
        let options = EncoderOptions {
            clamp_inputs: clamp,
            ..DEFAULT_ENCODER_OPTIONS
        };
        let (f, _) = encode(&cnf.0, &options);
        f.eval(point_from(&raw, f.num_vars()).view()) >= 0.0
    }

    #[quickcheck]
    fn dnf_vanishes_exactly_on_models(cnf: SmallCnf, bits: Vec<bool>) -> bool {
        let (f, index) = encode(&cnf.0, &DEFAULT_ENCODER_OPTIONS);
        let values = (0..index.len()).map(|i| bits.get(i).copied().unwrap_or(false)).collect_vec();
        let x: Array1<f64> = values.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect();
        (f.eval(x.view()) == 0.0) == cnf.0.is_satisfied_by(&index, &values)
    }
}
