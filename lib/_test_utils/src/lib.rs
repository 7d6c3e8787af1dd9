use std::path::PathBuf;

use sat_relax::core::classify::{Classification, Classifier, Mode, Verdict};
use sat_relax::core::options::Options;

/// Formulas the default classifier finds a model for.
pub const SAT_FORMULAS: &[&str] = &[
    "(a|!b)&(!a|b)",
    "(!a|!b)&(a|b)",
    "(a)",
    "(a|b)&(!a)",
    "(a)&(!b)",
    "",
];

/// Unsatisfiable formulas: every corner violates some clause.
pub const UNSAT_FORMULAS: &[&str] = &[
    "(a|b)&(!a|!b)&(a|!b)&(!a|b)",
    "(a)&(!a)",
    "()",
    "(a|b)&()",
    "(!a | b | !c) & (a|!b | c) & (b | !c) & (c) & (!b)",
];

/// Directory with the on-disk clause files, split into `sat/` and `unsat/`.
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/data")
}

pub fn run_classifier(options: Options, formula: &str, mode: Mode) -> color_eyre::Result<Classification> {
    let classifier = Classifier::new(options);
    println!("Classifying '{}' ({:?})...", formula, mode);
    let classification = classifier.classify_text(formula, mode)?;
    println!("{}", classification);
    Ok(classification)
}

pub fn assert_verdict(classification: &Classification, expected: Verdict) {
    assert_eq!(
        classification.verdict(),
        expected,
        "unexpected verdict for '{}':\n{}",
        classification.formula,
        classification
    );
    assert!(
        classification.is_success() == classification.discrete_success,
        "rounded value and discrete semantics disagree for '{}'",
        classification.formula
    );
}
