//! Classification of formulas: encode, search, round, and compare against the target value.

use std::fmt::{Display, Formatter};
use std::path::Path;

use itertools::Itertools;
use log::{info, warn};
use ndarray::Array1;
use snafu::ensure;

use crate::cnf::Cnf;
use crate::encoder::{encode, Relaxation, VarIndex};
use crate::error::{NonConvergenceSnafu, Result};
use crate::options::{Options, DEFAULT_OPTIONS};
use crate::search::{pattern_search_traced, SearchOptions, SearchStatus};
use crate::trace::Step;
use crate::utils::round_point;

/// Maximal distance from the target value still counted as a success.
pub const SUCCESS_TOLERANCE: f64 = 0.01;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Search for a satisfying assignment.
    FindModel,
    /// Search for a violating assignment (a refutation).
    FindCounterModel,
}

impl Mode {
    pub const fn from_find_model(find_model: bool) -> Self {
        if find_model {
            Mode::FindModel
        } else {
            Mode::FindCounterModel
        }
    }

    pub const fn finds_model(self) -> bool {
        matches!(self, Mode::FindModel)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    Refutable,
    Valid,
}

impl Verdict {
    pub const fn new(mode: Mode, success: bool) -> Self {
        match (mode, success) {
            (Mode::FindModel, true) => Verdict::Satisfiable,
            (Mode::FindModel, false) => Verdict::Unsatisfiable,
            (Mode::FindCounterModel, true) => Verdict::Refutable,
            (Mode::FindCounterModel, false) => Verdict::Valid,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Satisfiable => "SATISFIABLE",
            Verdict::Unsatisfiable => "UNSATISFIABLE",
            Verdict::Refutable => "REFUTABLE",
            Verdict::Valid => "VALID",
        };
        write!(f, "{}", s)
    }
}

/// Result of one classification run.
///
/// The verdict from the raw optimizer value and the verdict from the rounded point are kept
/// side by side: they can disagree when the relaxation fits the formula poorly.
#[derive(Debug, Clone)]
pub struct Classification {
    pub formula: String,
    pub mode: Mode,
    pub index: VarIndex,
    pub target: f64,

    pub point: Array1<f64>,
    pub value: f64,
    pub raw_success: bool,
    pub raw_verdict: Verdict,

    pub rounded_point: Array1<f64>,
    pub rounded_value: f64,
    pub rounded_success: bool,
    pub rounded_verdict: Verdict,

    /// Whether the rounded assignment reaches the goal of `mode` under plain CNF semantics.
    pub discrete_success: bool,

    pub status: SearchStatus,
    pub evaluations: u64,
    pub trace: Option<Vec<Step>>,
}

impl Classification {
    /// The externally consumed verdict: success of the rounded point.
    pub fn is_success(&self) -> bool {
        self.rounded_success
    }

    pub fn verdict(&self) -> Verdict {
        self.rounded_verdict
    }

    pub fn verdicts_agree(&self) -> bool {
        self.raw_verdict == self.rounded_verdict
    }

    /// Boolean reading of the best point: `x > 0.5` means true.
    pub fn assignment(&self) -> Vec<(&str, bool)> {
        self.index.iter().map(|(i, name)| (name, self.point[i] > 0.5)).collect()
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let outcome = |success: bool| if success { "success" } else { "failure" };
        writeln!(
            f,
            "Best solution at: {} with function value: {} (target={})",
            self.point, self.value, self.target
        )?;
        writeln!(
            f,
            "Variables: {}",
            self.index.iter().map(|(i, name)| format!("{}:{}", name, self.point[i])).join("; ")
        )?;
        writeln!(
            f,
            "Corresponding boolean inputs: {}",
            self.assignment().iter().map(|(name, b)| format!("{}:{}", name, b)).join("; ")
        )?;
        writeln!(
            f,
            "(Debug) Function value indicates {}; formula was thus classified as: {}",
            outcome(self.raw_success),
            self.raw_verdict
        )?;
        writeln!(
            f,
            "Rounded function value {} indicates {}; formula was classified as: {}",
            self.rounded_value,
            outcome(self.rounded_success),
            self.rounded_verdict
        )?;
        writeln!(f, "Search {} after {} evaluations", self.status, self.evaluations)?;
        write!(f, "Input cnf: {}", self.formula)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    options: Options,
}

impl Classifier {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Target value and search direction for the given mode.
    fn goal(&self, mode: Mode) -> (f64, bool) {
        let satisfied = self.options.encoding.satisfied_value();
        let violated = 1.0 - satisfied;
        let minimize_to_satisfy = satisfied < violated;
        match mode {
            Mode::FindModel => (satisfied, minimize_to_satisfy),
            Mode::FindCounterModel => (violated, !minimize_to_satisfy),
        }
    }

    pub fn classify_cnf(&self, cnf: &Cnf, mode: Mode) -> Classification {
        let (objective, index) = encode(cnf, &self.options.encoder_options());
        let (target, minimize) = self.goal(mode);
        let search_options = SearchOptions {
            minimize,
            ..self.options.search
        };
        let is_success = |y: f64| (y - target).abs() < SUCCESS_TOLERANCE;

        let start = Array1::zeros(index.len());
        let (outcome, trace) = if self.options.trace_steps {
            let mut steps = Vec::new();
            let outcome = pattern_search_traced(&objective, start, &search_options, &mut steps);
            (outcome, Some(steps))
        } else {
            (pattern_search_traced(&objective, start, &search_options, &mut ()), None)
        };

        let rounded_point = round_point(&outcome.point);
        let rounded_value = objective.eval(rounded_point.view());
        let discrete_success = discrete_check(cnf, &index, &rounded_point, mode);

        let raw_success = is_success(outcome.value);
        let rounded_success = is_success(rounded_value);
        let classification = Classification {
            formula: cnf.to_string(),
            mode,
            index,
            target,
            point: outcome.point,
            value: outcome.value,
            raw_success,
            raw_verdict: Verdict::new(mode, raw_success),
            rounded_point,
            rounded_value,
            rounded_success,
            rounded_verdict: Verdict::new(mode, rounded_success),
            discrete_success,
            status: outcome.status,
            evaluations: outcome.evaluations,
            trace,
        };

        info!(
            "Classified {} clauses over {} variables as {} (raw: {})",
            cnf.len(),
            classification.index.len(),
            classification.rounded_verdict,
            classification.raw_verdict
        );
        if !classification.verdicts_agree() {
            warn!(
                "Raw value {} and rounded value {} disagree",
                classification.value, classification.rounded_value
            );
        }
        if classification.rounded_success != classification.discrete_success {
            warn!("Rounded assignment does not match the discrete semantics");
        }
        classification
    }

    pub fn classify_text(&self, text: &str, mode: Mode) -> Result<Classification> {
        let cnf = Cnf::parse(text)?;
        Ok(self.classify_cnf(&cnf, mode))
    }

    pub fn classify_clause_file<P: AsRef<Path>>(&self, path: P, mode: Mode) -> Result<Classification> {
        let cnf = Cnf::from_clause_file(path)?;
        Ok(self.classify_cnf(&cnf, mode))
    }

    /// The encoder output for `cnf` under these options.
    pub fn relaxation(&self, cnf: &Cnf) -> (Relaxation, VarIndex) {
        encode(cnf, &self.options.encoder_options())
    }
}

fn discrete_check(cnf: &Cnf, index: &VarIndex, rounded_point: &Array1<f64>, mode: Mode) -> bool {
    let values = rounded_point.iter().map(|&x| x > 0.5).collect_vec();
    let satisfied = cnf.is_satisfied_by(index, &values);
    match mode {
        Mode::FindModel => satisfied,
        Mode::FindCounterModel => !satisfied,
    }
}

fn verdict_of(classification: Classification) -> Result<bool> {
    ensure!(
        classification.status == SearchStatus::Converged,
        NonConvergenceSnafu {
            evaluations: classification.evaluations,
        }
    );
    Ok(classification.is_success())
}

/// Classifies a formula in clause-text form with the default options.
///
/// Returns the success of the rounded point: satisfiable when `find_model`, refutable otherwise.
pub fn classify(formula: &str, find_model: bool) -> Result<bool> {
    let classification = Classifier::new(DEFAULT_OPTIONS).classify_text(formula, Mode::from_find_model(find_model))?;
    verdict_of(classification)
}

/// Same as [`classify`], for a line-based clause file.
pub fn classify_from_clause_file<P: AsRef<Path>>(path: P, find_model: bool) -> Result<bool> {
    let classification =
        Classifier::new(DEFAULT_OPTIONS).classify_clause_file(path, Mode::from_find_model(find_model))?;
    verdict_of(classification)
}

/// Same as [`classify`], with explicit options.
pub fn classify_with(formula: &str, find_model: bool, options: Options) -> Result<bool> {
    let classification = Classifier::new(options).classify_text(formula, Mode::from_find_model(find_model))?;
    verdict_of(classification)
}
