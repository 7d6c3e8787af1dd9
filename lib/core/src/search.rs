//! Derivative-free coordinate pattern search with a saddle-point escape probe.
//!
//! Each sweep evaluates `x ± s_i e_i` for every dimension `i` in order and moves to the
//! better of the two when it strictly improves. A dimension that keeps improving in the same direction doubles its
//! step (capped at `1`), and a dimension that fails halves it. Once some step falls below
//! `min_step`, the search probes simultaneous `±1e-3` perturbations of all pairs and then
//! all triples of dimensions. Any improvement resumes sweeping, otherwise the point is a
//! local minimum and the search has converged.
//!
//! Without a configured ceiling the search runs until convergence, however long that takes.

use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, info, trace, warn};
use ndarray::{Array1, ArrayView1};

use crate::trace::{Step, StepSink};
use crate::utils::product_repeat;

/// Magnitude of the simultaneous perturbations tried by the saddle probe.
pub const SADDLE_PROBE_STEP: f64 = 1e-3;

/// Largest number of dimensions perturbed together by the saddle probe.
pub const SADDLE_PROBE_MAX_ORDER: usize = 3;

const PROBE_SIGNS: [f64; 2] = [-1.0, 1.0];

/// Scalar function over `R^n`. Must be deterministic.
pub trait Objective {
    fn eval(&self, x: ArrayView1<f64>) -> f64;
}

impl<F> Objective for F
where
    F: Fn(ArrayView1<f64>) -> f64,
{
    fn eval(&self, x: ArrayView1<f64>) -> f64 {
        self(x)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SearchOptions {
    /// Step size below which a failing dimension triggers the saddle probe.
    pub min_step: f64,
    /// Minimize when `true`, maximize otherwise.
    pub minimize: bool,
    pub max_evaluations: Option<u64>,
    pub timeout: Option<Duration>,
}

pub const DEFAULT_SEARCH_OPTIONS: SearchOptions = SearchOptions {
    min_step: 1e-6,
    minimize: true,
    max_evaluations: None,
    timeout: None,
};

impl Default for SearchOptions {
    fn default() -> Self {
        DEFAULT_SEARCH_OPTIONS
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Sweeping,
    Probing,
    Converged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    const fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopReason {
    EvaluationLimit,
    Timeout,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Converged,
    NotConverged(StopReason),
}

impl Display for SearchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStatus::Converged => write!(f, "converged"),
            SearchStatus::NotConverged(StopReason::EvaluationLimit) => {
                write!(f, "not converged (evaluation limit reached)")
            }
            SearchStatus::NotConverged(StopReason::Timeout) => write!(f, "not converged (timeout)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub point: Array1<f64>,
    /// Objective value at `point` (never negated, also when maximizing).
    pub value: f64,
    pub status: SearchStatus,
    pub evaluations: u64,
    pub accepted_steps: usize,
    pub probes: usize,
    pub time: Duration,
}

impl SearchOutcome {
    pub fn is_converged(&self) -> bool {
        self.status == SearchStatus::Converged
    }
}

/// Runs the pattern search from `start` without recording steps.
pub fn pattern_search<F>(objective: &F, start: Array1<f64>, options: &SearchOptions) -> SearchOutcome
where
    F: Objective + ?Sized,
{
    pattern_search_traced(objective, start, options, &mut ())
}

/// Runs the pattern search from `start`, recording the start point and every accepted step.
pub fn pattern_search_traced<F, S>(
    objective: &F,
    start: Array1<f64>,
    options: &SearchOptions,
    sink: &mut S,
) -> SearchOutcome
where
    F: Objective + ?Sized,
    S: StepSink + ?Sized,
{
    let start_time = Instant::now();
    let mut state = SearchState::new(objective, start, options, sink, start_time);

    debug!(
        "Starting pattern search in {} dimensions ({}), start value = {}",
        state.dims(),
        if options.minimize { "minimize" } else { "maximize" },
        state.unwrap(state.value)
    );

    let mut phase = if state.dims() == 0 {
        Phase::Converged
    } else {
        Phase::Sweeping
    };
    let status = loop {
        if phase == Phase::Converged {
            break SearchStatus::Converged;
        }
        if let Some(reason) = state.stop_reason() {
            break SearchStatus::NotConverged(reason);
        }
        phase = match phase {
            Phase::Sweeping => state.sweep(),
            Phase::Probing => state.probe(),
            Phase::Converged => unreachable!(),
        };
    };

    let outcome = SearchOutcome {
        value: state.unwrap(state.value),
        status,
        evaluations: state.evaluations,
        accepted_steps: state.accepted_steps,
        probes: state.probes,
        point: state.point,
        time: start_time.elapsed(),
    };
    match outcome.status {
        SearchStatus::Converged => info!(
            "Search converged after {} evaluations ({} steps, {} probes) in {:.3} s, value = {}",
            outcome.evaluations,
            outcome.accepted_steps,
            outcome.probes,
            outcome.time.as_secs_f64(),
            outcome.value
        ),
        SearchStatus::NotConverged(reason) => warn!(
            "Search stopped ({:?}) after {} evaluations ({} steps, {} probes) in {:.3} s, value = {}",
            reason,
            outcome.evaluations,
            outcome.accepted_steps,
            outcome.probes,
            outcome.time.as_secs_f64(),
            outcome.value
        ),
    }
    outcome
}

/// Flips the sign when maximizing, so that the search always minimizes.
fn wrap(y: f64, minimize: bool) -> f64 {
    if minimize {
        y
    } else {
        -y
    }
}

struct SearchState<'a, F: ?Sized, S: ?Sized> {
    objective: &'a F,
    options: &'a SearchOptions,
    sink: &'a mut S,
    start_time: Instant,
    point: Array1<f64>,
    // Value of the wrapped (possibly negated) objective at `point`.
    value: f64,
    step_sizes: Vec<f64>,
    last_direction: Vec<Option<Direction>>,
    evaluations: u64,
    accepted_steps: usize,
    probes: usize,
}

impl<'a, F, S> SearchState<'a, F, S>
where
    F: Objective + ?Sized,
    S: StepSink + ?Sized,
{
    fn new(objective: &'a F, start: Array1<f64>, options: &'a SearchOptions, sink: &'a mut S, start_time: Instant) -> Self {
        let n = start.len();
        let value = objective.eval(start.view());
        sink.record(Step {
            point: start.clone(),
            value,
        });
        Self {
            objective,
            options,
            sink,
            start_time,
            point: start,
            value: wrap(value, options.minimize),
            step_sizes: vec![1.0; n],
            last_direction: vec![None; n],
            evaluations: 1,
            accepted_steps: 0,
            probes: 0,
        }
    }

    fn dims(&self) -> usize {
        self.point.len()
    }

    fn evaluate(&mut self, x: ArrayView1<f64>) -> f64 {
        self.evaluations += 1;
        let y = self.objective.eval(x);
        trace!("f({}) = {}", x, y);
        wrap(y, self.options.minimize)
    }

    fn unwrap(&self, wrapped: f64) -> f64 {
        // Negation is its own inverse.
        wrap(wrapped, self.options.minimize)
    }

    fn stop_reason(&self) -> Option<StopReason> {
        if let Some(limit) = self.options.max_evaluations {
            if self.evaluations >= limit {
                return Some(StopReason::EvaluationLimit);
            }
        }
        if let Some(timeout) = self.options.timeout {
            if self.start_time.elapsed() >= timeout {
                return Some(StopReason::Timeout);
            }
        }
        None
    }

    /// Moves to `candidate` if it strictly improves on the current point.
    fn try_accept(&mut self, candidate: Array1<f64>) -> bool {
        let value = self.evaluate(candidate.view());
        self.accept_if_better(candidate, value)
    }

    fn accept_if_better(&mut self, candidate: Array1<f64>, value: f64) -> bool {
        if value >= self.value {
            return false;
        }
        self.point = candidate;
        self.value = value;
        self.accepted_steps += 1;
        let step = Step {
            point: self.point.clone(),
            value: self.unwrap(value),
        };
        self.sink.record(step);
        true
    }

    /// Evaluates both directions along `dim` and moves to the better one if it improves.
    ///
    /// On a tie between the two directions the positive one wins.
    fn try_dimension(&mut self, dim: usize) -> bool {
        let step_size = self.step_sizes[dim];
        let candidates = [Direction::Positive, Direction::Negative].map(|direction| {
            let mut candidate = self.point.clone();
            candidate[dim] += direction.sign() * step_size;
            let value = self.evaluate(candidate.view());
            (direction, candidate, value)
        });
        let Some((direction, candidate, value)) = candidates.into_iter().min_by(|a, b| a.2.total_cmp(&b.2)) else {
            return false;
        };
        if !self.accept_if_better(candidate, value) {
            return false;
        }
        if self.last_direction[dim] == Some(direction) {
            self.step_sizes[dim] = (step_size * 2.0).min(1.0);
        } else {
            self.last_direction[dim] = Some(direction);
        }
        true
    }

    /// One pass over all dimensions.
    ///
    /// Returns [`Phase::Probing`] as soon as a failing dimension has a step below `min_step`.
    fn sweep(&mut self) -> Phase {
        for dim in 0..self.dims() {
            if self.stop_reason().is_some() {
                return Phase::Sweeping;
            }
            if self.try_dimension(dim) {
                continue;
            }
            if self.step_sizes[dim] < self.options.min_step {
                debug!("Step of dimension {} fell below {}, probing", dim, self.options.min_step);
                return Phase::Probing;
            }
            self.step_sizes[dim] /= 2.0;
        }
        Phase::Sweeping
    }

    /// Saddle-point probe over pairs, then triples, of dimensions.
    ///
    /// Moves are enumerated as nested loops `for i, for s_i, for j > i, for s_j, ...`, i.e. in
    /// lexicographic order of `((i, s_i), (j, s_j), ...)` with the negative sign first.
    /// Returns [`Phase::Sweeping`] on the first improving perturbation and
    /// [`Phase::Converged`] when none exists.
    fn probe(&mut self) -> Phase {
        self.probes += 1;
        let n = self.dims();
        for order in 2..=SADDLE_PROBE_MAX_ORDER {
            let moves = (0..n).cartesian_product(PROBE_SIGNS);
            let perturbations = product_repeat(moves, order)
                .filter(|perturbation| perturbation.iter().tuple_windows().all(|(a, b)| a.0 < b.0));
            for perturbation in perturbations {
                if self.stop_reason().is_some() {
                    return Phase::Probing;
                }
                let mut candidate = self.point.clone();
                for &(d, s) in perturbation.iter() {
                    candidate[d] += s * SADDLE_PROBE_STEP;
                }
                if self.try_accept(candidate) {
                    debug!("Escaped along {:?} (value = {})", perturbation, self.unwrap(self.value));
                    return Phase::Sweeping;
                }
            }
        }
        debug!("No improving perturbation of up to {} dimensions", SADDLE_PROBE_MAX_ORDER);
        Phase::Converged
    }
}
