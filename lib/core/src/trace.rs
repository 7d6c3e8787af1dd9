//! Recording of accepted optimizer steps, and plot data for two-variable objectives.

use std::io::{self, Write};

use itertools::Itertools;
use ndarray::{arr1, Array1};

use crate::search::Objective;

/// One accepted point of a search, with its (un-negated) objective value.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub point: Array1<f64>,
    pub value: f64,
}

pub trait StepSink {
    fn record(&mut self, step: Step);
}

impl StepSink for Vec<Step> {
    fn record(&mut self, step: Step) {
        self.push(step);
    }
}

// No tracing.
impl StepSink for () {
    fn record(&mut self, _step: Step) {}
}

/// Writes one line `index value x0 x1 ...` per step, after a commented header.
pub fn write_trace<W: Write>(writer: &mut W, steps: &[Step]) -> io::Result<()> {
    writeln!(writer, "# step value point...")?;
    for (i, step) in steps.iter().enumerate() {
        writeln!(writer, "{} {} {}", i, step.value, step.point.iter().join(" "))?;
    }
    Ok(())
}

/// Samples a two-variable objective on a `density x density` grid over `[0, 1]^2`.
///
/// Returns `(x, y, z)` triples in row-major order (`y` outer, `x` inner).
pub fn sample_surface<F>(objective: &F, density: usize) -> Vec<(f64, f64, f64)>
where
    F: Objective + ?Sized,
{
    let axis = linspace(density);
    let mut samples = Vec::with_capacity(density * density);
    for &y in axis.iter() {
        for &x in axis.iter() {
            let z = objective.eval(arr1(&[x, y]).view());
            samples.push((x, y, z));
        }
    }
    samples
}

pub fn write_surface<W: Write>(writer: &mut W, samples: &[(f64, f64, f64)]) -> io::Result<()> {
    writeln!(writer, "# x y z")?;
    for &(x, y, z) in samples.iter() {
        writeln!(writer, "{} {} {}", x, y, z)?;
    }
    Ok(())
}

fn linspace(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..n).map(|i| i as f64 / (n - 1) as f64).collect(),
    }
}
