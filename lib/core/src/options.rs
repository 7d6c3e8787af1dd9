use crate::encoder::{EncoderOptions, Encoding};
use crate::search::{SearchOptions, DEFAULT_SEARCH_OPTIONS};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Options {
    pub encoding: Encoding,
    /// Clip points to the unit cube before evaluating the objective.
    pub clamp_inputs: bool,
    /// Record every accepted optimizer step.
    pub trace_steps: bool,
    /// Search parameters. `minimize` is decided per run by the classifier.
    pub search: SearchOptions,
}

pub const DEFAULT_OPTIONS: Options = Options {
    encoding: Encoding::Dnf,
    clamp_inputs: true,
    trace_steps: false,
    search: DEFAULT_SEARCH_OPTIONS,
};

impl Default for Options {
    fn default() -> Self {
        DEFAULT_OPTIONS
    }
}

impl Options {
    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            encoding: self.encoding,
            clamp_inputs: self.clamp_inputs,
        }
    }
}
