//! Run-length encoding as a fold over a small accumulator.
//!
//! Every encoder entry point threads a [`RunAccumulator`] through the input.
//! Whether runs continue across grid boundaries is decided by
//! [`GridBoundary`]: `Merge` carries the accumulator over, `Split` closes the
//! open run before the next grid starts.

use serde::{Deserialize, Serialize};

use crate::run::{EncodedStream, Run};

/// Policy for runs that touch the end of one grid and the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridBoundary {
    /// Equal values on both sides of a boundary extend a single run.
    Merge,
    /// Every grid starts a fresh run.
    #[default]
    Split,
}

impl std::str::FromStr for GridBoundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(GridBoundary::Merge),
            "split" => Ok(GridBoundary::Split),
            other => Err(format!("unknown grid boundary policy '{}'", other)),
        }
    }
}

/// Fold state: the run still being extended plus the runs already completed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunAccumulator {
    open: Option<Run>,
    completed: Vec<Run>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one symbol.
    ///
    /// A run that reaches `u32::MAX` is completed and a new run with the same
    /// value is opened.
    #[must_use]
    pub fn push(mut self, symbol: i32) -> Self {
        match self.open.as_mut() {
            Some(run) if run.value == symbol && run.count < u32::MAX => run.count += 1,
            _ => {
                if let Some(done) = self.open.replace(Run::single(symbol)) {
                    self.completed.push(done);
                }
            }
        }
        self
    }

    /// Complete the open run, if any.
    #[must_use]
    pub fn close(mut self) -> Self {
        if let Some(done) = self.open.take() {
            self.completed.push(done);
        }
        self
    }

    /// Run currently being extended.
    pub fn open_run(&self) -> Option<&Run> {
        self.open.as_ref()
    }

    /// Runs completed so far.
    pub fn completed(&self) -> &[Run] {
        &self.completed
    }

    /// Close the open run and return the finished stream.
    pub fn finish(self) -> EncodedStream {
        EncodedStream::from_runs(self.close().completed)
    }
}

/// Encode any ordered symbol source.
pub fn encode_iter<I>(symbols: I) -> EncodedStream
where
    I: IntoIterator<Item = i32>,
{
    symbols
        .into_iter()
        .fold(RunAccumulator::new(), RunAccumulator::push)
        .finish()
}

/// Encode a flat symbol sequence into maximal runs.
///
/// An empty input yields an empty stream.
pub fn encode(symbols: &[i32]) -> EncodedStream {
    encode_iter(symbols.iter().copied())
}

/// Encode several grids into one stream, in order.
pub fn encode_grids<'a, I>(grids: I, boundary: GridBoundary) -> EncodedStream
where
    I: IntoIterator<Item = &'a [i32]>,
{
    grids
        .into_iter()
        .fold(RunAccumulator::new(), |acc, grid| {
            let acc = grid.iter().copied().fold(acc, RunAccumulator::push);
            match boundary {
                GridBoundary::Merge => acc,
                GridBoundary::Split => acc.close(),
            }
        })
        .finish()
}
