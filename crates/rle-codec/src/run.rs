//! Runs and encoded streams.

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::CodecError;

/// A maximal stretch of identical quantized samples.
///
/// Serializes positionally as `[count, value]`. Deserialization also accepts
/// the named `{"V": value, "C": count}` shape and rejects counts below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RunRepr")]
pub struct Run {
    pub count: u32,
    pub value: i32,
}

impl Run {
    pub const fn new(count: u32, value: i32) -> Self {
        Self { count, value }
    }

    /// A run covering exactly one sample.
    pub const fn single(value: i32) -> Self {
        Self { count: 1, value }
    }

    /// Build a run from untrusted integers, rejecting non-positive counts.
    pub fn try_new(count: i64, value: i64) -> Result<Self, CodecError> {
        let count = u32::try_from(count)
            .ok()
            .filter(|&c| c > 0)
            .ok_or(CodecError::InvalidCount(count))?;
        let value = i32::try_from(value).map_err(|_| CodecError::ValueOutOfRange(value))?;
        Ok(Self { count, value })
    }
}

impl Serialize for Run {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.count)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// Accepted wire shapes for a single run.
#[derive(Deserialize)]
#[serde(untagged)]
enum RunRepr {
    Pair(i64, i64),
    Named {
        #[serde(rename = "V")]
        value: i64,
        #[serde(rename = "C")]
        count: i64,
    },
}

impl TryFrom<RunRepr> for Run {
    type Error = CodecError;

    fn try_from(repr: RunRepr) -> Result<Self, Self::Error> {
        match repr {
            RunRepr::Pair(count, value) | RunRepr::Named { value, count } => {
                Run::try_new(count, value)
            }
        }
    }
}

/// An ordered sequence of runs produced by the encoder.
///
/// Serializes transparently as a JSON array of `[count, value]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedStream(Vec<Run>);

impl EncodedStream {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap runs received from elsewhere. Use [`check_invariants`](Self::check_invariants)
    /// before trusting that they are maximal.
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self(runs)
    }

    pub fn runs(&self) -> &[Run] {
        &self.0
    }

    pub fn into_runs(self) -> Vec<Run> {
        self.0
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of samples the stream expands to.
    pub fn total_count(&self) -> u64 {
        self.0.iter().map(|run| u64::from(run.count)).sum()
    }

    /// Expand back to the flat symbol sequence.
    pub fn decode(&self) -> Result<Vec<i32>, CodecError> {
        crate::decode(&self.0)
    }

    /// Verify every count is positive and no neighbouring runs share a value.
    pub fn check_invariants(&self) -> Result<(), CodecError> {
        for (index, run) in self.0.iter().enumerate() {
            if run.count == 0 {
                return Err(CodecError::MalformedRun { index, count: 0 });
            }
        }
        for (index, pair) in self.0.windows(2).enumerate() {
            if pair[0].value == pair[1].value && pair[0].count < u32::MAX {
                return Err(CodecError::UnmergedRuns {
                    index: index + 1,
                    value: pair[1].value,
                });
            }
        }
        Ok(())
    }
}

impl From<EncodedStream> for Vec<Run> {
    fn from(stream: EncodedStream) -> Self {
        stream.0
    }
}

impl<'a> IntoIterator for &'a EncodedStream {
    type Item = &'a Run;
    type IntoIter = std::slice::Iter<'a, Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for EncodedStream {
    type Item = Run;
    type IntoIter = std::vec::IntoIter<Run>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
