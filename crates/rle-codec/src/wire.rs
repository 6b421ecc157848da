//! JSON shapes for encoded streams.
//!
//! Consumers read runs either positionally (`[count, value]`) or as named
//! objects (`{"V": value, "C": count}`). The field names are part of the
//! contract and must not change.

use serde::{Deserialize, Serialize, Serializer};

use crate::run::{EncodedStream, Run};

/// Serialized layout of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunShape {
    /// `[count, value]`
    #[default]
    Pairs,
    /// `{"V": value, "C": count}`
    Named,
}

impl std::str::FromStr for RunShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pairs" => Ok(RunShape::Pairs),
            "named" => Ok(RunShape::Named),
            other => Err(format!("unknown run shape '{}'", other)),
        }
    }
}

/// Object form of a run, used for output.
///
/// Input in this shape is read through [`Run`], which validates the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamedRun {
    #[serde(rename = "V")]
    pub value: i32,
    #[serde(rename = "C")]
    pub count: u32,
}

impl From<Run> for NamedRun {
    fn from(run: Run) -> Self {
        Self {
            value: run.value,
            count: run.count,
        }
    }
}

/// An encoded stream paired with the shape it should serialize in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedRuns {
    pub shape: RunShape,
    pub stream: EncodedStream,
}

impl ShapedRuns {
    pub fn new(stream: EncodedStream, shape: RunShape) -> Self {
        Self { shape, stream }
    }
}

impl Serialize for ShapedRuns {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.shape {
            RunShape::Pairs => serializer.collect_seq(self.stream.runs()),
            RunShape::Named => {
                serializer.collect_seq(self.stream.runs().iter().map(|&run| NamedRun::from(run)))
            }
        }
    }
}
