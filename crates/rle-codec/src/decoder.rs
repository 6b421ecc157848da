//! Run expansion.

use crate::error::CodecError;
use crate::run::Run;

/// Expand runs into the flat symbol sequence they encode.
///
/// Fails with [`CodecError::MalformedRun`] if any run has a zero count; no
/// output is produced in that case.
pub fn decode(runs: &[Run]) -> Result<Vec<i32>, CodecError> {
    let total = checked_total(runs)?;
    let mut out = Vec::with_capacity(total);
    expand(runs, &mut out);
    Ok(out)
}

/// Expand runs, appending to an existing buffer.
pub fn decode_into(runs: &[Run], out: &mut Vec<i32>) -> Result<(), CodecError> {
    let total = checked_total(runs)?;
    out.reserve(total);
    expand(runs, out);
    Ok(())
}

fn checked_total(runs: &[Run]) -> Result<usize, CodecError> {
    runs.iter().enumerate().try_fold(0usize, |total, (index, run)| {
        if run.count == 0 {
            return Err(CodecError::MalformedRun { index, count: 0 });
        }
        Ok(total.saturating_add(run.count as usize))
    })
}

fn expand(runs: &[Run], out: &mut Vec<i32>) {
    for run in runs {
        out.extend(std::iter::repeat(run.value).take(run.count as usize));
    }
}
