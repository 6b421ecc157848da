//! Float to integer sample quantization.

/// Truncate a decoded sample toward zero.
///
/// `3.9` becomes `3` and `-3.9` becomes `-3`. Out-of-range input saturates at
/// the `i32` bounds and NaN (a GRIB2 missing value) becomes `0`.
#[inline]
pub fn quantize(sample: f32) -> i32 {
    sample as i32
}

/// Quantize every sample of a grid, preserving order.
pub fn quantize_all(samples: &[f32]) -> Vec<i32> {
    samples.iter().map(|&s| quantize(s)).collect()
}
