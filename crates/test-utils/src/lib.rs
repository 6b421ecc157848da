//! Shared test utilities for the cloud-texture workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic GRIB2 messages shaped like NOMADS cloud cover products
//! - Cloud cover grid generators
//! - Test data path helpers and a skip macro for optional sample files
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;
pub mod grib;
pub mod paths;

pub use generators::*;
pub use grib::*;
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// # Usage
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_real_gfs_file() {
///     let path = require_test_file!("gfs_hcdc.grib2");
///     // Test code using path...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Download test data or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}
