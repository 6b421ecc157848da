//! Run-length codec for quantized forecast grids.
//!
//! Decoded grid samples are truncated to integers ([`quantize`]) and the
//! resulting symbol stream is collapsed into maximal `(count, value)` runs
//! ([`encode`]). [`decode`] expands runs back into the flat sequence.
//!
//! ```
//! use rle_codec::{decode, encode, quantize_all, Run};
//!
//! let symbols = quantize_all(&[3.2, 3.9, 3.0, 7.5, 7.1, 2.8]);
//! let stream = encode(&symbols);
//! assert_eq!(stream.runs(), &[Run::new(3, 3), Run::new(2, 7), Run::new(1, 2)]);
//! assert_eq!(decode(stream.runs()).unwrap(), symbols);
//! ```

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod quantize;
pub mod run;
pub mod wire;

pub use decoder::{decode, decode_into};
pub use encoder::{encode, encode_grids, encode_iter, GridBoundary, RunAccumulator};
pub use error::CodecError;
pub use quantize::{quantize, quantize_all};
pub use run::{EncodedStream, Run};
pub use wire::{NamedRun, RunShape, ShapedRuns};
