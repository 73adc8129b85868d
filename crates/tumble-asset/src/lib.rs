//! File formats read and written by the **tumble** viewer.
//!
//! This crate is intentionally dependency-free so the model loader and the
//! image encoders can be tested without a GPU, a window, or any engine code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | `ParseError`, `ModelError`, `PpmError` |
//! | [`model`] | `ModelData`, vertex layout constants, `parse_model` / `load_model` |
//! | [`ppm`] | binary `P6` encoder with row-order handling |
//! | [`sequence`] | numbered output file naming |
//!
//! # Quick start
//!
//! ```rust
//! use tumble_asset::parse_model;
//!
//! let src = "8\n0 0 0  0 0  0 0 1\n";
//! let model = parse_model(src).unwrap();
//! assert_eq!(model.vertex_count(), 1);
//! ```

pub mod error;
pub mod model;
pub mod ppm;
pub mod sequence;

pub use error::{ModelError, ParseError, PpmError};
pub use model::{load_model, parse_model, ModelData, VertexView};
pub use ppm::{encode_ppm, write_ppm, RowOrder};
pub use sequence::FrameSequence;
