//! File I/O, normalization, and serialization for the kpiscope pipeline.

mod domain;
mod error;
mod normalize;
mod reader;
mod writer;

pub use domain::{ExperimentName, RawTable};
pub use error::IoError;
pub use normalize::{NormalizeOptions, TableShape, detect_shape, normalize};
pub use reader::TableReader;
pub use writer::ResultWriter;
