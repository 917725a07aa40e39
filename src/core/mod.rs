pub mod driver;
pub mod error;

pub use driver::{run, Stage, Summary};
pub use error::{ExportError, RecordError};
