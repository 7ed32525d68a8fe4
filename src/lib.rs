pub mod bdx;
pub mod compiler;
pub mod error;
pub mod midi;

pub use compiler::{ConvertOptions, Converter};
pub use error::Error;
