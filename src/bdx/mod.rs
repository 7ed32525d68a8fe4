//! BDX song format: layout, validation and reading

pub mod header;
pub mod info;
pub mod part;
pub mod reader;

pub use info::SongInfo;
pub use part::{ChordStyle, Part, PartKind};
pub use reader::BdxReader;
