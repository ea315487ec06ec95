pub mod name_extractor;

pub use name_extractor::{NameExtractor, Roster};
