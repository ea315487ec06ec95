pub mod archiver;

pub use archiver::{ArchiveOutcome, Archiver};
