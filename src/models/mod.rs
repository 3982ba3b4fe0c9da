mod envelope;
mod file;
mod vector_store;

pub use envelope::*;
pub use file::*;
pub use vector_store::*;
