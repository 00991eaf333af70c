pub mod capability;
pub mod error;
pub mod types;

// Flat re-exports; the crate is small enough that paths add nothing.
pub use capability::*;
pub use error::*;
pub use types::*;
