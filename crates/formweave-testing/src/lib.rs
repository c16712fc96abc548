//! Testing utilities and harness for formweave

pub mod probe;
pub mod testing;

// Re-export testing utilities
pub use probe::*;
pub use testing::*;

pub mod prelude {
    pub use crate::probe::*;
    pub use crate::testing::*;
}
