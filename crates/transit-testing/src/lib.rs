//! Testing utilities and harness for the transit layout animations proxy

pub mod testing;

// Re-export testing utilities
pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
}
