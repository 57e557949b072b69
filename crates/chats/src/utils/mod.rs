//! Authorization and validation helpers.

pub mod permissions;
pub mod validation;

pub use permissions::*;
pub use validation::*;
