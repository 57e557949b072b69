//! Shared types and wire contracts.
//!
//! Every inbound live-stream event and REST response the client consumes has
//! an explicit type here; a payload missing a required field is a decode
//! error, never an undefined access.

pub mod errors;
pub mod events;
pub mod requests;
pub mod responses;

pub use errors::ChatError;
pub use events::*;
pub use requests::*;
pub use responses::*;
