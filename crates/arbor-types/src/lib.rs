//! Foundation types for Arbor.
//!
//! Every other Arbor crate depends on `arbor-types`. The types here carry no
//! storage logic; they only name things.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`Signature`] -- Author name, email and timestamp recorded on a commit

pub mod error;
pub mod object;
pub mod signature;

pub use error::TypeError;
pub use object::ObjectId;
pub use signature::Signature;
