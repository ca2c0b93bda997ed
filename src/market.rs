//! Marketplace-domain identifiers and the commission policy model.

pub mod id;
pub mod policy;

pub use id::*;
pub use policy::*;
