//! Credential and token models: the signed assertion and issued access tokens.

pub mod assertion;
pub mod token;

pub use assertion::*;
pub use token::{issued::*, secret::*};
