//! Access token secrets and their lifetimes.

pub mod issued;
pub mod secret;
