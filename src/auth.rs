//! Consumer identity, credential pairs, and redacted secret material.

pub mod credential;
pub mod secret;

pub use credential::*;
pub use secret::*;
