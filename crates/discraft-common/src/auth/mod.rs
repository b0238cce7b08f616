//! Credential handling

mod secret;

pub use secret::Secret;
