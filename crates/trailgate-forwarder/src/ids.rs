//! Identifier generation.

use thiserror::Error;
use uuid::{Builder, Uuid};

/// Identifier generation failure.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct IdError(pub String);

/// Source of event and wrapper identifiers.
pub trait IdGenerator: Send + Sync {
    /// Draw a fresh identifier.
    fn next_uuid(&self) -> Result<Uuid, IdError>;
}

/// Random version 4 UUIDs drawn from the OS random source.
///
/// A failing random source is an error for the record being built.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_uuid(&self) -> Result<Uuid, IdError> {
        let mut bytes = [0u8; 16];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| IdError(format!("random source unavailable: {}", e)))?;
        Ok(Builder::from_random_bytes(bytes).into_uuid())
    }
}
