//! Data Transfer Objects for inter-service communication
//!
//! Wire formats spoken by services the conductor client consumes.

pub mod log;
