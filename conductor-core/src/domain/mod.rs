//! Core domain types
//!
//! Structures shared between the network client and the command-line surface.
//! They carry no I/O and no wire-format knowledge.

pub mod log;
