//! Conductor Core
//!
//! Core types and wire formats shared by the conductor control-plane client.
//!
//! This crate contains:
//! - Domain types: log records and rendered log results
//! - DTOs: the log-forwarder envelope and its parser

pub mod domain;
pub mod dto;
