//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep command handling and scheduling decoupled from storage details.

pub mod birthday_service;
