//! Chat command surface: parsing, dispatch and reply rendering.
//!
//! # Responsibility
//! - Parse raw text into a tagged [`parser::Command`].
//! - Match exhaustively over commands and route them to the service.
//!
//! # Invariants
//! - Parsing and validation failures become replies; they never propagate
//!   to the transport.

pub mod dispatcher;
pub mod parser;
pub mod replies;
