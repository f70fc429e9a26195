//! # patientdb
//!
//! A concurrent patient-records server with:
//! - A line-delimited, `|`-separated text protocol over TCP
//! - One lightweight task per client connection
//! - Single-writer/multi-reader domain service enforcing email uniqueness
//! - Pluggable repository (in-memory by default)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (accept loop, one task per client)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ line
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Protocol Codec                             │
//! │           (line ⇄ Command / Response, no I/O)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Patient Service                             │
//! │      (validation, uniqueness, RwLock around storage)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌──────────────┐
//!               │  Repository  │
//!               │ (in-memory)  │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod model;
pub mod repository;
pub mod service;
pub mod seed;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{PatientDbError, Result};
pub use config::Config;
pub use model::{Patient, PatientFields};
pub use repository::{InMemoryPatientRepository, PatientRepository};
pub use service::PatientService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of patientdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
