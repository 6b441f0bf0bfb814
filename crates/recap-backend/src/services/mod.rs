//! Backend service handlers for host-driven requests.
//!
//! This module groups async request handlers that operate on the shared
//! `AppContext`, perform side effects (sampling the page, network calls),
//! and emit results or notifications back to the host surface.

pub mod config_service;
pub mod summary_service;
pub mod transcript_service;
pub mod translation_service;

/// Represents a type that is used in all handlers as an application context.
pub(crate) type AppContextHandle = std::sync::Arc<crate::app::AppContext>;
