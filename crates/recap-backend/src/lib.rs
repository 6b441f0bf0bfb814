//! Backend runtime entry point and public API surface.
//!
//! This crate owns the backend lifecycle, routes bridge messages to services,
//! and manages shared state used by asynchronous tasks. The host surface
//! supplies a [`page::PageProvider`] describing how the active media page is
//! reached; everything else is wired internally.

mod app;
mod config;
pub mod page;
mod runtime;
mod services;
mod state;

pub use crate::runtime::run;
