//! Request lifecycle core for a desktop translation panel.
//!
//! [`controller::TranslationController`] owns the single outstanding
//! translation request; the presentation layer drives it with submit/cancel
//! and renders the [`controller::StateSnapshot`]s it publishes. The same
//! controller is served over HTTP and WebSocket by [`routes`].

pub mod config_manager;
pub mod controller;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod translate;
pub mod translation_history;
pub mod websocket;
