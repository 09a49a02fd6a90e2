//! Leetmigo API Library Crate
//!
//! This library contains the web service around the decision map: the
//! application state, the in-memory session store, API handlers and routing.
//! The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod sessions;
pub mod state;
