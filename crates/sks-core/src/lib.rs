//! Session and access-control core for the script-kill booking client.
//!
//! A single [`session::SessionStore`] is shared by the request pipeline
//! ([`api::ApiClient`]) and the navigation guard
//! ([`navigation::NavigationGuard`]); [`context::Context`] wires the three.

pub mod api;
pub mod config;
pub mod context;
pub mod logging;
pub mod navigation;
pub mod session;
pub mod storage;
