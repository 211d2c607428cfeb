//! dockdeck - Docker dashboard for the terminal
//!
//! Lists containers, images, volumes and networks, runs lifecycle and
//! removal actions, and hosts a small command terminal. All runtime access
//! goes through the [`bridge::Bridge`] trait.

pub mod app;
pub mod bridge;
pub mod config;
pub mod controller;
pub mod core;
pub mod docker;
pub mod format;
pub mod state;
pub mod ui;
