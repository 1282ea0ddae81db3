// Library surface shared by the binary and the integration tests.
pub mod api;
pub mod app;
pub mod app_dirs;
pub mod client;
pub mod config;
pub mod game;
pub mod leaderboard;
pub mod questions;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod store;
pub mod ui;
