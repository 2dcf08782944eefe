//! Line-oriented console front end: parses commands, drives a [`Game`],
//! and renders replies as text or JSON.
//!
//! [`Game`]: crate::engine::Game

pub mod commands;
pub mod models;
pub mod session;

pub use commands::{Command, CommandError};
pub use session::{Reply, Session};
