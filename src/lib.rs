//! Search GitHub users and browse their public repositories.
//!
//! The library holds everything except the window: configuration, the
//! GitHub client, and the two view state machines driven by [`explorer::Explorer`].

pub mod avatar;
pub mod client;
pub mod config;
pub mod error;
pub mod explorer;
pub mod logging;
pub mod models;
pub mod notify;
pub mod repos;
pub mod search;

pub use config::Config;
pub use explorer::{Explorer, ExplorerSnapshot, Presenter};
