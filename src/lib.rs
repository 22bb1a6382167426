pub mod api;
pub mod client;
pub mod config;
pub mod display;
pub mod filter;
pub mod poll;
pub mod session;
pub mod view;

pub use self::{client::Client, config::Config, session::Session};
