//! Data models shared across the handbook client.

pub mod user;

pub use user::{roles, UserProfile};
