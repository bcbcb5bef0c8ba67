//! Everything that leaves the process.
//!
//! - [`message`]: renders extracted sections into the chat message text
//! - [`webhook`]: posts that text to the incoming webhook

pub mod message;
pub mod webhook;
