//! Data models

pub mod message;
pub mod status;
