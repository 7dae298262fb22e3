//! Core askgem library (formatter, requester, providers, config, page rendering).

pub mod config;
pub mod format;
pub mod page;
pub mod providers;
pub mod requester;
pub mod submit;
pub mod theme;
