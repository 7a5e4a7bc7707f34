pub mod classify;
pub mod cli;
pub mod config;
pub mod convert;
pub mod download;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod profile;
pub mod staging;
pub mod state;
pub mod tools;
pub mod upload;
pub mod util;
