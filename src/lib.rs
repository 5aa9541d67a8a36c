// src/lib.rs

//! Feed publisher library: sanitize, audit and publish a ROM catalog feed.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
