// src/lib.rs

//! Archive Gateway Library
//!
//! Read-only HTTP search API over archived web article indexes.

pub mod api;
pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod services;
pub mod utils;
