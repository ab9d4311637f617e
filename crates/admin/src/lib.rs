//! Solstice Admin library.
//!
//! This crate provides the admin panel functionality as a library,
//! allowing it to be tested and reused (the CLI links it for admin
//! account management).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
