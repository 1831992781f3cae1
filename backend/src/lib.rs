//! POS Backend Library
//!
//! This library exposes the backend modules for use in tests and the binary.

pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
