pub mod adapters;
pub mod config;
pub mod controllers;
pub mod error;
pub mod listing;
pub mod session;
