// Library root for the notes service

pub mod core;
pub mod state;
pub mod auth;
pub mod api;
pub mod speller;
pub mod config;
