pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod moderation;
pub mod names;
pub mod ranking;
pub mod record_store;
pub mod result_validation;
pub mod service;
pub mod types;
