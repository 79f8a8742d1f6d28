pub mod config;
pub mod usecase;
