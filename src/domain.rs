pub mod error;
pub mod id;
pub mod models;
pub mod repository;
