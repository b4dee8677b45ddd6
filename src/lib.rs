// Library exports for SkillSwap
// This allows integration tests and the binary to share modules

pub mod auth;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod extractors;
pub mod repository;
pub mod routes;
pub mod state;
