pub mod config;
pub mod db;
pub mod likes;
pub mod pipeline;
pub mod quote;
pub mod routes;
pub mod server;

pub mod error;
pub mod logger;
