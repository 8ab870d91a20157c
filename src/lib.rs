pub mod background_services;
pub mod config;
pub mod dal;
pub mod error;
pub mod matching;
pub mod model;
pub mod projection;
pub mod utils;
