pub mod api_model;
pub mod fare_zone;
pub mod route_map;
pub mod service;
pub mod stop;

pub use api_model::*;
pub use fare_zone::*;
pub use route_map::*;
pub use service::*;
pub use stop::*;
