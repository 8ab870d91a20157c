pub mod route_map_builder;
pub mod route_map_export;

pub use route_map_builder::*;
pub use route_map_export::*;
