pub mod analytics;
pub mod config;
pub mod content;
pub mod dashboard;
pub mod dates;
pub mod error;
pub mod invoice;
pub mod io;
pub mod model;
pub mod money;
pub mod status;
pub mod store;
pub mod team_map;
pub mod validation;
pub mod views;

pub use error::{Result, TileError};
