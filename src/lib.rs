pub mod astro;
pub mod config;
pub mod consts;
pub mod error;
pub mod file;
pub mod frames;
pub mod math;
pub mod model;
pub mod orrery;

pub use error::{Error, Result};
