pub mod anomaly;
pub mod frame;
pub mod geometry;
pub mod interpolation;
pub mod intervals;
pub mod kepler;
