mod body;
#[allow(clippy::module_inception)]
mod orrery;
mod selection;
mod star;

pub use body::{Body, BodyClass, BodyInfo};
pub use orrery::Orrery;
pub use selection::{BodyID, DeepSkyID, Selection, StarID};
pub use star::{DeepSkyObject, Star};
