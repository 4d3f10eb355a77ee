use std::rc::Rc;

use nalgebra::Vector3;

use crate::astro::rotation::{RotationModel, SharedRotationModel};
use crate::model::FrameTree;

/// A star, fixed in place in universal coordinates.
#[derive(Clone)]
pub struct Star {
    name: String,
    position: Vector3<f64>,
    rotation_model: SharedRotationModel,
    pub(super) frame_tree: Option<FrameTree>,
}

impl Star {
    pub fn new(name: &str, position: Vector3<f64>, rotation_model: SharedRotationModel) -> Self {
        Self {
            name: name.to_owned(),
            position,
            rotation_model,
            frame_tree: None,
        }
    }

    /// A star that doesn't rotate.
    pub fn fixed(name: &str, position: Vector3<f64>) -> Self {
        Self::new(name, position, Rc::new(RotationModel::identity()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn rotation_model(&self) -> &SharedRotationModel {
        &self.rotation_model
    }

    pub fn frame_tree(&self) -> Option<&FrameTree> {
        self.frame_tree.as_ref()
    }
}

/// A galaxy, nebula or cluster. Only its position matters here.
#[derive(Debug, Clone)]
pub struct DeepSkyObject {
    pub name: String,
    pub position: Vector3<f64>,
}

impl DeepSkyObject {
    pub fn new(name: &str, position: Vector3<f64>) -> Self {
        Self {
            name: name.to_owned(),
            position,
        }
    }
}
