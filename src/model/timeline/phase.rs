use crate::astro::orbit::SharedOrbit;
use crate::astro::rotation::SharedRotationModel;
use crate::error::{Error, Result};
use crate::frames::SharedFrame;
use crate::orrery::BodyID;

/// One stretch of a body's history, over which its orbit, rotation and the
/// frames they are given in stay the same.
///
/// The phase covers `[start, end)`; a missing bound extends it forever in
/// that direction.
pub struct TimelinePhase {
    body: BodyID,
    start: Option<f64>,
    end: Option<f64>,
    orbit_frame: SharedFrame,
    orbit: SharedOrbit,
    body_frame: SharedFrame,
    rotation_model: SharedRotationModel,
}

impl TimelinePhase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        body: BodyID,
        start: Option<f64>,
        end: Option<f64>,
        orbit_frame: SharedFrame,
        orbit: SharedOrbit,
        body_frame: SharedFrame,
        rotation_model: SharedRotationModel,
    ) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if !(end > start) {
                return Err(Error::InvalidPhaseInterval { start, end });
            }
        }

        Ok(Self {
            body,
            start,
            end,
            orbit_frame,
            orbit,
            body_frame,
            rotation_model,
        })
    }

    /// A phase that lasts forever.
    pub fn unbounded(
        body: BodyID,
        orbit_frame: SharedFrame,
        orbit: SharedOrbit,
        body_frame: SharedFrame,
        rotation_model: SharedRotationModel,
    ) -> Self {
        Self {
            body,
            start: None,
            end: None,
            orbit_frame,
            orbit,
            body_frame,
            rotation_model,
        }
    }

    pub fn body(&self) -> BodyID {
        self.body
    }

    pub fn start(&self) -> Option<f64> {
        self.start
    }

    pub fn end(&self) -> Option<f64> {
        self.end
    }

    pub(super) fn start_or_min(&self) -> f64 {
        self.start.unwrap_or(f64::NEG_INFINITY)
    }

    pub(super) fn end_or_max(&self) -> f64 {
        self.end.unwrap_or(f64::INFINITY)
    }

    pub fn includes(&self, t: f64) -> bool {
        self.start_or_min() <= t && t < self.end_or_max()
    }

    pub fn clamp_time(&self, t: f64) -> f64 {
        t.max(self.start_or_min()).min(self.end_or_max())
    }

    pub fn orbit_frame(&self) -> &SharedFrame {
        &self.orbit_frame
    }

    pub fn orbit(&self) -> &SharedOrbit {
        &self.orbit
    }

    pub fn body_frame(&self) -> &SharedFrame {
        &self.body_frame
    }

    pub fn rotation_model(&self) -> &SharedRotationModel {
        &self.rotation_model
    }
}
