use std::ops::{BitOr, BitOrAssign};

use super::selection::BodyID;
use crate::astro::orbit::SharedOrbit;
use crate::astro::rotation::SharedRotationModel;
use crate::frames::SharedFrame;
use crate::model::{FrameTree, Timeline, TimelinePhase};

/// What kind of object a body is. Several classes may be combined into a mask.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct BodyClass(u32);

impl BodyClass {
    pub const PLANET: BodyClass = BodyClass(0x01);
    pub const MOON: BodyClass = BodyClass(0x02);
    pub const ASTEROID: BodyClass = BodyClass(0x04);
    pub const COMET: BodyClass = BodyClass(0x08);
    pub const SPACECRAFT: BodyClass = BodyClass(0x10);
    pub const INVISIBLE: BodyClass = BodyClass(0x20);
    pub const BARYCENTER: BodyClass = BodyClass(0x40);
    pub const DWARF_PLANET: BodyClass = BodyClass(0x100);
    pub const STELLAR: BodyClass = BodyClass(0x200);
    pub const SURFACE_FEATURE: BodyClass = BodyClass(0x400);
    pub const COMPONENT: BodyClass = BodyClass(0x800);
    pub const MINOR_MOON: BodyClass = BodyClass(0x1000);
    pub const DIFFUSE: BodyClass = BodyClass(0x2000);
    pub const UNKNOWN: BodyClass = BodyClass(0x10000);

    pub const fn empty() -> Self {
        BodyClass(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every class in `other` is also in `self`.
    pub const fn contains(self, other: BodyClass) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let class = match name.to_ascii_lowercase().as_str() {
            "planet" => Self::PLANET,
            "dwarfplanet" => Self::DWARF_PLANET,
            "moon" => Self::MOON,
            "minormoon" => Self::MINOR_MOON,
            "asteroid" => Self::ASTEROID,
            "comet" => Self::COMET,
            "spacecraft" => Self::SPACECRAFT,
            "invisible" => Self::INVISIBLE,
            "barycenter" => Self::BARYCENTER,
            "surfacefeature" => Self::SURFACE_FEATURE,
            "component" => Self::COMPONENT,
            "diffuse" => Self::DIFFUSE,
            "star" | "stellar" => Self::STELLAR,
            "unknown" => Self::UNKNOWN,
            _ => return None,
        };
        Some(class)
    }
}

impl BitOr for BodyClass {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        BodyClass(self.0 | rhs.0)
    }
}

impl BitOrAssign for BodyClass {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// All the immutable info about a body
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub name: String,
    /// km
    pub radius: f64,
    /// Radius of a sphere containing everything drawn for the body, km
    pub culling_radius: f64,
    pub classification: BodyClass,
    /// Whether the body reflects enough light to illuminate its neighbours
    pub secondary_illuminator: bool,
}

impl BodyInfo {
    pub fn new(name: &str, radius: f64) -> Self {
        Self {
            name: name.to_owned(),
            radius,
            culling_radius: radius,
            classification: BodyClass::UNKNOWN,
            secondary_illuminator: false,
        }
    }

    pub fn with_class(mut self, classification: BodyClass) -> Self {
        self.classification = classification;
        self
    }
}

pub struct Body {
    pub(super) id: BodyID,
    pub(super) info: BodyInfo,
    pub(super) timeline: Timeline,
    pub(super) frame_tree: Option<FrameTree>,
}

impl Body {
    pub fn id(&self) -> BodyID {
        self.id
    }

    pub fn info(&self) -> &BodyInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn frame_tree(&self) -> Option<&FrameTree> {
        self.frame_tree.as_ref()
    }

    pub fn phase(&self, t: f64) -> &TimelinePhase {
        self.timeline.find_phase(t)
    }

    pub fn orbit_frame(&self, t: f64) -> &SharedFrame {
        self.phase(t).orbit_frame()
    }

    pub fn body_frame(&self, t: f64) -> &SharedFrame {
        self.phase(t).body_frame()
    }

    pub fn orbit(&self, t: f64) -> &SharedOrbit {
        self.phase(t).orbit()
    }

    pub fn rotation_model(&self, t: f64) -> &SharedRotationModel {
        self.phase(t).rotation_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mask() {
        let mut mask = BodyClass::empty();
        assert!(mask.is_empty());
        mask |= BodyClass::PLANET;
        mask |= BodyClass::MOON | BodyClass::COMET;
        assert!(mask.contains(BodyClass::PLANET | BodyClass::COMET));
        assert!(!mask.contains(BodyClass::SPACECRAFT));
        assert_eq!(mask.bits(), 0x0b);

        assert_eq!(BodyClass::from_name("DwarfPlanet"), Some(BodyClass::DWARF_PLANET));
        assert_eq!(BodyClass::from_name("teapot"), None);
    }
}
