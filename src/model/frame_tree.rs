use std::rc::Rc;

use crate::model::timeline::TimelinePhase;
use crate::orrery::{BodyClass, Selection};

/// Aggregate extent of everything orbiting in a frame tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTreeBounds {
    /// Radius of a sphere around the owner containing every descendant, km
    pub radius: f64,
    pub max_child_radius: f64,
    pub child_class_mask: BodyClass,
    pub contains_secondary_illuminators: bool,
}

impl Default for FrameTreeBounds {
    fn default() -> Self {
        Self {
            radius: 0.0,
            max_child_radius: 0.0,
            child_class_mask: BodyClass::empty(),
            contains_secondary_illuminators: false,
        }
    }
}

/// The phases whose orbit frame is centered on one object.
///
/// The tree only stores bookkeeping. Working out the bounds needs the bodies
/// themselves, so that happens in [crate::orrery::Orrery].
#[derive(Clone)]
pub struct FrameTree {
    owner: Selection,
    children: Vec<Rc<TimelinePhase>>,
    changed: bool,
    bounds: FrameTreeBounds,
}

impl FrameTree {
    pub fn new(owner: Selection) -> Self {
        Self {
            owner,
            children: vec![],
            changed: true,
            bounds: FrameTreeBounds::default(),
        }
    }

    pub fn owner(&self) -> Selection {
        self.owner
    }

    pub fn children(&self) -> &[Rc<TimelinePhase>] {
        &self.children
    }

    pub fn add_child(&mut self, phase: Rc<TimelinePhase>) {
        self.children.push(phase);
        self.changed = true;
    }

    /// Returns whether the phase was found.
    pub fn remove_child(&mut self, phase: &Rc<TimelinePhase>) -> bool {
        match self.children.iter().position(|p| Rc::ptr_eq(p, phase)) {
            Some(idx) => {
                self.children.remove(idx);
                self.changed = true;
                true
            }
            None => false,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub(crate) fn clear_changed(&mut self) {
        self.changed = false;
    }

    pub fn bounds(&self) -> &FrameTreeBounds {
        &self.bounds
    }

    pub(crate) fn set_bounds(&mut self, bounds: FrameTreeBounds) {
        self.bounds = bounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::Vector3;

    use crate::astro::orbit::{FixedOrbit, Orbit};
    use crate::astro::rotation::RotationModel;
    use crate::frames::ReferenceFrame;
    use crate::orrery::BodyID;

    fn phase(id: usize) -> Rc<TimelinePhase> {
        let frame = Rc::new(ReferenceFrame::j2000_ecliptic(Selection::None));
        Rc::new(TimelinePhase::unbounded(
            BodyID(id),
            frame.clone(),
            Rc::new(Orbit::Fixed(FixedOrbit::new(Vector3::zeros()))),
            frame,
            Rc::new(RotationModel::identity()),
        ))
    }

    #[test]
    fn test_children_by_identity() {
        let mut tree = FrameTree::new(Selection::None);
        assert!(tree.is_changed());
        tree.clear_changed();

        let a = phase(0);
        let b = phase(0);
        tree.add_child(a.clone());
        tree.add_child(b.clone());
        assert!(tree.is_changed());
        tree.clear_changed();

        // Same contents, different allocation
        assert!(!tree.remove_child(&phase(0)));
        assert!(!tree.is_changed());

        assert!(tree.remove_child(&a));
        assert!(tree.is_changed());
        assert_eq!(tree.children().len(), 1);
        assert!(Rc::ptr_eq(&tree.children()[0], &b));
    }
}
