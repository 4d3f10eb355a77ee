use nalgebra::{UnitQuaternion, Vector3};
use tracing::debug;

use super::body::{Body, BodyInfo};
use super::selection::{BodyID, DeepSkyID, Selection, StarID};
use super::star::{DeepSkyObject, Star};

use crate::astro::orbit::SharedOrbit;
use crate::astro::rotation::SharedRotationModel;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::frames::{ReferenceFrame, SharedFrame};
use crate::math::frame::FrameTransform;
use crate::model::{FrameTree, FrameTreeBounds, Timeline, TimelinePhase};

/// Owns every star, body and deep-sky object, and hands out handles to them.
///
/// Frames and phases refer to objects only by [Selection], so anything that
/// evaluates them needs the orrery as context.
pub struct Orrery {
    config: EngineConfig,
    stars: Vec<Star>,
    bodies: Vec<Body>,
    deep_sky: Vec<DeepSkyObject>,
    // Phases whose orbit frame isn't centered on a star or body
    root: FrameTree,
}

impl Default for Orrery {
    fn default() -> Self {
        Self::new()
    }
}

impl Orrery {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Orrery {
            config,
            stars: vec![],
            bodies: vec![],
            deep_sky: vec![],
            root: FrameTree::new(Selection::None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -- Construction --

    pub fn add_star(&mut self, star: Star) -> StarID {
        let id = StarID(self.stars.len());
        debug!("Adding star {:?} as {:?}", star.name(), id);
        self.stars.push(star);
        id
    }

    pub fn add_deep_sky(&mut self, object: DeepSkyObject) -> DeepSkyID {
        let id = DeepSkyID(self.deep_sky.len());
        self.deep_sky.push(object);
        id
    }

    /// The id the next call to [Self::add_body] will hand out. Frames that
    /// refer to a body before it exists need this.
    pub fn next_body_id(&self) -> BodyID {
        BodyID(self.bodies.len())
    }

    /// Adds a body with the given history. Every phase must belong to
    /// [Self::next_body_id], and every object its frames mention must already
    /// exist (or be the new body itself).
    ///
    /// Nothing is inserted if the frames are nested too deeply.
    pub fn add_body(&mut self, info: BodyInfo, timeline: Timeline) -> Result<BodyID> {
        let id = self.next_body_id();
        self.check_phases(id, &timeline)?;

        debug!("Adding body {:?} as {:?}", info.name, id);
        self.bodies.push(Body {
            id,
            info,
            timeline,
            frame_tree: None,
        });

        if let Err(err) = self.check_depth(id) {
            self.bodies.pop();
            return Err(err);
        }

        self.attach_phases(id);
        Ok(id)
    }

    /// Adds a body with a single phase that lasts forever.
    pub fn add_simple_body(
        &mut self,
        info: BodyInfo,
        orbit_frame: SharedFrame,
        orbit: SharedOrbit,
        body_frame: SharedFrame,
        rotation_model: SharedRotationModel,
    ) -> Result<BodyID> {
        let phase = TimelinePhase::unbounded(
            self.next_body_id(),
            orbit_frame,
            orbit,
            body_frame,
            rotation_model,
        );
        self.add_body(info, Timeline::single(phase))
    }

    /// Replaces the history of an existing body. On failure the old history
    /// stays in place.
    pub fn set_timeline(&mut self, id: BodyID, timeline: Timeline) -> Result<()> {
        self.check_phases(id, &timeline)?;

        let old = std::mem::replace(&mut self.bodies[id.0].timeline, timeline);
        if let Err(err) = self.check_depth(id) {
            self.bodies[id.0].timeline = old;
            return Err(err);
        }

        for phase in old.phases() {
            let owner = phase.orbit_frame().center();
            if let Some(tree) = self.existing_tree_mut(owner) {
                tree.remove_child(phase);
            }
            self.mark_changed(owner);
        }
        self.attach_phases(id);
        debug!("Replaced timeline of {:?}", id);
        Ok(())
    }

    fn check_phases(&self, id: BodyID, timeline: &Timeline) -> Result<()> {
        for phase in timeline.phases() {
            if phase.body() != id {
                return Err(Error::UnresolvedObject(format!(
                    "phase of {} given to {}",
                    Selection::Body(phase.body()),
                    Selection::Body(id)
                )));
            }

            for frame in [phase.orbit_frame(), phase.body_frame()].iter() {
                for selection in frame.selections() {
                    if !self.exists(selection) && selection != Selection::Body(id) {
                        return Err(Error::UnresolvedObject(selection.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_depth(&self, id: BodyID) -> Result<()> {
        let max = self.config.max_frame_depth;
        for phase in self.body(id).timeline.phases() {
            for frame in [phase.orbit_frame(), phase.body_frame()].iter() {
                let depth = frame.nesting_depth(self, 0, max);
                if depth > max {
                    debug!("Rejecting {:?}: frames nested {} deep", id, depth);
                    return Err(Error::FrameTooDeep { depth, max });
                }
            }
        }
        Ok(())
    }

    fn attach_phases(&mut self, id: BodyID) {
        let phases = self.bodies[id.0].timeline.phases().to_vec();
        for phase in phases {
            let owner = phase.orbit_frame().center();
            self.frame_tree_mut(owner).add_child(phase);
            self.mark_changed(owner);
        }
    }

    // -- Lookup --

    fn exists(&self, selection: Selection) -> bool {
        match selection {
            Selection::None => true,
            Selection::Star(id) => id.0 < self.stars.len(),
            Selection::Body(id) => id.0 < self.bodies.len(),
            Selection::DeepSky(id) => id.0 < self.deep_sky.len(),
        }
    }

    pub fn body(&self, id: BodyID) -> &Body {
        &self.bodies[id.0]
    }

    pub fn get_body(&self, id: BodyID) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn star(&self, id: StarID) -> &Star {
        &self.stars[id.0]
    }

    pub fn stars(&self) -> impl Iterator<Item = &Star> {
        self.stars.iter()
    }

    pub fn deep_sky(&self, id: DeepSkyID) -> &DeepSkyObject {
        &self.deep_sky[id.0]
    }

    /// Looks an object up by name. Bodies shadow stars, which shadow deep-sky
    /// objects.
    pub fn find(&self, name: &str) -> Selection {
        if let Some(body) = self.bodies.iter().find(|b| b.name() == name) {
            return Selection::Body(body.id);
        }
        if let Some(idx) = self.stars.iter().position(|s| s.name() == name) {
            return Selection::Star(StarID(idx));
        }
        if let Some(idx) = self.deep_sky.iter().position(|d| d.name == name) {
            return Selection::DeepSky(DeepSkyID(idx));
        }
        Selection::None
    }

    // -- Evaluation --

    /// Universal position of any object, km.
    pub fn position(&self, selection: Selection, t: f64) -> Vector3<f64> {
        match selection {
            Selection::None => Vector3::zeros(),
            Selection::Star(id) => self.star(id).position(),
            Selection::Body(id) => self.body_position(id, t),
            Selection::DeepSky(id) => self.deep_sky(id).position,
        }
    }

    /// Universal velocity of any object, km/day. Only bodies move.
    pub fn velocity(&self, selection: Selection, t: f64) -> Vector3<f64> {
        match selection {
            Selection::Body(id) => self.body_velocity(id, t),
            _ => Vector3::zeros(),
        }
    }

    pub fn body_position(&self, id: BodyID, t: f64) -> Vector3<f64> {
        let mut position = Vector3::zeros();
        let mut id = id;
        loop {
            let phase = self.body(id).phase(t);
            let frame = phase.orbit_frame();
            let local = phase.orbit().position(t);
            position += frame.orientation(self, t).inverse_transform_vector(&local);

            match frame.center() {
                Selection::Body(parent) => id = parent,
                other => return position + self.position(other, t),
            }
        }
    }

    pub fn body_velocity(&self, id: BodyID, t: f64) -> Vector3<f64> {
        let phase = self.body(id).phase(t);
        let frame = phase.orbit_frame();
        let q = frame.orientation(self, t);

        let mut velocity = q.inverse_transform_vector(&phase.orbit().velocity(t));
        if !frame.is_inertial(self) {
            let offset = q.inverse_transform_vector(&phase.orbit().position(t));
            velocity += frame.angular_velocity(self, t).cross(&offset);
        }

        velocity + self.velocity(frame.center(), t)
    }

    /// Universal orientation of a body: the rotation model's orientation,
    /// taken out of the body frame.
    pub fn body_orientation(&self, id: BodyID, t: f64) -> UnitQuaternion<f64> {
        let phase = self.body(id).phase(t);
        phase.rotation_model().orientation(t) * phase.body_frame().orientation(self, t)
    }

    /// Universal angular velocity of a body, rad/day.
    pub fn body_angular_velocity(&self, id: BodyID, t: f64) -> Vector3<f64> {
        let phase = self.body(id).phase(t);
        let frame = phase.body_frame();

        let w = phase.rotation_model().angular_velocity(t);
        let mut w = frame.orientation(self, t).inverse_transform_vector(&w);
        if !frame.is_inertial(self) {
            w += frame.angular_velocity(self, t);
        }
        w
    }

    pub fn body_equator_orientation(&self, id: BodyID, t: f64) -> UnitQuaternion<f64> {
        let phase = self.body(id).phase(t);
        phase.rotation_model().equator_orientation(t) * phase.body_frame().orientation(self, t)
    }

    /// Transform taking coordinates in `src` to coordinates in `dst`.
    pub fn convert_frames(
        &self,
        src: &ReferenceFrame,
        dst: &ReferenceFrame,
        t: f64,
    ) -> FrameTransform<f64> {
        dst.transform(self, t).relative_to(&src.transform(self, t))
    }

    // -- Frame trees --

    /// The tree of phases centered on `owner`, if any have ever been added.
    pub fn frame_tree(&self, owner: Selection) -> Option<&FrameTree> {
        match owner {
            Selection::None | Selection::DeepSky(_) => Some(&self.root),
            Selection::Star(id) => self.stars.get(id.0)?.frame_tree.as_ref(),
            Selection::Body(id) => self.bodies.get(id.0)?.frame_tree.as_ref(),
        }
    }

    fn existing_tree_mut(&mut self, owner: Selection) -> Option<&mut FrameTree> {
        match owner {
            Selection::None | Selection::DeepSky(_) => Some(&mut self.root),
            Selection::Star(id) => self.stars.get_mut(id.0)?.frame_tree.as_mut(),
            Selection::Body(id) => self.bodies.get_mut(id.0)?.frame_tree.as_mut(),
        }
    }

    fn frame_tree_mut(&mut self, owner: Selection) -> &mut FrameTree {
        let slot = match owner {
            Selection::Star(id) => &mut self.stars[id.0].frame_tree,
            Selection::Body(id) => &mut self.bodies[id.0].frame_tree,
            Selection::None | Selection::DeepSky(_) => return &mut self.root,
        };
        slot.get_or_insert_with(|| FrameTree::new(owner))
    }

    /// Flags the tree of `owner` as changed, along with every tree above it.
    ///
    /// A body's tree sits under the trees its own phases are attached to.
    pub fn mark_changed(&mut self, owner: Selection) {
        if let Some(tree) = self.existing_tree_mut(owner) {
            tree.mark_changed();
        }

        let mut pending = vec![owner];
        while let Some(owner) = pending.pop() {
            let id = match owner {
                Selection::Body(id) => id,
                _ => continue,
            };

            let parents: Vec<Selection> = self.bodies[id.0]
                .timeline
                .phases()
                .iter()
                .map(|p| p.orbit_frame().center())
                .collect();
            for parent in parents {
                // Anything already changed has had its ancestors marked too
                if let Some(tree) = self.existing_tree_mut(parent) {
                    if !tree.is_changed() {
                        tree.mark_changed();
                        pending.push(parent);
                    }
                }
            }
        }
    }

    /// Brings the bounds of the tree owned by `owner` up to date, and returns
    /// its radius. Trees that haven't changed keep their bounds.
    pub fn recompute_bounding_sphere(&mut self, owner: Selection) -> f64 {
        let children = match self.frame_tree(owner) {
            Some(tree) if !tree.is_changed() => return tree.bounds().radius,
            Some(tree) => tree.children().to_vec(),
            None => return 0.0,
        };

        let mut bounds = FrameTreeBounds::default();
        for phase in children {
            let id = phase.body();
            let info = &self.bodies[id.0].info;
            let mut radius = info.culling_radius + phase.orbit().bounding_radius();
            bounds.max_child_radius = bounds.max_child_radius.max(info.radius);
            bounds.child_class_mask |= info.classification;
            bounds.contains_secondary_illuminators |= info.secondary_illuminator;

            if self.bodies[id.0].frame_tree.is_some() {
                radius += self.recompute_bounding_sphere(Selection::Body(id));
                if let Some(tree) = &self.bodies[id.0].frame_tree {
                    let sub = tree.bounds();
                    bounds.child_class_mask |= sub.child_class_mask;
                    bounds.contains_secondary_illuminators |= sub.contains_secondary_illuminators;
                }
            }

            bounds.radius = bounds.radius.max(radius);
        }

        if let Some(tree) = self.existing_tree_mut(owner) {
            tree.set_bounds(bounds);
        }
        bounds.radius
    }

    /// Clears the changed flags below `owner`, stopping at trees that are
    /// already clean.
    pub fn mark_updated(&mut self, owner: Selection) {
        let mut pending = vec![owner];
        while let Some(owner) = pending.pop() {
            let children = match self.existing_tree_mut(owner) {
                Some(tree) if tree.is_changed() => {
                    tree.clear_changed();
                    tree.children().to_vec()
                }
                _ => continue,
            };
            pending.extend(children.iter().map(|p| Selection::Body(p.body())));
        }
    }

    /// Recomputes and clears every tree that isn't owned by a body.
    pub fn update_bounds(&mut self) {
        let mut roots = vec![Selection::None];
        roots.extend(
            self.stars
                .iter()
                .enumerate()
                .filter(|(_, s)| s.frame_tree.is_some())
                .map(|(idx, _)| Selection::Star(StarID(idx))),
        );

        for owner in roots {
            self.recompute_bounding_sphere(owner);
            self.mark_updated(owner);
        }
    }
}
