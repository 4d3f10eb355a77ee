use std::rc::Rc;

use crate::error::{Error, Result};

mod phase;

pub use phase::TimelinePhase;

/// The phases of one body, in time order.
///
/// Phases never overlap, but there may be gaps between them.
pub struct Timeline {
    // Invariants:
    //   - Non-empty
    //   - Sorted by start time, and each phase ends no later than the next starts
    phases: Vec<Rc<TimelinePhase>>,
}

impl Timeline {
    pub fn new(phases: Vec<Rc<TimelinePhase>>) -> Result<Self> {
        if phases.is_empty() {
            return Err(Error::EmptyTimeline);
        }

        let ordered = phases
            .windows(2)
            .all(|w| w[0].end_or_max() <= w[1].start_or_min());
        if !ordered {
            return Err(Error::OverlappingPhases);
        }

        Ok(Self { phases })
    }

    /// A timeline with just one phase.
    pub fn single(phase: TimelinePhase) -> Self {
        Self {
            phases: vec![Rc::new(phase)],
        }
    }

    pub fn phases(&self) -> &[Rc<TimelinePhase>] {
        &self.phases
    }

    pub fn start_time(&self) -> Option<f64> {
        self.phases[0].start()
    }

    pub fn end_time(&self) -> Option<f64> {
        self.phases[self.phases.len() - 1].end()
    }

    /// Whether some phase covers `t`. False inside gaps.
    pub fn includes(&self, t: f64) -> bool {
        self.phases.iter().any(|p| p.includes(t))
    }

    /// The phase covering `t`, or failing that, the nearest one. Ties between
    /// two neighbouring phases go to the earlier.
    pub fn find_phase(&self, t: f64) -> &Rc<TimelinePhase> {
        // Index of the first phase starting strictly after t
        let next_idx = self.phases.partition_point(|p| p.start_or_min() <= t);
        if next_idx == 0 {
            return &self.phases[0];
        }

        let prev = &self.phases[next_idx - 1];
        if next_idx == self.phases.len() || prev.includes(t) {
            return prev;
        }

        let next = &self.phases[next_idx];
        if t - prev.end_or_max() <= next.start_or_min() - t {
            prev
        } else {
            next
        }
    }
}
