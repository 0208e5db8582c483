// Prediction - Non-destructive forward simulation
// Every query runs on a copy; the caller's simulation is only borrowed

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SimResult;
use crate::integrator::Integrator;
use crate::physics_engine::Vector3;
use crate::simulation::{Simulation, StateReport};

// =============================================================================
// SAMPLE TIMES
// =============================================================================

/// Sample times `start, start + step, start + step + step, ...` strictly
/// below `end`, built by repeated addition.
///
/// Yields nothing for a non-positive or non-finite step, a non-finite end,
/// or `end <= start`. Stops early once adding `step` no longer changes the
/// value, so it always terminates.
#[derive(Debug, Clone)]
pub struct SampleTimes {
    next: f64,
    end: f64,
    step: f64,
    done: bool,
}

impl SampleTimes {
    pub fn new(start: f64, end: f64, step: f64) -> Self {
        let degenerate = !(step.is_finite() && step > 0.0)
            || !start.is_finite()
            || !end.is_finite()
            || end <= start;

        Self {
            next: start,
            end,
            step,
            done: degenerate,
        }
    }

    /// Number of samples without iterating; an upper bound if the step
    /// underflows partway through.
    pub fn estimated_len(&self) -> usize {
        if self.done {
            return 0;
        }
        ((self.end - self.next) / self.step).ceil() as usize
    }
}

impl Iterator for SampleTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.done || self.next >= self.end {
            self.done = true;
            return None;
        }

        let current = self.next;
        self.next = current + self.step;
        if self.next <= current {
            self.done = true;
        }
        Some(current)
    }
}

// =============================================================================
// TRAJECTORY
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Sampled history per body label; times within a body strictly increase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Trajectory {
    pub bodies: IndexMap<String, Vec<TrajectoryPoint>>,
}

impl Trajectory {
    pub fn is_empty(&self) -> bool {
        self.bodies.values().all(Vec::is_empty)
    }

    /// Samples for `label`; empty if the label was never sampled.
    pub fn samples(&self, label: &str) -> &[TrajectoryPoint] {
        self.bodies.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    fn record(&mut self, report: StateReport) {
        for (label, kinematics) in report.bodies {
            self.bodies.entry(label).or_default().push(TrajectoryPoint {
                time: report.time,
                position: kinematics.position,
                velocity: kinematics.velocity,
            });
        }
    }
}

// =============================================================================
// QUERIES
// =============================================================================

impl<E: Integrator> Simulation<E> {
    /// State at `time` of `target` (or every body), computed on a copy.
    pub fn predict(&self, time: f64, target: Option<&str>) -> SimResult<StateReport> {
        if let Some(label) = target {
            self.registry().handle_of(label)?;
        }

        let mut copy = self.copy();
        copy.integrate(time)?;
        debug!(simulation = %self.name(), time, ?target, "predicted state");

        match target {
            Some(label) => copy.report_for(label),
            None => copy.report(),
        }
    }

    /// Sampled history from the current clock up to (excluding) `end_time`,
    /// computed on a single copy advanced from sample to sample.
    pub fn trajectory(
        &self,
        end_time: f64,
        time_step: f64,
        target: Option<&str>,
    ) -> SimResult<Trajectory> {
        if let Some(label) = target {
            self.registry().handle_of(label)?;
        }

        let mut copy = self.copy();
        let mut trajectory = Trajectory::default();
        let mut samples = 0usize;

        for time in SampleTimes::new(copy.time(), end_time, time_step) {
            copy.integrate(time)?;
            let report = match target {
                Some(label) => copy.report_for(label)?,
                None => copy.report()?,
            };
            trajectory.record(report);
            samples += 1;
        }

        debug!(
            simulation = %self.name(),
            end_time,
            time_step,
            ?target,
            samples,
            "sampled trajectory"
        );
        Ok(trajectory)
    }
}

// =============================================================================
// TESTS
// =============================================================================
