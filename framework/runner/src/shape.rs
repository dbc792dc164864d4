use std::time::Duration;

/// One entry in a staged ramp.
///
/// `duration_s` is the *cumulative* elapsed-time ceiling at which this stage's profile stops
/// applying, not a relative length. Boundaries must strictly increase across the stage list or
/// later stages end up with impossibly small time budgets once the run passes the first
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    duration_s: u64,
    users: usize,
    spawn_rate: usize,
}

impl Stage {
    pub fn new(duration_s: u64, users: usize, spawn_rate: usize) -> Self {
        Self {
            duration_s,
            users,
            spawn_rate,
        }
    }
}

/// The population target and spawn rate that apply at a point in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageProfile {
    pub target_users: usize,
    pub spawn_rate: usize,
}

/// Maps elapsed run time to a target population, producing a step function over time.
///
/// The controller is stateless: [LoadShape::tick] is a pure function of the elapsed time, so
/// two calls with the same elapsed value always produce the same answer.
#[derive(Debug, Clone)]
pub struct LoadShape {
    stages: Vec<Stage>,
}

impl LoadShape {
    /// Build a shape from stages ordered by ascending cumulative boundary.
    ///
    /// Non-increasing boundaries and zero spawn rates are configuration errors, rejected at
    /// startup. An empty stage list is permitted and means the run ends immediately.
    pub fn new(stages: Vec<Stage>) -> anyhow::Result<Self> {
        for window in stages.windows(2) {
            anyhow::ensure!(
                window[0].duration_s < window[1].duration_s,
                "Stage boundaries must strictly increase: {} is not before {}",
                window[0].duration_s,
                window[1].duration_s
            );
        }
        for stage in &stages {
            anyhow::ensure!(
                stage.spawn_rate > 0,
                "Stage with boundary {}s has a zero spawn rate",
                stage.duration_s
            );
        }

        Ok(Self { stages })
    }

    /// Return the profile of the first stage whose boundary is strictly greater than `elapsed`,
    /// or `None` once every boundary has been reached, meaning the run should end.
    pub fn tick(&self, elapsed: Duration) -> Option<StageProfile> {
        self.stages
            .iter()
            .find(|stage| elapsed < Duration::from_secs(stage.duration_s))
            .map(|stage| StageProfile {
                target_users: stage.users,
                spawn_rate: stage.spawn_rate,
            })
    }

    /// The final boundary of the shape, if any stages are configured.
    pub fn end_s(&self) -> Option<u64> {
        self.stages.last().map(|stage| stage.duration_s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ramp() -> LoadShape {
        LoadShape::new(vec![
            Stage::new(60, 100, 10),
            Stage::new(120, 500, 20),
            Stage::new(180, 1000, 50),
        ])
        .unwrap()
    }

    fn profile(target_users: usize, spawn_rate: usize) -> Option<StageProfile> {
        Some(StageProfile {
            target_users,
            spawn_rate,
        })
    }

    #[test]
    fn first_stage_applies_before_its_boundary() {
        assert_eq!(profile(100, 10), ramp().tick(Duration::from_secs(30)));
    }

    #[test]
    fn boundary_is_exclusive_of_the_prior_stage() {
        // At exactly 60s the first stage no longer matches since 60 is not < 60.
        assert_eq!(profile(500, 20), ramp().tick(Duration::from_secs(60)));
    }

    #[test]
    fn past_the_last_boundary_the_run_ends() {
        assert_eq!(None, ramp().tick(Duration::from_secs(200)));
        assert_eq!(None, ramp().tick(Duration::from_secs(180)));
    }

    #[test]
    fn tick_is_idempotent() {
        let shape = ramp();
        for elapsed in [0u64, 59, 60, 119, 180, 500] {
            let elapsed = Duration::from_secs(elapsed);
            assert_eq!(shape.tick(elapsed), shape.tick(elapsed));
        }
    }

    #[test]
    fn empty_shape_always_signals_termination() {
        let shape = LoadShape::new(Vec::new()).unwrap();
        assert_eq!(None, shape.tick(Duration::ZERO));
        assert_eq!(None, shape.tick(Duration::from_secs(1000)));
    }

    #[test]
    fn non_increasing_boundaries_are_rejected() {
        let result = LoadShape::new(vec![Stage::new(60, 100, 10), Stage::new(60, 500, 20)]);
        assert!(result.is_err());

        let result = LoadShape::new(vec![Stage::new(120, 100, 10), Stage::new(60, 500, 20)]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_spawn_rate_is_rejected() {
        let result = LoadShape::new(vec![Stage::new(60, 100, 0)]);
        assert!(result.is_err());
    }

    #[test]
    fn end_s_reports_the_final_boundary() {
        assert_eq!(Some(180), ramp().end_s());
        assert_eq!(None, LoadShape::new(Vec::new()).unwrap().end_s());
    }
}
