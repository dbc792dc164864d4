use std::time::Duration;

use anyhow::Context;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::action::Action;

/// The inclusive range of idle time between a virtual user's actions, modelling human pacing.
#[derive(Debug, Clone, Copy)]
pub struct ThinkTime {
    min: Duration,
    max: Duration,
}

impl ThinkTime {
    /// A think time drawn uniformly from `[min_s, max_s]` seconds, bounds inclusive.
    pub fn between_s(min_s: f64, max_s: f64) -> Self {
        Self::between(Duration::from_secs_f64(min_s), Duration::from_secs_f64(max_s))
    }

    pub fn between(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

/// What a simulated user does: a weighted set of actions and the pacing between them.
///
/// Constructed once by the scenario and shared read-only by every virtual user, so there is no
/// hidden global state and parallel runs can use different profiles.
#[derive(Debug)]
pub struct BehaviorProfile {
    actions: Vec<Action>,
    weights: WeightedIndex<u32>,
    think_time: ThinkTime,
}

impl BehaviorProfile {
    /// Build a profile from a non-empty action set.
    ///
    /// Fails if the action set is empty or the weights do not form a usable distribution
    /// (all zero, or overflowing in total). These are configuration errors and abort the
    /// scenario at startup.
    pub fn new(actions: Vec<Action>, think_time: ThinkTime) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !actions.is_empty(),
            "A behavior profile must have at least one action"
        );
        anyhow::ensure!(
            think_time.min <= think_time.max,
            "Think time minimum must not exceed its maximum"
        );

        let weights = WeightedIndex::new(actions.iter().map(|action| action.weight()))
            .context("Action weights do not form a valid distribution")?;

        Ok(Self {
            actions,
            weights,
            think_time,
        })
    }

    /// Weighted-random selection over the configured action set.
    ///
    /// The probability of returning action `i` is `weight_i / sum(weights)`. Each call is
    /// independent of all prior calls and only ever returns actions from the configured set.
    pub fn select_action<R: Rng + ?Sized>(&self, rng: &mut R) -> &Action {
        &self.actions[self.weights.sample(rng)]
    }

    /// Draw the pause before a user's next action, uniformly from the configured range with
    /// both bounds inclusive.
    pub fn think_time<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min_s = self.think_time.min.as_secs_f64();
        let max_s = self.think_time.max.as_secs_f64();
        if min_s >= max_s {
            return self.think_time.min;
        }

        Duration::from_secs_f64(rng.gen_range(min_s..=max_s))
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn fake_profile(weights: &[(&str, u32)], think_time: ThinkTime) -> BehaviorProfile {
        let actions = weights
            .iter()
            .map(|(name, weight)| Action::get(*name, "/").with_weight(*weight))
            .collect();
        BehaviorProfile::new(actions, think_time).unwrap()
    }

    #[test]
    fn empty_action_set_is_a_configuration_error() {
        let result = BehaviorProfile::new(Vec::new(), ThinkTime::between_s(1.0, 5.0));
        assert!(result.is_err());
    }

    #[test]
    fn all_zero_weights_are_a_configuration_error() {
        let actions = vec![Action::get("home", "/").with_weight(0)];
        let result = BehaviorProfile::new(actions, ThinkTime::between_s(1.0, 5.0));
        assert!(result.is_err());
    }

    #[test]
    fn selection_frequencies_match_weights() {
        let profile = fake_profile(
            &[("home", 30), ("view_room", 15), ("poll", 9), ("smoke", 6), ("chaos", 3)],
            ThinkTime::between_s(1.0, 5.0),
        );
        let total_weight = 63u32;

        let mut rng = StdRng::seed_from_u64(42);
        let samples = 63_000usize;
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..samples {
            *counts.entry(profile.select_action(&mut rng).name()).or_default() += 1;
        }

        for action in profile.actions() {
            let observed = *counts.get(action.name()).unwrap_or(&0) as f64;
            let expected = samples as f64 * action.weight() as f64 / total_weight as f64;
            let tolerance = expected * 0.15;
            assert!(
                (observed - expected).abs() <= tolerance,
                "action {} observed {} times, expected about {}",
                action.name(),
                observed,
                expected
            );
        }
    }

    #[test]
    fn zero_weight_actions_are_never_selected() {
        let profile = fake_profile(&[("always", 5), ("never", 0)], ThinkTime::between_s(0.0, 1.0));

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            assert_eq!("always", profile.select_action(&mut rng).name());
        }
    }

    #[test]
    fn think_time_stays_within_inclusive_bounds() {
        let profile = fake_profile(&[("home", 1)], ThinkTime::between_s(1.0, 5.0));

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..10_000 {
            let pause = profile.think_time(&mut rng);
            assert!(pause >= Duration::from_secs(1), "{pause:?} below minimum");
            assert!(pause <= Duration::from_secs(5), "{pause:?} above maximum");
        }
    }

    #[test]
    fn degenerate_think_time_range_returns_the_bound() {
        let profile = fake_profile(&[("home", 1)], ThinkTime::between_s(2.0, 2.0));

        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(Duration::from_secs(2), profile.think_time(&mut rng));
    }
}
