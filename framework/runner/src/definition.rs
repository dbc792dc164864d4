use std::sync::Arc;

use crate::cli::GustScenarioCli;
use crate::context::{RunnerContext, UserContext};
use crate::profile::BehaviorProfile;
use crate::shape::LoadShape;

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut = fn(&mut RunnerContext) -> HookResult;
pub type GlobalHook = fn(Arc<RunnerContext>) -> HookResult;
pub type UserHookMut = fn(&mut UserContext) -> HookResult;

/// The builder for a scenario definition.
///
/// This must be used at the start of a scenario to describe the workload you want to run: the
/// behavior profile every virtual user follows, how the population changes over time, and any
/// setup or teardown hooks.
pub struct ScenarioDefinitionBuilder {
    /// The name of the scenario, which should be unique within the test suite.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    cli: GustScenarioCli,
    profile: Option<BehaviorProfile>,
    shape: Option<LoadShape>,
    /// Duration to apply when the CLI does not specify one. Ignored for soak runs.
    default_duration_s: Option<u64>,
    /// Global setup hook, run once before any users are started.
    setup_fn: Option<GlobalHookMut>,
    /// Setup hook run once for each virtual user as it starts.
    setup_user_fn: Option<UserHookMut>,
    /// Teardown hook run once for each virtual user as it stops. Best effort.
    teardown_user_fn: Option<UserHookMut>,
    /// Global teardown hook, run once after all users have stopped. Best effort.
    teardown_fn: Option<GlobalHook>,
}

pub(crate) struct ScenarioDefinition {
    pub name: String,
    pub target: String,
    pub profile: Arc<BehaviorProfile>,
    pub shape: Option<LoadShape>,
    /// Population to hold when no load shape is configured.
    pub fixed_users: usize,
    /// Users started per second while ramping to `fixed_users`.
    pub fixed_spawn_rate: usize,
    pub duration_s: Option<u64>,
    pub no_progress: bool,
    pub setup_fn: Option<GlobalHookMut>,
    pub setup_user_fn: Option<UserHookMut>,
    pub teardown_user_fn: Option<UserHookMut>,
    pub teardown_fn: Option<GlobalHook>,
}

impl ScenarioDefinitionBuilder {
    /// Initialise a new scenario definition from the scenario name and command line arguments.
    pub fn new(name: &str, cli: GustScenarioCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            profile: None,
            shape: None,
            default_duration_s: None,
            setup_fn: None,
            setup_user_fn: None,
            teardown_user_fn: None,
            teardown_fn: None,
        }
    }

    /// Set the behavior profile that every virtual user in this scenario follows. Required.
    pub fn use_profile(mut self, profile: BehaviorProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Set a staged load shape for this scenario.
    ///
    /// With a shape configured the run's population follows the stages and the run ends when
    /// the shape is exhausted; the `--users` and `--spawn-rate` flags are ignored.
    pub fn use_load_shape(mut self, shape: LoadShape) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Set the duration to use when the CLI does not provide one.
    pub fn with_default_duration_s(mut self, duration_s: u64) -> Self {
        self.default_duration_s = Some(duration_s);
        self
    }

    /// Set the global setup hook [ScenarioDefinitionBuilder::setup_fn] for this scenario.
    pub fn use_setup(mut self, setup_fn: GlobalHookMut) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Set the user setup hook [ScenarioDefinitionBuilder::setup_user_fn] for this scenario.
    pub fn use_user_setup(mut self, setup_user_fn: UserHookMut) -> Self {
        self.setup_user_fn = Some(setup_user_fn);
        self
    }

    /// Set the user teardown hook [ScenarioDefinitionBuilder::teardown_user_fn] for this
    /// scenario.
    pub fn use_user_teardown(mut self, teardown_user_fn: UserHookMut) -> Self {
        self.teardown_user_fn = Some(teardown_user_fn);
        self
    }

    /// Set the global teardown hook [ScenarioDefinitionBuilder::teardown_fn] for this scenario.
    pub fn use_teardown(mut self, teardown_fn: GlobalHook) -> Self {
        self.teardown_fn = Some(teardown_fn);
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition> {
        let profile = self
            .profile
            .ok_or_else(|| anyhow::anyhow!("Scenario {} has no behavior profile", self.name))?;

        if self.shape.is_some() && (self.cli.users.is_some() || self.cli.spawn_rate.is_some()) {
            log::warn!(
                "Scenario {} has a load shape, ignoring --users/--spawn-rate",
                self.name
            );
        }

        let duration_s = if self.cli.soak {
            None
        } else {
            self.cli.duration.or(self.default_duration_s)
        };

        Ok(ScenarioDefinition {
            name: self.name,
            target: self.cli.target,
            profile: Arc::new(profile),
            shape: self.shape,
            fixed_users: self.cli.users.unwrap_or(1),
            fixed_spawn_rate: self.cli.spawn_rate.unwrap_or(1).max(1),
            duration_s,
            no_progress: self.cli.no_progress,
            setup_fn: self.setup_fn,
            setup_user_fn: self.setup_user_fn,
            teardown_user_fn: self.teardown_user_fn,
            teardown_fn: self.teardown_fn,
        })
    }
}
