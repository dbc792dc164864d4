use std::net::TcpListener;
use std::sync::Arc;

use gust_runner::prelude::{
    run, Action, BehaviorProfile, GustScenarioCli, HookResult, LoadShape, RunnerContext,
    ScenarioDefinitionBuilder, Stage, ThinkTime, UserContext,
};

/// Reserve an ephemeral port with nothing listening on it, so requests fail fast instead of
/// reaching a real service.
fn unreachable_target() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{}", addr)
}

fn sample_cli_cfg() -> GustScenarioCli {
    GustScenarioCli {
        target: unreachable_target(),
        users: Some(1),
        spawn_rate: None,
        duration: Some(1),
        soak: false,
        no_progress: true,
    }
}

fn sample_profile() -> BehaviorProfile {
    BehaviorProfile::new(
        vec![Action::get("probe", "/")],
        ThinkTime::between_s(0.0, 0.05),
    )
    .expect("Failed to build profile")
}

#[test]
fn propagate_error_in_setup_hook() {
    fn setup(_ctx: &mut RunnerContext) -> HookResult {
        Err(anyhow::anyhow!("Error in setup hook"))
    }

    let scenario = ScenarioDefinitionBuilder::new("propagate_error_in_setup_hook", sample_cli_cfg())
        .use_profile(sample_profile())
        .use_setup(setup);

    let result = run(scenario);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().to_string(), "Error in setup hook");
}

#[test]
fn missing_profile_fails_at_startup() {
    let scenario = ScenarioDefinitionBuilder::new("missing_profile", sample_cli_cfg());

    let result = run(scenario);

    assert!(result.is_err());
}

#[test]
fn run_completes_when_duration_elapses() {
    let mut cfg = sample_cli_cfg();
    cfg.users = Some(2);
    // Spawn both users on the first tick so the 1s duration bound cannot cut the ramp short.
    cfg.spawn_rate = Some(2);

    let scenario = ScenarioDefinitionBuilder::new("run_completes_when_duration_elapses", cfg)
        .use_profile(sample_profile());

    let result = run(scenario);

    assert_eq!(2, result.unwrap());
}

#[test]
fn run_ends_when_load_shape_is_exhausted() {
    let mut cfg = sample_cli_cfg();
    cfg.users = None;
    cfg.duration = None;

    let shape = LoadShape::new(vec![Stage::new(1, 1, 1)]).unwrap();
    let scenario = ScenarioDefinitionBuilder::new("run_ends_when_load_shape_is_exhausted", cfg)
        .use_profile(sample_profile())
        .use_load_shape(shape);

    let started = std::time::Instant::now();
    let result = run(scenario);

    assert_eq!(1, result.unwrap());
    assert!(
        started.elapsed() < std::time::Duration::from_secs(15),
        "run did not end promptly after the shape was exhausted"
    );
}

#[test]
fn capture_error_in_user_setup() {
    fn user_setup(_ctx: &mut UserContext) -> HookResult {
        Err(anyhow::anyhow!("Error in user setup hook"))
    }

    let scenario = ScenarioDefinitionBuilder::new("capture_error_in_user_setup", sample_cli_cfg())
        .use_profile(sample_profile())
        .use_user_setup(user_setup);

    let result = run(scenario);

    assert!(result.is_ok());
}

#[test]
fn capture_error_in_user_teardown() {
    fn user_teardown(_ctx: &mut UserContext) -> HookResult {
        Err(anyhow::anyhow!("Error in user teardown hook"))
    }

    let scenario =
        ScenarioDefinitionBuilder::new("capture_error_in_user_teardown", sample_cli_cfg())
            .use_profile(sample_profile())
            .use_user_teardown(user_teardown);

    let result = run(scenario);

    assert!(result.is_ok());
}

#[test]
fn capture_error_in_teardown() {
    fn teardown(_ctx: Arc<RunnerContext>) -> HookResult {
        Err(anyhow::anyhow!("Error in teardown hook"))
    }

    let scenario = ScenarioDefinitionBuilder::new("capture_error_in_teardown", sample_cli_cfg())
        .use_profile(sample_profile())
        .use_teardown(teardown);

    let result = run(scenario);

    assert!(result.is_ok());
}

#[test]
fn failing_actions_do_not_fail_the_run() {
    fn teardown(ctx: Arc<RunnerContext>) -> HookResult {
        // The target is unreachable, so everything recorded is an unexpected failure, but the
        // run itself still completes.
        assert!(ctx.reporter().operation_count() > 0);
        Ok(())
    }

    let mut cfg = sample_cli_cfg();
    cfg.duration = Some(2);

    let scenario = ScenarioDefinitionBuilder::new("failing_actions_do_not_fail_the_run", cfg)
        .use_profile(sample_profile())
        .use_teardown(teardown);

    let result = run(scenario);

    assert!(result.is_ok());
}
