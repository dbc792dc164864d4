use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use gust_core::prelude::{DelegatedShutdownListener, ShutdownHandle, UserBailError};
use gust_instruments::OperationRecord;

use crate::client::ActionClient;
use crate::context::{RunnerContext, UserContext};
use crate::definition::{ScenarioDefinition, ScenarioDefinitionBuilder, UserHookMut};
use crate::executor::Executor;
use crate::monitor::start_monitor;
use crate::profile::BehaviorProfile;
use crate::progress::start_progress;
use crate::shape::StageProfile;
use crate::shutdown::start_shutdown_listener;

/// Run a scenario to completion and print the summary of operations.
///
/// The run ends when the load shape is exhausted, the configured duration elapses or Ctrl-C is
/// pressed, whichever happens first. Returns the total number of virtual users that were
/// started over the lifetime of the run.
pub fn run(definition: ScenarioDefinitionBuilder) -> anyhow::Result<usize> {
    let definition = definition.build()?;

    let run_id = nanoid::nanoid!(8);
    log::info!(
        "Running scenario {} against {} (run {})",
        definition.name,
        definition.target,
        run_id
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime)?;
    let executor = Arc::new(Executor::new(runtime, shutdown_handle.new_listener()));
    let reporter = Arc::new(gust_instruments::Reporter::new());
    let client = ActionClient::new(&definition.target)?;

    let mut runner_context = RunnerContext::new(
        executor,
        reporter.clone(),
        shutdown_handle.clone(),
        definition.target.clone(),
        run_id,
    );

    if let Some(setup_fn) = &definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    // Show how long is left whenever the end of the run is known up front, whether from an
    // explicit duration or from the final stage boundary of the load shape.
    let planned_s = definition
        .duration_s
        .or_else(|| definition.shape.as_ref().and_then(|shape| shape.end_s()));
    if let Some(planned_s) = planned_s {
        if !definition.no_progress {
            start_progress(
                Duration::from_secs(planned_s),
                shutdown_handle.new_listener(),
            );
        }
    }

    // Time bounded runs get a timer that stops everything once the duration has elapsed.
    if let Some(duration_s) = definition.duration_s {
        let timer_handle = shutdown_handle.clone();
        runner_context.executor().spawn(async move {
            tokio::time::sleep(Duration::from_secs(duration_s)).await;
            timer_handle.shutdown();
        });
    }

    let runner_context = Arc::new(runner_context);

    // Report high resource usage by the runner itself, which might lead to a misleading outcome.
    start_monitor(shutdown_handle.new_listener());

    let users_run = runner_context.executor().block_on(control_population(
        runner_context.clone(),
        &definition,
        client,
        shutdown_handle.new_listener(),
    ));

    // Wind down the progress bar, monitor and signal listener in case the load shape ended the
    // run before any of them saw a shutdown signal.
    shutdown_handle.shutdown();

    if let Some(teardown_fn) = definition.teardown_fn {
        // Don't fail the run if the teardown fails. The summary should still be produced.
        if let Err(e) = teardown_fn(runner_context.clone()) {
            log::error!("Teardown failed: {:?}", e);
        }
    }

    reporter.finalize();

    Ok(users_run)
}

struct VirtualUser {
    id: String,
    stop: ShutdownHandle,
    join: tokio::task::JoinHandle<()>,
}

/// Reconcile the live virtual-user population against the load shape once per second.
///
/// This loop owns the run clock and the user lifecycle. Users are spawned at the stage's spawn
/// rate until the target is reached; on ramp-down the surplus users are stopped immediately,
/// newest first, abandoning whatever they had in flight.
async fn control_population(
    runner_context: Arc<RunnerContext>,
    definition: &ScenarioDefinition,
    client: ActionClient,
    mut shutdown_listener: DelegatedShutdownListener,
) -> usize {
    let started = Instant::now();
    let mut users: Vec<VirtualUser> = Vec::new();
    let mut stopping: Vec<VirtualUser> = Vec::new();
    let mut users_spawned = 0usize;
    let mut current_stage: Option<StageProfile> = None;

    loop {
        if shutdown_listener.should_shutdown() {
            log::info!("Stopping run after {:?}", started.elapsed());
            break;
        }

        let stage = match &definition.shape {
            Some(shape) => shape.tick(started.elapsed()),
            None => Some(StageProfile {
                target_users: definition.fixed_users,
                spawn_rate: definition.fixed_spawn_rate,
            }),
        };
        let Some(stage) = stage else {
            log::info!("Load shape complete after {:?}", started.elapsed());
            break;
        };

        if current_stage != Some(stage) {
            log::info!(
                "Ramping to {} users at {} users/s",
                stage.target_users,
                stage.spawn_rate
            );
            current_stage = Some(stage);
        }

        if users.len() < stage.target_users {
            let deficit = stage.target_users - users.len();
            for _ in 0..deficit.min(stage.spawn_rate) {
                users.push(spawn_user(
                    users_spawned,
                    runner_context.clone(),
                    definition,
                    client.clone(),
                ));
                users_spawned += 1;
            }
        } else if users.len() > stage.target_users {
            for user in users.drain(stage.target_users..) {
                log::debug!("Stopping {}", user.id);
                user.stop.shutdown();
                stopping.push(user);
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            _ = shutdown_listener.wait_for_shutdown() => {
                log::info!("Stopping run after {:?}", started.elapsed());
                break;
            }
        }
    }

    for user in &users {
        user.stop.shutdown();
    }
    stopping.append(&mut users);
    for user in stopping {
        if tokio::time::timeout(Duration::from_secs(10), user.join)
            .await
            .is_err()
        {
            log::warn!("{} did not stop in time", user.id);
        }
    }

    users_spawned
}

fn spawn_user(
    index: usize,
    runner_context: Arc<RunnerContext>,
    definition: &ScenarioDefinition,
    client: ActionClient,
) -> VirtualUser {
    let user_id = format!("user-{}", index);
    let stop = ShutdownHandle::new();

    let context = UserContext::new(user_id.clone(), runner_context, stop.new_listener());
    let join = tokio::spawn(run_virtual_user(
        context,
        client,
        definition.profile.clone(),
        definition.setup_user_fn,
        definition.teardown_user_fn,
    ));

    VirtualUser {
        id: user_id,
        stop,
        join,
    }
}

/// One virtual user's sequential loop: select an action, execute it, record the outcome, wait
/// the think time, repeat. Nothing here is shared mutably with other users, and both the
/// request and the pause race against the user's stop signal so ramp-down takes effect
/// immediately.
async fn run_virtual_user(
    mut context: UserContext,
    client: ActionClient,
    profile: Arc<BehaviorProfile>,
    setup_user_fn: Option<UserHookMut>,
    teardown_user_fn: Option<UserHookMut>,
) {
    if let Some(setup_user_fn) = setup_user_fn {
        if let Err(e) = setup_user_fn(&mut context) {
            if e.is::<UserBailError>() {
                log::debug!("{} bailed during setup: {}", context.user_id(), e);
            } else {
                log::error!("User setup failed for {}: {:?}", context.user_id(), e);
            }
            return;
        }
    }

    let reporter = context.runner_context().reporter().clone();

    loop {
        if context.shutdown_listener().should_shutdown() {
            log::debug!("{} stopped", context.user_id());
            break;
        }

        let action = {
            let mut rng = rand::thread_rng();
            profile.select_action(&mut rng).clone()
        };

        let record = OperationRecord::new(action.name());
        let outcome = tokio::select! {
            outcome = client.execute(&action) => outcome,
            _ = context.shutdown_listener().wait_for_shutdown() => break,
        };
        reporter.add_operation(record.finish(outcome));

        let pause = {
            let mut rng = rand::thread_rng();
            profile.think_time(&mut rng)
        };
        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = context.shutdown_listener().wait_for_shutdown() => break,
        }
    }

    if let Some(teardown_user_fn) = teardown_user_fn {
        if let Err(e) = teardown_user_fn(&mut context) {
            log::error!("User teardown failed for {}: {:?}", context.user_id(), e);
        }
    }
}
