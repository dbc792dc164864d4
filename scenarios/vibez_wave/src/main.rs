use std::sync::Arc;
use std::time::Duration;

use gust_runner::prelude::*;

fn setup(ctx: &mut RunnerContext) -> HookResult {
    // One-shot probe so an unreachable target is obvious before thousands of users pile in.
    let client = ActionClient::new(ctx.target())?;
    let probe = Action::get("health_probe", "/api/health");
    let outcome = ctx
        .executor()
        .execute_in_place(async move { Ok::<_, anyhow::Error>(client.execute(&probe).await) })?;
    log::info!("Pre-flight health probe: {}", outcome);

    Ok(())
}

fn teardown(ctx: Arc<RunnerContext>) -> HookResult {
    log::info!(
        "Executed {} operations in run {}",
        ctx.reporter().operation_count(),
        ctx.run_id()
    );

    Ok(())
}

fn main() -> GustResult<()> {
    let cli = init();

    // The three chaos variants each take an equal share of a single chaos slot, so the base
    // 10:5:3:2:1 mix is scaled by three to keep all weights integral.
    let profile = BehaviorProfile::new(
        vec![
            Action::get("home", "/").with_weight(30),
            Action::get("view_room", "/api/rooms/general").with_weight(15),
            // A user who loses their WebSocket connection falls back to polling the message
            // history over HTTP. Unauthenticated polling is fine here, the point is the load.
            Action::get("ws_fallback_poll", "/api/messages")
                .with_query(&[("roomId", "general"), ("limit", "20")])
                .expect_statuses(&[200, 401, 403])
                .with_weight(9),
            // This endpoint is otherwise never exercised, hit it with dummy parameters.
            Action::get("auth_callback_smoke", "/auth/callback")
                .with_query(&[("code", "smoke_test_code"), ("state", "smoke_test_state")])
                .with_weight(6),
            Action::get("chaos_normal", "/api/health").with_weight(1),
            Action::get("chaos_latency", "/api/health")
                .with_injected_latency(Duration::from_millis(500), Duration::from_secs(2))
                .with_weight(1),
            Action::get("chaos_packet_drop", "/api/health")
                .with_drop_timeout(Duration::from_millis(1))
                .with_weight(1),
        ],
        ThinkTime::between_s(1.0, 5.0),
    )?;

    // Spike traffic in waves: start gentle, then flood, then cool down.
    let shape = LoadShape::new(vec![
        Stage::new(60, 100, 10),
        Stage::new(120, 500, 20),
        Stage::new(180, 1000, 50),
        Stage::new(240, 2000, 100),
        Stage::new(300, 500, 50),
    ])?;

    let builder = ScenarioDefinitionBuilder::new(env!("CARGO_PKG_NAME"), cli)
        .use_profile(profile)
        .use_load_shape(shape)
        .use_setup(setup)
        .use_teardown(teardown);

    run(builder)?;

    Ok(())
}
