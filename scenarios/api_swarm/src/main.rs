use gust_runner::prelude::*;
use serde_json::json;

/// A steady API workload with no load shape: the population is set with `--users` and
/// `--spawn-rate` and held until the duration elapses.
fn main() -> GustResult<()> {
    let cli = init();

    let profile = BehaviorProfile::new(
        vec![
            Action::get("get_user", "/api/users/123").with_weight(7),
            Action::post("create_room", "/api/rooms")
                .with_json_body(json!({ "name": "swarm" }))
                .with_weight(3),
        ],
        ThinkTime::between_s(5.0, 10.0),
    )?;

    let builder = ScenarioDefinitionBuilder::new(env!("CARGO_PKG_NAME"), cli)
        .use_profile(profile)
        .with_default_duration_s(300);

    run(builder)?;

    Ok(())
}
