mod action;
mod cli;
mod client;
mod context;
mod definition;
mod executor;
mod init;
mod monitor;
mod profile;
mod progress;
mod run;
mod shape;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::action::{Action, Method};
    pub use crate::cli::GustScenarioCli;
    pub use crate::client::ActionClient;
    pub use crate::context::{RunnerContext, UserContext};
    pub use crate::definition::{HookResult, ScenarioDefinitionBuilder};
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::profile::{BehaviorProfile, ThinkTime};
    pub use crate::run::run;
    pub use crate::shape::{LoadShape, Stage, StageProfile};
    pub use crate::types::GustResult;
    pub use gust_core::prelude::{Outcome, UserBailError};
}
