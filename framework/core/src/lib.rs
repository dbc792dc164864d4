mod bail;
mod outcome;
mod shutdown;

pub mod prelude {
    pub use crate::bail::UserBailError;
    pub use crate::outcome::Outcome;
    pub use crate::shutdown::{DelegatedShutdownListener, ShutdownHandle, ShutdownSignalError};
}
