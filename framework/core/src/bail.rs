/// Return this error from a user hook to indicate that the virtual user is bailing.
///
/// Use this when a virtual user hits a problem that makes its own loop pointless to continue
/// but should not affect the rest of the swarm. The runner stops that user and the run carries
/// on with the remaining users.
#[derive(derive_more::Error, derive_more::Display, Debug)]
#[display("{msg}")]
pub struct UserBailError {
    msg: String,
}

impl Default for UserBailError {
    fn default() -> Self {
        Self {
            msg: "Virtual user is bailing".to_string(),
        }
    }
}
