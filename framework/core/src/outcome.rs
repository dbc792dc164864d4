/// Classification of a single executed action.
///
/// Transport errors and unexpected status codes are converted into an [Outcome] at the action
/// execution boundary. They never propagate as errors into a virtual user's loop, so one bad
/// response cannot take down a user or the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Outcome {
    /// The response matched the action's success predicate.
    #[display("success")]
    Success,
    /// A failure the action explicitly models as acceptable.
    ///
    /// For example an unauthenticated poll answered with 401/403, or a deliberately short
    /// timeout firing on a packet-drop action.
    #[display("expected failure")]
    ExpectedFailure,
    /// Any response or transport error outside the action's declared success set.
    #[display("unexpected failure")]
    UnexpectedFailure,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}
