/// Recommended error type for a scenario `main` function and any shared hook code. This type is
/// compatible with the [crate::definition::HookResult] type so you can use `?` to propagate
/// errors.
pub type GustResult<T> = anyhow::Result<T>;
