use thiserror::Error;

/// Errors raised by the session layer.
///
/// These are the only auth failures surfaced to the UI; persistence
/// problems are logged and swallowed instead.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The supplied token normalized to nothing; session state is unchanged.
    #[error("a token is required to sign in")]
    InvalidCredential,

    /// A login response carried no extractable token.
    #[error("authentication payload missing token")]
    MissingToken,
}
