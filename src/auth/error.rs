/// Reasons a request fails authentication. All of them render as 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header, or an empty one.
    #[error("authorization header required")]
    MissingToken,

    /// Bad signature, unexpected algorithm, or expired.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The token verified but carries no integer `user_id` claim.
    #[error("invalid user_id in token")]
    MalformedClaims,

    /// Unknown username or wrong password; both render identically.
    #[error("invalid credentials")]
    InvalidCredentials,
}
