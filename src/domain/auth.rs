use thiserror::Error;

/// Sentinel returned to the login form when the credentials were rejected.
pub const CREDENTIALS_SIGNIN: &str = "CredentialsSignin";

/// Sign-in mechanisms the login form can delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Credentials,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Credentials => "credentials",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignInError {
    #[error("{}", CREDENTIALS_SIGNIN)]
    CredentialsSignin,
    #[error("Sign-in unavailable: {0}")]
    Unavailable(String),
}
