use async_trait::async_trait;
use reqwest::{header, redirect, Client, Response, StatusCode};

use crate::domain::auth::{Provider, SignInError, CREDENTIALS_SIGNIN};
use crate::domain::form::FormData;
use crate::domain::ports::SignIn;

/// Delegates sign-in to an HTTP auth service.
///
/// The submitted form is POSTed to `{base_url}/{provider}`. A 2xx answer
/// means the credentials were accepted, 401 and 403 mean they were rejected.
/// Redirects are reported, not followed: the `error` query parameter of the
/// `Location` decides the outcome, as with NextAuth-style callbacks.
pub struct HttpSignIn {
    client: Client,
    base_url: String,
}

impl HttpSignIn {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, provider: Provider) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), provider.as_str())
    }
}

/// Read the outcome of a sign-in redirect from its `error` query parameter.
fn redirect_outcome(response: &Response) -> Result<(), SignInError> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            SignInError::Unavailable(format!(
                "auth service answered {} without a location",
                response.status()
            ))
        })?;
    let target = response
        .url()
        .join(location)
        .map_err(|e| SignInError::Unavailable(format!("invalid redirect '{location}': {e}")))?;

    match target.query_pairs().find(|(key, _)| key == "error") {
        None => Ok(()),
        Some((_, code)) if code == CREDENTIALS_SIGNIN => Err(SignInError::CredentialsSignin),
        Some((_, code)) => Err(SignInError::Unavailable(format!(
            "auth service reported {code}"
        ))),
    }
}

#[async_trait]
impl SignIn for HttpSignIn {
    async fn sign_in(&self, provider: Provider, credentials: &FormData) -> Result<(), SignInError> {
        let response = self
            .client
            .post(self.endpoint(provider))
            .form(credentials.pairs())
            .send()
            .await
            .map_err(|e| SignInError::Unavailable(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            status if status.is_redirection() => redirect_outcome(&response),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SignInError::CredentialsSignin),
            status => Err(SignInError::Unavailable(format!(
                "auth service answered {status}"
            ))),
        }
    }
}
