use crate::domain::auth::{Provider, SignInError, CREDENTIALS_SIGNIN};
use crate::domain::form::FormData;
use crate::domain::ports::SignIn;

/// Sign in with the submitted credentials.
///
/// Returns `Ok(None)` once signed in and `Ok(Some("CredentialsSignin"))` when
/// the credentials were rejected. Any other failure is handed back unchanged.
pub async fn authenticate(
    sign_in: &dyn SignIn,
    form: &FormData,
) -> Result<Option<&'static str>, SignInError> {
    match sign_in.sign_in(Provider::Credentials, form).await {
        Ok(()) => Ok(None),
        Err(SignInError::CredentialsSignin) => Ok(Some(CREDENTIALS_SIGNIN)),
        Err(e) => Err(e),
    }
}
