use actix_web::{http::header, web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::application::auth;
use crate::domain::form::FormData;
use crate::domain::ports::SignIn;
use crate::errors::AppError;

const DEFAULT_REDIRECT: &str = "/dashboard";

/// Login form body, for the API docs only. The handler reads the raw form
/// pairs, so nothing here is enforced on input.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Local path to continue to after signing in. Defaults to /dashboard.
    pub redirect_to: Option<String>,
}

/// Only same-origin paths are followed after sign-in.
fn redirect_target(requested: Option<&str>) -> &str {
    match requested {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => DEFAULT_REDIRECT,
    }
}

/// POST /login
///
/// Forwards the submitted credentials to the sign-in provider.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Signed in; redirect to the requested page"),
        (status = 401, description = "Credentials rejected; body is \"CredentialsSignin\"", body = String),
        (status = 500, description = "Sign-in provider failed"),
    ),
    tag = "auth"
)]
pub async fn authenticate(
    sign_in: web::Data<dyn SignIn>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let form = FormData::from(form.into_inner());

    match auth::authenticate(sign_in.get_ref(), &form).await? {
        None => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, redirect_target(form.get("redirectTo"))))
            .finish()),
        Some(sentinel) => Ok(HttpResponse::Unauthorized().json(sentinel)),
    }
}
