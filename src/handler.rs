//! HTTP request handlers for the URL shortener
//!
//! Each handler resolves the caller's identity through `CurrentUser`, runs one
//! directory operation, and picks the response. Authorization decisions live
//! in the directories; handlers only translate their outcome into a redirect,
//! a rendered page, or an error page.

use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::database::AppState;
use crate::error::{error_response, AppError};
use crate::model::{CredentialsForm, UrlForm};
use crate::session::{self, CurrentUser};
use crate::view;

/// `GET /` sends logged-in users to their links and everyone else to login
pub async fn root(user: CurrentUser) -> Redirect {
    if user.is_logged_in() {
        Redirect::to("/urls")
    } else {
        Redirect::to("/login")
    }
}

/// `GET /urls.json` dumps the whole Link Directory
pub async fn urls_json(State(state): State<AppState>) -> Result<Response, AppError> {
    let links = state.links.all()?;
    Ok(Json(links).into_response())
}

/// `GET /urls` lists the caller's own links
pub async fn list_urls(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Response, AppError> {
    let Some(user_id) = user.id() else {
        return Err(AppError::Auth(
            "Please log in or register to see your URLs.".to_string(),
        ));
    };

    let links = state.links.list_by_owner(user_id)?;
    Ok(Html(view::urls_index(user.email(), &links)).into_response())
}

/// `GET /urls/new` shows the creation form, or bounces to login
pub async fn new_url_form(user: CurrentUser) -> Response {
    if !user.is_logged_in() {
        return Redirect::to("/login").into_response();
    }

    Html(view::urls_new(user.email())).into_response()
}

/// `GET /urls/{id}` shows one link to its owner
pub async fn show_url(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let record = state.links.get_owned(&id, user.id())?;
    Ok(Html(view::urls_show(user.email(), &id, &record)).into_response())
}

/// `GET /u/{id}` redirects anyone to the link's destination
///
/// 307 rather than a permanent redirect: the owner can still edit or delete
/// the link, so browsers must not cache it.
pub async fn redirect_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let long_url = state.links.resolve(&id)?;
    Ok(Redirect::temporary(&long_url).into_response())
}

/// `POST /urls` creates a link owned by the caller
pub async fn create_url(
    State(state): State<AppState>,
    user: CurrentUser,
    form: Result<Form<UrlForm>, FormRejection>,
) -> Result<Response, AppError> {
    let code = state.links.create(&long_url(form), user.id())?;
    Ok(Redirect::to(&format!("/urls/{code}")).into_response())
}

/// `POST /urls/{id}` replaces a link's destination
pub async fn update_url(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    form: Result<Form<UrlForm>, FormRejection>,
) -> Result<Response, AppError> {
    state.links.update(&id, &long_url(form), user.id())?;
    Ok(Redirect::to("/urls").into_response())
}

/// An unreadable body counts as an empty URL, so the directory's ordered
/// checks still decide the response.
fn long_url(form: Result<Form<UrlForm>, FormRejection>) -> String {
    match form {
        Ok(Form(form)) => form.long_url,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable link form");
            String::new()
        }
    }
}

/// `POST /urls/{id}/delete` removes a link
pub async fn delete_url(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.links.delete(&id, user.id())?;
    Ok(Redirect::to("/urls").into_response())
}

/// `GET /register`
pub async fn register_form(user: CurrentUser) -> Response {
    if user.is_logged_in() {
        return Redirect::to("/urls").into_response();
    }

    Html(view::register()).into_response()
}

/// `POST /register` creates the account and logs it in
pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user = state
        .users
        .register(&state.hasher, &form.email, &form.password)?;

    Ok((session::establish(jar, &user.id), Redirect::to("/urls")).into_response())
}

/// `GET /login`
pub async fn login_form(user: CurrentUser) -> Response {
    if user.is_logged_in() {
        return Redirect::to("/urls").into_response();
    }

    Html(view::login()).into_response()
}

/// `POST /login`
///
/// Unknown email and wrong password both answer 403 with the same message.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match state.users.login(&state.hasher, &form.email, &form.password) {
        Ok(user) => Ok((session::establish(jar, &user.id), Redirect::to("/urls")).into_response()),
        Err(AppError::NotFound(_) | AppError::Auth(_)) => {
            tracing::warn!("login rejected");
            Ok(error_response(
                StatusCode::FORBIDDEN,
                "Invalid email or password.",
            ))
        }
        Err(err) => Err(err),
    }
}

/// `POST /logout` always succeeds, session or not
pub async fn logout(jar: SignedCookieJar) -> Response {
    tracing::info!("user logged out");
    (session::clear(jar), Redirect::to("/login")).into_response()
}

/// Any route not matched above
pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "That page does not exist.")
}
