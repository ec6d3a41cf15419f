//! Account endpoints: registration, login, profile, avatar, and deletion.
//!
//! ```text
//! POST   /api/v1/register        {"username":"ada","password":"…","passwordConfirmation":"…"}
//! POST   /api/v1/login           {"username":"ada","password":"…"}
//! POST   /api/v1/logout
//! GET    /api/v1/profile
//! PUT    /api/v1/profile         {"firstName":"Ada","lastName":"Lovelace","email":null,"bio":""}
//! PUT    /api/v1/profile/avatar  multipart `image`
//! DELETE /api/v1/profile/avatar
//! DELETE /api/v1/account
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{AssetStore, ProfileUpdate, Transformation};
use crate::domain::{
    Error, LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
    User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::multipart::read_upload_form;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Sign-up form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Full replacement of the editable profile fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Blank or absent clears the stored address.
    pub email: Option<String>,
    #[serde(default)]
    pub bio: String,
}

/// The signed-in user's profile.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    /// "First Last", or the username when either name is blank.
    pub full_name: String,
    pub bio: String,
    /// 150×150 face-cropped avatar.
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl ProfileResponse {
    pub fn from_user(user: &User, assets: &dyn AssetStore) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.to_string(),
            email: user.email.as_ref().map(ToString::to_string),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            bio: user.bio.clone(),
            avatar_url: user
                .avatar
                .as_ref()
                .map(|avatar| assets.url(avatar, &Transformation::avatar())),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(value: ProfileRequest) -> Self {
        Self {
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            bio: value.bio,
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => ("username", "empty_username"),
        LoginValidationError::EmptyPassword => ("password", "empty_password"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": err.code() }))
}

fn profile_json(state: &HttpState, user: &User) -> ProfileResponse {
    ProfileResponse::from_user(user, state.assets.as_ref())
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid or duplicate details", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        username,
        email,
        password,
        password_confirmation,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(
        &username,
        email.as_deref(),
        &password,
        &password_confirmation,
    )
    .map_err(map_registration_error)?;
    let user = state.accounts.register(registration).await?;
    session.persist_user(&user.id)?;
    Ok(HttpResponse::Created().json(profile_json(&state, &user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&username, &password)
        .map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    let user = state.profile.fetch_profile(&user_id).await?;
    Ok(web::Json(profile_json(&state, &user)))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Current profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "getProfile"
)]
#[get("/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.profile.fetch_profile(&user_id).await?;
    Ok(web::Json(profile_json(&state, &user)))
}

/// Replace the editable profile fields.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid field or email in use", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[put("/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state
        .accounts
        .update_profile(&user_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile_json(&state, &user)))
}

/// Upload a new avatar; the previous one is deleted from the asset store.
#[utoipa::path(
    put,
    path = "/api/v1/profile/avatar",
    request_body(content_type = "multipart/form-data", description = "Image file in the `image` field"),
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Missing, oversized, or corrupt image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Asset store unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "replaceAvatar"
)]
#[put("/profile/avatar")]
pub async fn replace_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let mut form = read_upload_form(payload, &state.uploads).await?;
    let image = form.take_file("image").ok_or_else(missing_image)?;
    let user = state.accounts.replace_avatar(&user_id, image).await?;
    Ok(web::Json(profile_json(&state, &user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/profile/avatar",
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "clearAvatar"
)]
#[delete("/profile/avatar")]
pub async fn clear_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.clear_avatar(&user_id).await?;
    Ok(web::Json(profile_json(&state, &user)))
}

/// Delete the account, its projects, and its photos, then sign out.
#[utoipa::path(
    delete,
    path = "/api/v1/account",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "deleteAccount"
)]
#[delete("/account")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state.accounts.delete_account(&user_id).await?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// `invalid_request` for a multipart body without an `image` file.
pub(crate) fn missing_image() -> Error {
    Error::invalid_request("No image was submitted.")
        .with_details(json!({ "field": "image", "code": "missing_image" }))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
