//! Account API handlers.
//!
//! ```text
//! POST  /api/v1/users/register        {"name":..,"email":..,"password":..,"phone":..,"address":..,"avatar":{..}}
//! POST  /api/v1/users/login           {"email":"ada@example.com","password":"Secr3t!pass"}
//! POST  /api/v1/users/refresh
//! POST  /api/v1/users/logout
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me/update       {"name":"Ada King"}
//! PATCH /api/v1/users/me/update/avatar
//! POST  /api/v1/users/password/forgot {"email":"ada@example.com"}
//! PATCH /api/v1/users/password/reset/{token}
//! PATCH /api/v1/users/password/change
//! GET   /api/v1/users
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{Registration, Session};
use crate::domain::{
    EmailAddress, Error, ImageUpload, LoginCredentials, LoginValidationError, NewPassword,
    PersonName, PhoneNumber, ProfileUpdate, User, UserValidationError, validate_address,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CurrentUser;
use crate::inbound::http::cookies::{REFRESH_COOKIE, cleared_cookies, session_cookies};
use crate::inbound::http::images::ImagePayload;
use crate::inbound::http::response::{ApiResponse, created, ok};
use crate::inbound::http::schemas::{ErrorSchema, UserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error, missing_field_error};

/// Registration request body for `POST /api/v1/users/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub avatar: ImagePayload,
}

/// Login request body for `POST /api/v1/users/login`.
///
/// Example JSON:
/// `{"email":"ada@example.com","password":"Secr3t!pass"}`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Optional body for `POST /api/v1/users/refresh` when cookies are unavailable.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Profile change; absent fields stay as they are.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Body for `POST /api/v1/users/password/forgot`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Body for `PATCH /api/v1/users/password/reset/{token}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Body for `PATCH /api/v1/users/password/change`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// A signed-in user with their tokens, for clients that do not keep cookies.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[schema(value_type = UserSchema)]
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user: session.user,
            access_token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
        }
    }
}

const NAME: FieldName = FieldName::new("name");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const PHONE: FieldName = FieldName::new("phone");
const ADDRESS: FieldName = FieldName::new("address");
const AVATAR: FieldName = FieldName::new("avatar");

fn map_user_field_error(err: UserValidationError) -> Error {
    let field = match &err {
        UserValidationError::EmptyName | UserValidationError::NameTooLong { .. } => NAME,
        UserValidationError::EmptyAddress | UserValidationError::AddressTooLong { .. } => ADDRESS,
        UserValidationError::Contact(_) => PHONE,
    };
    invalid_field_error(field, err)
}

fn new_password(raw: &str, field: FieldName) -> Result<NewPassword, Error> {
    NewPassword::new(raw).map_err(|err| invalid_field_error(field, err))
}

impl RegisterRequest {
    fn into_parts(self) -> Result<(Registration, ImageUpload), Error> {
        let registration = Registration {
            name: PersonName::new(&self.name).map_err(map_user_field_error)?,
            email: EmailAddress::for_account(&self.email)
                .map_err(|err| invalid_field_error(EMAIL, err))?,
            password: new_password(&self.password, PASSWORD)?,
            phone: PhoneNumber::new(&self.phone).map_err(|err| invalid_field_error(PHONE, err))?,
            address: validate_address(&self.address).map_err(map_user_field_error)?,
        };
        Ok((registration, self.avatar.into_upload(AVATAR)?))
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::Email(_) => invalid_field_error(EMAIL, err),
        LoginValidationError::EmptyPassword => invalid_field_error(PASSWORD, err),
    }
}

fn session_response(state: &HttpState, session: Session, message: &'static str) -> HttpResponse {
    let [access_cookie, refresh_cookie] = session_cookies(&state.auth, &session.tokens);
    HttpResponse::Ok().cookie(access_cookie).cookie(refresh_cookie).json(ApiResponse::new(
        StatusCode::OK,
        SessionResponse::from(session),
        message,
    ))
}

/// Create an account with the `USER` role.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; `data` is the user", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email or phone already registered", body = ErrorSchema),
        (status = 502, description = "Avatar upload failed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security([])
)]
#[post("/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let (registration, avatar) = payload.into_inner().into_parts()?;
    let user = state.accounts.register(registration, avatar).await?;
    Ok(created(user, "User registered successfully"))
}

/// Verify credentials and set the token cookies.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = SessionResponse,
            headers(("Set-Cookie" = String, description = "accessToken and refreshToken cookies"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let session = state.accounts.login(&credentials).await?;
    Ok(session_response(&state, session, "User logged in successfully"))
}

/// Rotate the token pair. The `refreshToken` cookie wins over the body.
#[utoipa::path(
    post,
    path = "/api/v1/users/refresh",
    request_body(content = RefreshRequest, description = "Used when no refreshToken cookie is sent"),
    responses(
        (status = 200, description = "New tokens issued", body = SessionResponse),
        (status = 400, description = "No refresh token supplied", body = ErrorSchema),
        (status = 401, description = "Refresh token rejected", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "refreshTokens",
    security([])
)]
#[post("/users/refresh")]
pub async fn refresh(
    req: HttpRequest,
    state: web::Data<HttpState>,
    payload: Option<web::Json<RefreshRequest>>,
) -> ApiResult<HttpResponse> {
    let token = req
        .cookie(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
        .or_else(|| payload.and_then(|body| body.into_inner().refresh_token))
        .ok_or_else(|| missing_field_error(FieldName::new("refreshToken")))?;
    let session = state.accounts.refresh(&token).await?;
    Ok(session_response(&state, session, "Access token refreshed"))
}

/// Forget the stored refresh token and clear both cookies.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/users/logout")]
pub async fn logout(state: web::Data<HttpState>, caller: CurrentUser) -> ApiResult<HttpResponse> {
    state.accounts.logout(caller.user()).await?;
    let [access_cookie, refresh_cookie] = cleared_cookies(&state.auth);
    Ok(HttpResponse::Ok()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .json(ApiResponse::new(StatusCode::OK, (), "User logged out")))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(caller: CurrentUser) -> ApiResult<HttpResponse> {
    Ok(ok(caller.0, "User profile fetched"))
}

/// Change the caller's name and/or address.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me/update",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[patch("/users/me/update")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<HttpResponse> {
    let ProfileUpdateRequest { name, address } = payload.into_inner();
    let update = ProfileUpdate::try_new(name, address).map_err(map_user_field_error)?;
    let user = state.accounts.update_profile(caller.user(), update).await?;
    Ok(ok(user, "Profile updated"))
}

/// Replace the caller's avatar.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me/update/avatar",
    request_body = ImagePayload,
    responses(
        (status = 200, description = "Updated profile", body = UserSchema),
        (status = 400, description = "Invalid image", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 502, description = "Upload failed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateAvatar"
)]
#[patch("/users/me/update/avatar")]
pub async fn update_avatar(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<ImagePayload>,
) -> ApiResult<HttpResponse> {
    let avatar = payload.into_inner().into_upload(AVATAR)?;
    let user = state.accounts.update_avatar(caller.user(), avatar).await?;
    Ok(ok(user, "Avatar updated"))
}

/// Mail a single-use password-reset link.
#[utoipa::path(
    post,
    path = "/api/v1/users/password/forgot",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent"),
        (status = 404, description = "No account with this email", body = ErrorSchema),
        (status = 502, description = "Mail delivery failed", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/users/password/forgot")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let email = EmailAddress::new(&payload.email).map_err(|err| invalid_field_error(EMAIL, err))?;
    state.accounts.forgot_password(&email).await?;
    Ok(ok((), "Password reset link sent"))
}

/// Set a new password with a mailed token.
#[utoipa::path(
    patch,
    path = "/api/v1/users/password/reset/{token}",
    params(("token" = String, Path, description = "Token from the reset link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Weak password or invalid token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "resetPassword",
    security([])
)]
#[patch("/users/password/reset/{token}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let password = new_password(&payload.password, PASSWORD)?;
    state
        .accounts
        .reset_password(&path.into_inner(), password)
        .await?;
    Ok(ok((), "Password reset successfully"))
}

/// Set a new password after verifying the current one.
#[utoipa::path(
    patch,
    path = "/api/v1/users/password/change",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Weak or incorrect password", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[patch("/users/password/change")]
pub async fn change_password(
    state: web::Data<HttpState>,
    caller: CurrentUser,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ChangePasswordRequest {
        old_password,
        new_password: raw_new,
    } = payload.into_inner();
    let password = new_password(&raw_new, FieldName::new("newPassword"))?;
    state
        .accounts
        .change_password(caller.user(), &old_password, password)
        .await?;
    Ok(ok((), "Password changed successfully"))
}

/// Every account; admin only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "Users", body = [UserSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: CurrentUser,
) -> ApiResult<HttpResponse> {
    let users = state.accounts.list_users(caller.user()).await?;
    Ok(ok(users, "Users fetched"))
}
