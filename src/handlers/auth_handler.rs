use std::sync::Arc;

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    post, web, HttpRequest, HttpResponse,
};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{LoginRequest, RegisterRequest},
        response::{AuthResponse, RefreshResponse, UserProfile},
    },
    services::auth_service::AuthSession,
};

pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// HTTP-only cookie carrying the refresh token. In production the client is
/// served from another origin, so the cookie must be Secure + SameSite=None;
/// development falls back to Lax over plain HTTP.
fn refresh_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let is_production = state.config.environment.is_production();

    Cookie::build(REFRESH_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(is_production)
        .same_site(if is_production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .max_age(CookieDuration::days(state.token_service.refresh_ttl_days()))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_TOKEN_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

#[post("/register")]
pub async fn register(
    state: web::Data<Arc<AppState>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let AuthSession {
        access_token,
        refresh_token: session_refresh_token,
        user,
    } = state.auth_service.register(request.into_inner()).await?;

    log::info!("User registered: {}", user.email);

    Ok(HttpResponse::Created()
        .cookie(refresh_cookie(&state, session_refresh_token))
        .json(AuthResponse {
            access_token,
            user: UserProfile::from(&user),
        }))
}

#[post("/login")]
pub async fn login(
    state: web::Data<Arc<AppState>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let AuthSession {
        access_token,
        refresh_token: session_refresh_token,
        user,
    } = state.auth_service.login(request.into_inner()).await?;

    log::info!("User logged in: {}", user.email);

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&state, session_refresh_token))
        .json(AuthResponse {
            access_token,
            user: UserProfile::from(&user),
        }))
}

#[post("/refresh-token")]
pub async fn refresh_token(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let presented = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .ok_or(AppError::MissingToken)?;

    let rotated = state.auth_service.refresh(presented.value()).await?;

    log::info!("Refresh token rotated");

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(&state, rotated.refresh_token))
        .json(RefreshResponse {
            access_token: rotated.access_token,
        }))
}

#[post("/logout")]
pub async fn logout(
    state: web::Data<Arc<AppState>>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    if let Some(cookie) = req.cookie(REFRESH_TOKEN_COOKIE) {
        state.auth_service.logout(cookie.value()).await?;
    }

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(serde_json::json!({ "success": true })))
}
