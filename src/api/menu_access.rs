use actix_web::{HttpResponse, http::StatusCode, web};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use utoipa::{IntoParams, ToSchema};

use crate::access::navigation::{NavigationView, navigation_view};
use crate::access::resolver::{AccessSource, role_defaults};
use crate::access::service;
use crate::auth::auth::AuthUser;
use crate::error::{AppResult, ErrorBody, respond, respond_empty};
use crate::model::menu::MenuKey;
use crate::model::menu_access::OverrideSummary;
use crate::model::role::Role;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct MyAccessResponse {
    #[schema(example = 42)]
    pub user_id: u64,
    pub role: Role,
    pub source: AccessSource,
    /// Canonical order.
    pub menu_keys: Vec<MenuKey>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NavigationQuery {
    /// Current page path, used to mark the active tab.
    #[param(example = "/dashboard/attendance")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleDefaultsResponse {
    pub role: Role,
    pub menu_keys: Vec<MenuKey>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetMenuAccessRequest {
    #[schema(example = 42)]
    pub user_id: u64,
    /// Full replacement set. An empty list leaves the user with Dashboard only.
    #[schema(example = json!(["attendance", "leaves", "payslips"]))]
    pub menu_keys: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuAccessResponse {
    #[schema(example = 42)]
    pub user_id: u64,
    pub menu_keys: Vec<MenuKey>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[utoipa::path(
    get,
    path = "/api/menu-access/me",
    responses(
        (status = 200, description = "Effective menu keys of the caller", body = MyAccessResponse),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Access"
)]
pub async fn my_access(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let access = service::effective_access(state.menu_access.as_ref(), auth.user_id, auth.role).await?;

    Ok(respond(
        StatusCode::OK,
        "Menu access fetched",
        MyAccessResponse {
            user_id: auth.user_id,
            role: auth.role,
            source: access.source(),
            menu_keys: access.keys().into_iter().collect(),
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/menu-access/me/navigation",
    params(NavigationQuery),
    responses(
        (status = 200, description = "Tabs and sub-items the caller may open", body = NavigationView),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Access"
)]
pub async fn my_navigation(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<NavigationQuery>,
) -> AppResult<HttpResponse> {
    let access = service::effective_access(state.menu_access.as_ref(), auth.user_id, auth.role).await?;
    let view = navigation_view(&access, query.path.as_deref());
    Ok(respond(StatusCode::OK, "Navigation fetched", view))
}

#[utoipa::path(
    get,
    path = "/api/menu-access/defaults",
    responses(
        (status = 200, description = "Default menus per role", body = [RoleDefaultsResponse]),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Access"
)]
pub async fn role_defaults_table(_auth: AuthUser) -> HttpResponse {
    let table: Vec<RoleDefaultsResponse> = Role::iter()
        .map(|role| RoleDefaultsResponse {
            role,
            menu_keys: role_defaults(role).to_vec(),
        })
        .collect();

    respond(StatusCode::OK, "Role defaults fetched", table)
}

#[utoipa::path(
    get,
    path = "/api/menu-access",
    responses(
        (status = 200, description = "Every user with an override", body = [OverrideSummary]),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Access"
)]
pub async fn list_overrides(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let rows = service::list_overrides(state.menu_access.as_ref()).await?;
    Ok(respond(StatusCode::OK, "Menu access list fetched", rows))
}

#[utoipa::path(
    post,
    path = "/api/menu-access",
    request_body = SetMenuAccessRequest,
    responses(
        (status = 200, description = "Override saved", body = MenuAccessResponse),
        (status = 400, description = "Unknown menu key", body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Access"
)]
pub async fn set_access(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<SetMenuAccessRequest>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let body = body.into_inner();
    let saved =
        service::set_user_access(state.menu_access.as_ref(), body.user_id, &body.menu_keys).await?;

    tracing::info!(admin_id = auth.user_id, user_id = saved.user_id, "Menu access updated");

    Ok(respond(
        StatusCode::OK,
        "Menu access saved",
        MenuAccessResponse {
            user_id: saved.user_id,
            menu_keys: saved.menu_keys.into_iter().collect(),
            updated_at: saved.updated_at,
        },
    ))
}

#[utoipa::path(
    delete,
    path = "/api/menu-access/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User reset to role defaults"),
        (status = 403, body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Menu Access"
)]
pub async fn reset_access(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    service::reset_user_access(state.menu_access.as_ref(), user_id).await?;

    tracing::info!(admin_id = auth.user_id, user_id, "Menu access reset");
    Ok(respond_empty(StatusCode::OK, "Menu access reset to role defaults"))
}
