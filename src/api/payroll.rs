use actix_web::{HttpResponse, http::StatusCode, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult, ErrorBody, respond, respond_empty};
use crate::model::payroll::{PayrollRecord, PayrollStatus};
use crate::payroll::aggregator::PayrollAdjustment;
use crate::payroll::calculator::{BpjsContribution, calculate_bpjs};
use crate::payroll::service;
use crate::state::AppState;
use crate::store::{Page, PayrollFilter};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePayrollStatus {
    #[schema(example = "processed")]
    pub status: PayrollStatus,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayslipQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BpjsQuery {
    /// Monthly basic salary in rupiah.
    #[param(example = 5000000.0)]
    pub basic_salary: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<PayrollRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl From<Page<PayrollRecord>> for PaginatedPayrollResponse {
    fn from(page: Page<PayrollRecord>) -> Self {
        Self {
            data: page.items,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollFilter),
    responses(
        (status = 200, body = PaginatedPayrollResponse),
        (status = 403, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PayrollFilter>,
) -> AppResult<HttpResponse> {
    auth.require_hr_or_admin()?;

    let page = service::list(state.payroll.as_ref(), &query).await?;

    Ok(respond(
        StatusCode::OK,
        "Payrolls fetched",
        PaginatedPayrollResponse::from(page),
    ))
}

#[utoipa::path(
    get,
    path = "/api/payroll/me",
    params(PayslipQuery),
    responses(
        (status = 200, description = "Paid payrolls of the caller", body = PaginatedPayrollResponse),
        (status = 404, description = "No employee profile linked", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn my_payslips(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PayslipQuery>,
) -> AppResult<HttpResponse> {
    let employee_id = auth.require_employee_id()?;

    let page = service::payslips(state.payroll.as_ref(), employee_id, query.page, query.per_page)
        .await?;

    Ok(respond(
        StatusCode::OK,
        "Payslips fetched",
        PaginatedPayrollResponse::from(page),
    ))
}

#[utoipa::path(
    get,
    path = "/api/payroll/bpjs",
    params(BpjsQuery),
    responses(
        (status = 200, description = "Employee and company BPJS contributions", body = BpjsContribution),
        (status = 400, description = "Invalid salary", body = ErrorBody),
        (status = 403, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn bpjs_breakdown(
    auth: AuthUser,
    query: web::Query<BpjsQuery>,
) -> AppResult<HttpResponse> {
    auth.require_hr_or_admin()?;

    if !query.basic_salary.is_finite() || query.basic_salary < 0.0 {
        return Err(AppError::Validation(
            "basic_salary must be a non-negative amount".to_string(),
        ));
    }

    Ok(respond(
        StatusCode::OK,
        "BPJS contributions calculated",
        calculate_bpjs(query.basic_salary),
    ))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, body = PayrollRecord),
        (status = 404, body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_hr_or_admin()?;

    let record = service::get(state.payroll.as_ref(), path.into_inner()).await?;
    Ok(respond(StatusCode::OK, "Payroll fetched", record))
}

#[utoipa::path(
    post,
    path = "/api/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Draft payroll created", body = PayrollRecord),
        (status = 400, description = "Invalid period", body = ErrorBody),
        (status = 404, description = "Employee or salary not found", body = ErrorBody),
        (status = 409, description = "Payroll already exists for this period", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    body: web::Json<GeneratePayroll>,
) -> AppResult<HttpResponse> {
    auth.require_hr_or_admin()?;

    let record = service::generate(
        state.payroll.as_ref(),
        state.payroll_inputs.as_ref(),
        body.employee_id,
        body.month,
        body.year,
    )
    .await?;

    Ok(respond(StatusCode::CREATED, "Payroll generated", record))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}",
    request_body = PayrollAdjustment,
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll updated", body = PayrollRecord),
        (status = 404, body = ErrorBody),
        (status = 422, description = "Payroll already paid", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<PayrollAdjustment>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let record = service::adjust(state.payroll.as_ref(), path.into_inner(), body.into_inner()).await?;
    Ok(respond(StatusCode::OK, "Payroll updated", record))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}/status",
    request_body = UpdatePayrollStatus,
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Status changed", body = PayrollRecord),
        (status = 404, body = ErrorBody),
        (status = 422, description = "Transition not allowed", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll_status(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayrollStatus>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let record =
        service::update_status(state.payroll.as_ref(), path.into_inner(), body.status).await?;
    Ok(respond(StatusCode::OK, "Payroll status updated", record))
}

#[utoipa::path(
    delete,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Draft payroll deleted"),
        (status = 404, body = ErrorBody),
        (status = 422, description = "Only drafts can be deleted", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    service::delete(state.payroll.as_ref(), path.into_inner()).await?;
    Ok(respond_empty(StatusCode::OK, "Payroll deleted"))
}
