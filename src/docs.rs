use crate::access::navigation::{NavigationView, VisibleSubItem, VisibleTab};
use crate::access::resolver::AccessSource;
use crate::api::menu_access::{
    MenuAccessResponse, MyAccessResponse, RoleDefaultsResponse, SetMenuAccessRequest,
};
use crate::api::payroll::{
    GeneratePayroll, PaginatedPayrollResponse, PayslipQuery, UpdatePayrollStatus,
};
use crate::error::ErrorBody;
use crate::model::menu::MenuKey;
use crate::model::menu_access::OverrideSummary;
use crate::model::payroll::{PayrollRecord, PayrollStatus};
use crate::model::role::Role;
use crate::payroll::aggregator::PayrollAdjustment;
use crate::payroll::calculator::BpjsContribution;
use crate::store::PayrollFilter;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRIS Access & Payroll API",
        version = "1.0.0",
        description = r#"
## HRIS back office

### Key Features
- **Menu Access**
  - Role default menus, per-user overrides and the navigation each user may render
- **Payroll**
  - Generate monthly payroll from attendance and salary data (BPJS, PPh 21, overtime)
  - Adjust drafts, move them through draft → processed → paid, and read payslips

### Security
Every endpoint expects a **JWT Bearer** access token. Override writes and payroll
changes are restricted to **Admin**; payroll generation and listing to **Admin** or **HR**.

### Response Format
`{ "success": bool, "message": string, "data": ... }`; errors carry an `error` kind instead of `data`.
"#,
    ),
    paths(
        crate::api::menu_access::my_access,
        crate::api::menu_access::my_navigation,
        crate::api::menu_access::role_defaults_table,
        crate::api::menu_access::list_overrides,
        crate::api::menu_access::set_access,
        crate::api::menu_access::reset_access,

        crate::api::payroll::list_payrolls,
        crate::api::payroll::my_payslips,
        crate::api::payroll::bpjs_breakdown,
        crate::api::payroll::get_payroll,
        crate::api::payroll::generate_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::update_payroll_status,
        crate::api::payroll::delete_payroll
    ),
    components(
        schemas(
            ErrorBody,
            Role,
            MenuKey,
            AccessSource,
            MyAccessResponse,
            RoleDefaultsResponse,
            SetMenuAccessRequest,
            MenuAccessResponse,
            OverrideSummary,
            NavigationView,
            VisibleTab,
            VisibleSubItem,
            PayrollStatus,
            PayrollRecord,
            PayrollFilter,
            PayslipQuery,
            GeneratePayroll,
            UpdatePayrollStatus,
            PayrollAdjustment,
            PaginatedPayrollResponse,
            BpjsContribution
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Menu Access", description = "Menu access resolution and overrides"),
        (name = "Payroll", description = "Payroll generation and lifecycle"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented_with_bearer_auth() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/menu-access",
            "/api/menu-access/me",
            "/api/menu-access/me/navigation",
            "/api/menu-access/defaults",
            "/api/menu-access/{user_id}",
            "/api/payroll",
            "/api/payroll/me",
            "/api/payroll/bpjs",
            "/api/payroll/generate",
            "/api/payroll/{payroll_id}",
            "/api/payroll/{payroll_id}/status",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
