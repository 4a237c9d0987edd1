use crate::api::leave_request::{ApproveLeave, RejectLeave};
use crate::model::leave_request::{LeaveDetails, LeaveRecord, LeaveStatus, LeaveSubmission};
use crate::repository::{LeaveFilter, LeavePage};
use crate::service::LeaveBalance;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave API",
        version = "1.0.0",
        description = r#"
## Leave Management

Submission, approval and rejection of employee leave requests under a flat
annual allowance.

### Rules
- A request's dates may not overlap another pending or approved request of the same employee
- Approved days never exceed the annual allowance (20 days unless configured otherwise)
- Only pending requests can be approved, rejected or corrected
- Rejections always carry manager comments

### Security
All endpoints require a **JWT Bearer** token. Deciding on requests is
reserved for **HR** and **Admin**; deleting for **Admin**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::update_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::my_balance,
        crate::api::leave_request::employee_balance
    ),
    components(
        schemas(
            LeaveFilter,
            LeaveRecord,
            LeaveStatus,
            LeavePage,
            LeaveSubmission,
            LeaveDetails,
            LeaveBalance,
            ApproveLeave,
            RejectLeave
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
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
