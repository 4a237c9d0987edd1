use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveDetails, LeaveRecord, LeaveSubmission};
use crate::repository::{LeaveFilter, LeavePage};
use crate::service::{LeaveBalance, LeaveService};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::Instrument;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ApproveLeave {
    #[schema(example = "Enjoy the trip")]
    #[serde(default)]
    pub comments: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "Release week, please pick other dates")]
    #[serde(default)]
    pub comments: String,
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveSubmission,
        description = "Leave request payload; employee_id defaults to the caller",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "id": 1,
            "status": "pending"
         })
        ),
        (status = 400, description = "Missing fields or end_date before start_date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Dates overlap an existing request"),
        (status = 422, description = "Not enough leave balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    payload: web::Json<LeaveSubmission>,
) -> actix_web::Result<impl Responder> {
    let mut submission = payload.into_inner();

    match submission.employee_id {
        Some(employee_id) => auth.require_self_or_manager(employee_id)?,
        None => submission.employee_id = Some(auth.own_employee_id()?),
    }

    let id = service.submit(submission).instrument(auth.span()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave request submitted",
        "id": id,
        "status": "pending"
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(
        content = ApproveLeave,
        description = "Optional manager comments",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = LeaveRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed", body = Object, example = json!({
            "message": "leave request 1 is already rejected",
            "code": "illegal_transition"
        })),
        (status = 422, description = "Approval would exceed the allowance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: Option<web::Json<ApproveLeave>>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let comments = payload.map(|p| p.into_inner().comments).unwrap_or_default();

    let record = service
        .approve(leave_id, &comments)
        .instrument(auth.span())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected successfully", body = LeaveRecord),
        (status = 400, description = "Comments are required", body = Object, example = json!({
            "message": "rejecting a leave request requires manager comments",
            "code": "missing_rejection_reason"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<RejectLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let record = service
        .reject(leave_id, &payload.comments)
        .instrument(auth.span())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// for correcting a pending leave application endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to update")
    ),
    request_body = LeaveDetails,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRecord),
        (status = 400, description = "Invalid dates or reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Overlapping dates or request already processed"),
        (status = 422, description = "Not enough leave balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
    payload: web::Json<LeaveDetails>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let record = service
        .update_details(path.into_inner(), payload.into_inner())
        .instrument(auth.span())
        .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// for deleting a leave application endpoint (Admin)
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to delete")
    ),
    responses(
        (status = 200, description = "Leave request deleted", body = Object, example = json!({
            "message": "Leave request deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    service
        .delete(path.into_inner())
        .instrument(auth.span())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request deleted"
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "leave request 1 not found",
            "code": "not_found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record = service.get(path.into_inner()).await?;
    auth.require_self_or_manager(record.employee_id)?;

    Ok(HttpResponse::Ok().json(record))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeavePage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = service.list(&query).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// for getting the caller's own leave balance endpoint
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    responses(
        (status = 200, description = "Leave balance of the caller", body = LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_balance(
    auth: AuthUser,
    service: web::Data<LeaveService>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.own_employee_id()?;

    let balance = service.balance(employee_id).await?;

    Ok(HttpResponse::Ok().json(balance))
}

/// for getting an employee's leave balance endpoint
#[utoipa::path(
    get,
    path = "/api/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose balance is requested")
    ),
    responses(
        (status = 200, description = "Leave balance of the employee", body = LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn employee_balance(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_manager(employee_id)?;

    let balance = service.balance(employee_id).await?;

    Ok(HttpResponse::Ok().json(balance))
}
