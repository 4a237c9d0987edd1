use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::{leave_request::EmployeeId, role::Role};
use actix_web::error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};
use tracing::{Span, info_span};

/// Caller identity taken from the `Authorization: Bearer` token.
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<EmployeeId>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> actix_web::Result<AuthUser> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ErrorUnauthorized("Missing token"))?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ErrorInternalServerError("Config missing"))?;

    let claims =
        verify_token(token, &config.jwt_secret).map_err(|_| ErrorUnauthorized("Invalid token"))?;
    let role = Role::try_from(claims.role).map_err(|_| ErrorUnauthorized("Invalid role"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        match self.role {
            Role::Admin => Ok(()),
            _ => Err(ErrorForbidden("Admin only")),
        }
    }

    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if self.role.is_manager() {
            Ok(())
        } else {
            Err(ErrorForbidden("HR/Admin only"))
        }
    }

    /// Span naming the caller; audit events emitted inside it carry who acted.
    pub fn span(&self) -> Span {
        info_span!(
            "caller",
            user_id = self.user_id,
            username = %self.username,
            role = ?self.role
        )
    }

    /// The caller's own employee record.
    pub fn own_employee_id(&self) -> actix_web::Result<EmployeeId> {
        self.employee_id
            .ok_or_else(|| ErrorForbidden("No employee profile"))
    }

    /// HR/Admin may act for anyone; everyone else only for themselves.
    pub fn require_self_or_manager(&self, employee_id: EmployeeId) -> actix_web::Result<()> {
        if self.role.is_manager() || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(ErrorForbidden("Not your leave record"))
        }
    }
}
