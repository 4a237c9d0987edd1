/// Role carried in the `role` claim of an access token.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    /// Roles allowed to decide on other employees' leave.
    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

impl TryFrom<u8> for Role {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            1 => Role::Admin,
            2 => Role::Hr,
            3 => Role::Employee,
            4 => Role::System,
            5 => Role::ApiUser,
            other => return Err(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_ids_map_to_roles() {
        assert_eq!(Role::try_from(2), Ok(Role::Hr));
        assert_eq!(Role::try_from(Role::ApiUser as u8), Ok(Role::ApiUser));
        assert_eq!(Role::try_from(9), Err(9));
        assert!(Role::Admin.is_manager());
        assert!(!Role::System.is_manager());
    }
}
