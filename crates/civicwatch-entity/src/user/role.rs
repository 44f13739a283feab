//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in CivicWatch.
///
/// Roles are ordered by privilege level: Admin > Official > Citizen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full system administrator.
    Admin,
    /// Department official who can update issue status and assignment.
    Official,
    /// Regular citizen who reports issues, likes, and comments.
    Citizen,
}

impl UserRole {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Official => 2,
            Self::Citizen => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &UserRole) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Check if this role is an official or higher.
    pub fn is_staff(&self) -> bool {
        self.has_at_least(&Self::Official)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Official => "official",
            Self::Citizen => "citizen",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = civicwatch_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "official" => Ok(Self::Official),
            "citizen" => Ok(Self::Citizen),
            _ => Err(civicwatch_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, official, citizen"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privilege_ordering() {
        assert!(UserRole::Admin.has_at_least(&UserRole::Citizen));
        assert!(UserRole::Admin.has_at_least(&UserRole::Admin));
        assert!(UserRole::Official.has_at_least(&UserRole::Citizen));
        assert!(!UserRole::Citizen.has_at_least(&UserRole::Official));
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Official.is_staff());
        assert!(!UserRole::Citizen.is_staff());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("CITIZEN".parse::<UserRole>().unwrap(), UserRole::Citizen);
        assert!("invalid".parse::<UserRole>().is_err());
    }
}
