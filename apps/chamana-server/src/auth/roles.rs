// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Storefront roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Storefront roles.
///
/// ## Roles
///
/// - `Admin` - Back office: catalog management, reports, token issuance
/// - `Customer` - Registered shopper (cart, orders)
/// - `Artisan` - Supplier who manages their own products
/// - `Guest` - Anonymous browsing session
///
/// Roles are a flat set. Gating is done by listing the roles a handler
/// accepts, not by a hierarchy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office administrator
    Admin,
    /// Registered customer
    Customer,
    /// Product supplier
    Artisan,
    /// Anonymous visitor (least privilege)
    #[default]
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Customer, Role::Artisan, Role::Guest];

    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "customer" => Some(Role::Customer),
            "artisan" => Some(Role::Artisan),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
            Role::Artisan => "artisan",
            Role::Guest => "guest",
        }
    }

    /// Whether this role is one of `allowed`.
    pub fn is_any_of(&self, allowed: &[Role]) -> bool {
        allowed.contains(self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a role list the way error messages show it: `admin, artisan`.
pub fn describe_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" Artisan "), Some(Role::Artisan));
        assert_eq!(Role::parse("Customer"), Some(Role::Customer));
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn is_any_of_checks_membership() {
        assert!(Role::Admin.is_any_of(&[Role::Admin]));
        assert!(Role::Artisan.is_any_of(&[Role::Admin, Role::Artisan]));
        assert!(!Role::Customer.is_any_of(&[Role::Admin]));
        assert!(!Role::Guest.is_any_of(&[]));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Artisan).unwrap(), r#""artisan""#);
        let role: Role = serde_json::from_str(r#""guest""#).unwrap();
        assert_eq!(role, Role::Guest);
        assert!(serde_json::from_str::<Role>(r#""root""#).is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        for role in Role::ALL {
            assert_eq!(serde_json::to_value(role).unwrap(), role.to_string());
        }
    }

    #[test]
    fn describe_roles_joins_names() {
        assert_eq!(describe_roles(&[Role::Admin, Role::Artisan]), "admin, artisan");
        assert_eq!(describe_roles(&[]), "");
    }

    #[test]
    fn default_role_is_guest() {
        assert_eq!(Role::default(), Role::Guest);
    }
}
