use serde::Serialize;
use utoipa::ToSchema;

use crate::model::menu::{MenuKey, MenuKeySet};
use crate::model::menu_access::MenuAccessOverride;
use crate::model::role::Role;

const ADMIN_DEFAULTS: &[MenuKey] = &[
    MenuKey::Dashboard,
    MenuKey::Companies,
    MenuKey::Departments,
    MenuKey::Positions,
    MenuKey::Shifts,
    MenuKey::OrganizationStructure,
    MenuKey::Users,
    MenuKey::Employees,
    MenuKey::Attendance,
    MenuKey::Leaves,
    MenuKey::Payroll,
    MenuKey::MenuAccessPolicy,
];

const HR_DEFAULTS: &[MenuKey] = &[
    MenuKey::Dashboard,
    MenuKey::Companies,
    MenuKey::Departments,
    MenuKey::Positions,
    MenuKey::Shifts,
    MenuKey::OrganizationStructure,
    MenuKey::Users,
    MenuKey::Employees,
    MenuKey::Attendance,
    MenuKey::Leaves,
    MenuKey::Payroll,
];

const EMPLOYEE_DEFAULTS: &[MenuKey] = &[MenuKey::Dashboard, MenuKey::Attendance, MenuKey::Leaves];

/// Default menus of a role, in canonical order.
pub fn role_defaults(role: Role) -> &'static [MenuKey] {
    match role {
        Role::Admin => ADMIN_DEFAULTS,
        Role::Hr => HR_DEFAULTS,
        Role::Employee => EMPLOYEE_DEFAULTS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    RoleDefault,
    Override,
}

/// What a user may see, resolved once per request.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectiveAccess {
    RoleDefault(Role),
    Override(MenuKeySet),
}

impl EffectiveAccess {
    pub fn keys(&self) -> MenuKeySet {
        match self {
            EffectiveAccess::RoleDefault(role) => role_defaults(*role).iter().copied().collect(),
            EffectiveAccess::Override(keys) => keys.clone(),
        }
    }

    pub fn source(&self) -> AccessSource {
        match self {
            EffectiveAccess::RoleDefault(_) => AccessSource::RoleDefault,
            EffectiveAccess::Override(_) => AccessSource::Override,
        }
    }
}

/// Override wins whenever one exists, even an empty one.
pub fn resolve_effective_access(
    role: Role,
    access_override: Option<&MenuAccessOverride>,
) -> EffectiveAccess {
    match access_override {
        Some(o) => EffectiveAccess::Override(o.menu_keys.clone()),
        None => EffectiveAccess::RoleDefault(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use strum::IntoEnumIterator;

    fn override_of(keys: &[MenuKey]) -> MenuAccessOverride {
        MenuAccessOverride {
            user_id: 7,
            menu_keys: keys.iter().copied().collect(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn every_role_default_is_non_empty_and_has_dashboard() {
        for role in Role::iter() {
            let defaults = role_defaults(role);
            assert!(!defaults.is_empty(), "{role}");
            assert!(defaults.contains(&MenuKey::Dashboard), "{role}");
        }
    }

    #[test]
    fn role_defaults_are_in_canonical_order() {
        for role in Role::iter() {
            let defaults = role_defaults(role);
            assert!(defaults.windows(2).all(|w| w[0] < w[1]), "{role}");
        }
    }

    #[test]
    fn no_override_resolves_to_role_defaults() {
        for role in Role::iter() {
            let access = resolve_effective_access(role, None);
            let expected: MenuKeySet = role_defaults(role).iter().copied().collect();
            assert_eq!(access.keys(), expected);
            assert_eq!(access.source(), AccessSource::RoleDefault);
        }
    }

    #[test]
    fn override_is_returned_verbatim_for_any_role() {
        let o = override_of(&[MenuKey::Payslips, MenuKey::Attendance]);
        for role in Role::iter() {
            let access = resolve_effective_access(role, Some(&o));
            assert_eq!(access.keys(), o.menu_keys);
            assert_eq!(access.source(), AccessSource::Override);
        }
    }

    #[test]
    fn empty_override_is_not_the_same_as_no_override() {
        let o = override_of(&[]);
        let access = resolve_effective_access(Role::Admin, Some(&o));
        assert!(access.keys().is_empty());
        assert!(!access.keys().contains(&MenuKey::Dashboard));
        assert_eq!(access, EffectiveAccess::Override(MenuKeySet::new()));
    }

    #[test]
    fn employee_defaults_exclude_admin_screens() {
        let access = resolve_effective_access(Role::Employee, None);
        let keys = access.keys();
        assert!(keys.contains(&MenuKey::Leaves));
        assert!(!keys.contains(&MenuKey::Payroll));
        assert!(!keys.contains(&MenuKey::MenuAccessPolicy));
    }
}
