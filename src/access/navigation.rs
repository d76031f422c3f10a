use serde::Serialize;
use utoipa::ToSchema;

use crate::access::resolver::EffectiveAccess;
use crate::model::menu::{MenuKey, MenuKeySet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMenuItem {
    pub name: &'static str,
    pub key: MenuKey,
    pub href: &'static str,
}

/// A top-level navigation group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavTab {
    pub name: &'static str,
    pub href: &'static str,
    pub menu_keys: &'static [MenuKey],
    pub sub_items: &'static [SubMenuItem],
}

impl NavTab {
    /// Dashboard is shown no matter what the user was granted.
    pub fn is_dashboard(&self) -> bool {
        self.menu_keys.contains(&MenuKey::Dashboard)
    }
}

const fn item(name: &'static str, key: MenuKey, href: &'static str) -> SubMenuItem {
    SubMenuItem { name, key, href }
}

pub const NAV_TABS: &[NavTab] = &[
    NavTab {
        name: "Dashboard",
        href: "/dashboard",
        menu_keys: &[MenuKey::Dashboard],
        sub_items: &[],
    },
    NavTab {
        name: "Organization",
        href: "/dashboard/companies",
        menu_keys: &[
            MenuKey::Companies,
            MenuKey::Departments,
            MenuKey::Positions,
            MenuKey::Shifts,
            MenuKey::OrganizationStructure,
        ],
        sub_items: &[
            item("Companies", MenuKey::Companies, "/dashboard/companies"),
            item("Departments", MenuKey::Departments, "/dashboard/departments"),
            item("Positions", MenuKey::Positions, "/dashboard/positions"),
            item("Shifts", MenuKey::Shifts, "/dashboard/shifts"),
            item(
                "Organization Structure",
                MenuKey::OrganizationStructure,
                "/dashboard/organization-structure",
            ),
        ],
    },
    NavTab {
        name: "People",
        href: "/dashboard/users",
        menu_keys: &[MenuKey::Users, MenuKey::Employees],
        sub_items: &[
            item("Users", MenuKey::Users, "/dashboard/users"),
            item("Employees", MenuKey::Employees, "/dashboard/employees"),
        ],
    },
    NavTab {
        name: "Attendance",
        href: "/dashboard/attendance",
        menu_keys: &[MenuKey::Attendance, MenuKey::Leaves],
        sub_items: &[
            item("Attendance", MenuKey::Attendance, "/dashboard/attendance"),
            item("Leaves", MenuKey::Leaves, "/dashboard/leaves"),
        ],
    },
    NavTab {
        name: "Payroll",
        href: "/dashboard/payroll",
        menu_keys: &[MenuKey::Payroll, MenuKey::Payslips],
        sub_items: &[
            item("Payroll", MenuKey::Payroll, "/dashboard/payroll"),
            item("Payslips", MenuKey::Payslips, "/dashboard/payslips"),
        ],
    },
    NavTab {
        name: "Administration",
        href: "/dashboard/menu-access",
        menu_keys: &[MenuKey::MenuAccessPolicy],
        sub_items: &[item(
            "Menu Access",
            MenuKey::MenuAccessPolicy,
            "/dashboard/menu-access",
        )],
    },
];

/// `None` means "role defaults, show everything"; otherwise Dashboard plus
/// every tab with at least one allowed key.
pub fn filter_visible_tabs<'a>(tabs: &'a [NavTab], allowed: Option<&MenuKeySet>) -> Vec<&'a NavTab> {
    match allowed {
        None => tabs.iter().collect(),
        Some(keys) => tabs
            .iter()
            .filter(|tab| tab.is_dashboard() || tab.menu_keys.iter().any(|k| keys.contains(k)))
            .collect(),
    }
}

pub fn filter_visible_sub_items<'a>(
    items: &'a [SubMenuItem],
    allowed: Option<&MenuKeySet>,
) -> Vec<&'a SubMenuItem> {
    match allowed {
        None => items.iter().collect(),
        Some(keys) => items.iter().filter(|i| keys.contains(&i.key)).collect(),
    }
}

/// Tab owning `pathname`; `/dashboard` itself selects Dashboard.
pub fn active_tab(pathname: &str) -> Option<&'static NavTab> {
    if pathname == "/dashboard" {
        return NAV_TABS.first();
    }

    NAV_TABS.iter().filter(|tab| !tab.is_dashboard()).find(|tab| {
        if tab.sub_items.is_empty() {
            pathname.starts_with(tab.href)
        } else {
            tab.sub_items.iter().any(|s| pathname.starts_with(s.href))
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VisibleSubItem {
    #[schema(example = "Attendance")]
    pub name: String,
    pub key: MenuKey,
    #[schema(example = "/dashboard/attendance")]
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VisibleTab {
    #[schema(example = "Attendance")]
    pub name: String,
    #[schema(example = "/dashboard/attendance")]
    pub href: String,
    pub sub_items: Vec<VisibleSubItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NavigationView {
    pub tabs: Vec<VisibleTab>,
    /// Visible tab owning the requested path, if any.
    #[schema(example = "Attendance")]
    pub active_tab: Option<String>,
}

/// Navigation for `access`, with the tab owning `pathname` marked active
/// when the caller can see it.
pub fn navigation_view(access: &EffectiveAccess, pathname: Option<&str>) -> NavigationView {
    let tabs = navigation_for(access);
    let active = pathname
        .and_then(active_tab)
        .map(|tab| tab.name)
        .filter(|name| tabs.iter().any(|t| t.name == *name))
        .map(str::to_string);

    NavigationView {
        tabs,
        active_tab: active,
    }
}

/// Navigation a caller may render, with sub-items already filtered.
/// Role defaults leave the menu unfiltered; only an override narrows it.
pub fn navigation_for(access: &EffectiveAccess) -> Vec<VisibleTab> {
    let allowed = match access {
        EffectiveAccess::RoleDefault(_) => None,
        EffectiveAccess::Override(keys) => Some(keys),
    };

    filter_visible_tabs(NAV_TABS, allowed)
        .into_iter()
        .map(|tab| VisibleTab {
            name: tab.name.to_string(),
            href: tab.href.to_string(),
            sub_items: filter_visible_sub_items(tab.sub_items, allowed)
                .into_iter()
                .map(|s| VisibleSubItem {
                    name: s.name.to_string(),
                    key: s.key,
                    href: s.href.to_string(),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::resolver::{resolve_effective_access, role_defaults};
    use crate::model::role::Role;
    use std::collections::HashMap;
    use strum::IntoEnumIterator;

    fn names(tabs: &[&NavTab]) -> Vec<&'static str> {
        tabs.iter().map(|t| t.name).collect()
    }

    #[test]
    fn every_key_belongs_to_exactly_one_tab() {
        let mut owners: HashMap<MenuKey, usize> = HashMap::new();
        for tab in NAV_TABS {
            for key in tab.menu_keys {
                *owners.entry(*key).or_default() += 1;
            }
            // sub-items mirror the tab's keys
            for sub in tab.sub_items {
                assert!(tab.menu_keys.contains(&sub.key), "{}", sub.name);
            }
        }
        for key in MenuKey::iter() {
            assert_eq!(owners.get(&key), Some(&1), "{key}");
        }
    }

    #[test]
    fn role_default_keys_are_all_navigable() {
        for role in Role::iter() {
            for key in role_defaults(role) {
                assert!(NAV_TABS.iter().any(|t| t.menu_keys.contains(key)));
            }
        }
    }

    #[test]
    fn no_override_shows_every_tab() {
        let visible = filter_visible_tabs(NAV_TABS, None);
        assert_eq!(visible.len(), NAV_TABS.len());
        assert!(visible.iter().zip(NAV_TABS).all(|(a, b)| *a == b));
    }

    #[test]
    fn attendance_only_keeps_dashboard_and_attendance() {
        let allowed: MenuKeySet = [MenuKey::Attendance].into_iter().collect();
        let visible = filter_visible_tabs(NAV_TABS, Some(&allowed));
        assert_eq!(names(&visible), ["Dashboard", "Attendance"]);
    }

    #[test]
    fn empty_set_still_shows_dashboard() {
        let visible = filter_visible_tabs(NAV_TABS, Some(&MenuKeySet::new()));
        assert_eq!(names(&visible), ["Dashboard"]);
    }

    #[test]
    fn sub_items_follow_membership() {
        let payroll_tab = &NAV_TABS[4];
        assert_eq!(filter_visible_sub_items(payroll_tab.sub_items, None).len(), 2);

        let allowed: MenuKeySet = [MenuKey::Payslips].into_iter().collect();
        let visible = filter_visible_sub_items(payroll_tab.sub_items, Some(&allowed));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].href, "/dashboard/payslips");
    }

    #[test]
    fn active_tab_matches_sub_item_prefix() {
        assert_eq!(active_tab("/dashboard").map(|t| t.name), Some("Dashboard"));
        assert_eq!(active_tab("/dashboard/leaves/create").map(|t| t.name), Some("Attendance"));
        assert_eq!(
            active_tab("/dashboard/organization-structure").map(|t| t.name),
            Some("Organization")
        );
        assert_eq!(active_tab("/dashboard/menu-access").map(|t| t.name), Some("Administration"));
        assert_eq!(active_tab("/settings"), None);
    }

    #[test]
    fn role_defaults_show_the_whole_menu() {
        let nav = navigation_for(&resolve_effective_access(Role::Employee, None));
        let tab_names: Vec<&str> = nav.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            tab_names,
            ["Dashboard", "Organization", "People", "Attendance", "Payroll", "Administration"]
        );

        let nav = navigation_for(&resolve_effective_access(Role::Admin, None));
        let payroll = nav.iter().find(|t| t.name == "Payroll").unwrap();
        let items: Vec<&str> = payroll.sub_items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(items, ["Payroll", "Payslips"]);
    }

    #[test]
    fn override_narrows_tabs_and_sub_items() {
        let keys: MenuKeySet = [MenuKey::Attendance].into_iter().collect();
        let nav = navigation_for(&EffectiveAccess::Override(keys));
        let tab_names: Vec<&str> = nav.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tab_names, ["Dashboard", "Attendance"]);
        assert_eq!(nav[1].sub_items.len(), 1);
        assert_eq!(nav[1].sub_items[0].key, MenuKey::Attendance);
    }

    #[test]
    fn active_tab_is_reported_only_when_visible() {
        let keys: MenuKeySet = [MenuKey::Attendance, MenuKey::Leaves].into_iter().collect();
        let access = EffectiveAccess::Override(keys);

        let view = navigation_view(&access, Some("/dashboard/leaves"));
        assert_eq!(view.active_tab.as_deref(), Some("Attendance"));

        let view = navigation_view(&access, Some("/dashboard/payroll"));
        assert_eq!(view.active_tab, None);

        assert_eq!(navigation_view(&access, None).active_tab, None);

        let defaults = resolve_effective_access(Role::Employee, None);
        let view = navigation_view(&defaults, Some("/dashboard/payroll"));
        assert_eq!(view.active_tab.as_deref(), Some("Payroll"));
    }
}
