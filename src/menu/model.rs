use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{ValidationError, Violation};

/// Minimum role required to see a menu item.
///
/// Variants are declared lowest first; the derived ordering is the role
/// hierarchy, so a caller satisfies a requirement when `caller >= required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    User,
    DataSteward,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::DataSteward, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::DataSteward => "data-steward",
            Role::Admin => "admin",
        }
    }

    /// Hierarchical check: admin satisfies data-steward and user requirements.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "data-steward" => Ok(Role::DataSteward),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}' (expected user, data-steward or admin)", other)),
        }
    }
}

/// Navigation section an item renders in. Declaration order is render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Primary,
    Secondary,
    Administration,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Primary => "primary",
            Category::Secondary => "secondary",
            Category::Administration => "administration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Category::Primary),
            "secondary" => Ok(Category::Secondary),
            "administration" => Ok(Category::Administration),
            other => Err(format!(
                "unknown category '{}' (expected primary, secondary or administration)",
                other
            )),
        }
    }
}

/// One stored navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub menu_id: String,
    pub label: String,
    pub path: String,
    pub category: Category,
    pub order: i32,
    pub required_role: Role,
    pub is_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Merge `patch` into this record. Returns true when any field changed;
    /// `updated_at` is only touched in that case.
    pub fn apply(&mut self, patch: &MenuPatch, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(label) = &patch.label {
            if *label != self.label {
                self.label = label.clone();
                changed = true;
            }
        }
        if let Some(path) = &patch.path {
            if *path != self.path {
                self.path = path.clone();
                changed = true;
            }
        }
        if let Some(category) = patch.category {
            if category != self.category {
                self.category = category;
                changed = true;
            }
        }
        if let Some(order) = patch.order {
            if order != self.order {
                self.order = order;
                changed = true;
            }
        }
        if let Some(role) = patch.required_role {
            if role != self.required_role {
                self.required_role = role;
                changed = true;
            }
        }
        if let Some(enabled) = patch.is_enabled {
            if enabled != self.is_enabled {
                self.is_enabled = enabled;
                changed = true;
            }
        }

        if changed {
            self.updated_at = now;
        }
        changed
    }

    /// Sort key used by every read path: category, then order, then id.
    pub fn sort_key(&self) -> (Category, i32, &str) {
        (self.category, self.order, self.menu_id.as_str())
    }
}

/// Partial set of record fields. Used for upserts, admin edits and seeding.
///
/// Deserialization accepts the legacy `text` name for `label` and a legacy
/// `roles` allow-list, which [`MenuPatch::validate`] migrates or rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPatch {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "text")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing)]
    pub roles: Option<Vec<Role>>,
}

impl MenuPatch {
    /// Full definition with every field set, as used by the defaults table.
    pub fn definition(
        label: &str,
        path: &str,
        category: Category,
        order: i32,
        required_role: Role,
    ) -> Self {
        Self {
            label: Some(label.to_string()),
            path: Some(path.to_string()),
            category: Some(category),
            order: Some(order),
            required_role: Some(required_role),
            is_enabled: Some(true),
            roles: None,
        }
    }

    pub fn enabled(is_enabled: bool) -> Self {
        Self { is_enabled: Some(is_enabled), ..Default::default() }
    }

    pub fn order(order: i32) -> Self {
        Self { order: Some(order), ..Default::default() }
    }

    /// Check the patch and normalize legacy fields.
    ///
    /// With `creating` set, `label` and `path` must be present. Every problem
    /// is collected before failing.
    pub fn validate(mut self, menu_id: &str, creating: bool) -> Result<MenuPatch, ValidationError> {
        let mut violations = Vec::new();

        check_menu_id(menu_id, &mut violations);

        match &self.label {
            Some(label) if label.trim().is_empty() => {
                violations.push(Violation::new("label", "must not be empty"));
            }
            None if creating => violations.push(Violation::new("label", "is required")),
            _ => {}
        }

        match &self.path {
            Some(path) if path.trim().is_empty() => {
                violations.push(Violation::new("path", "must not be empty"));
            }
            None if creating => violations.push(Violation::new("path", "is required")),
            _ => {}
        }

        if let Some(order) = self.order {
            if order < 0 {
                violations.push(Violation::new("order", format!("must be non-negative, got {}", order)));
            }
        }

        if let Some(roles) = self.roles.take() {
            if self.required_role.is_some() {
                violations.push(Violation::new("roles", "cannot be combined with requiredRole"));
            } else {
                match migrate_allow_list(&roles) {
                    Ok(role) => self.required_role = Some(role),
                    Err(message) => violations.push(Violation::new("roles", message)),
                }
            }
        }

        if violations.is_empty() {
            Ok(self)
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Build a new record from a validated patch, applying field defaults.
    pub fn into_item(self, menu_id: &str, now: DateTime<Utc>) -> Result<MenuItem, ValidationError> {
        let patch = self.validate(menu_id, true)?;

        Ok(MenuItem {
            menu_id: menu_id.to_string(),
            label: patch.label.unwrap_or_default(),
            path: patch.path.unwrap_or_default(),
            category: patch.category.unwrap_or_default(),
            order: patch.order.unwrap_or(0),
            required_role: patch.required_role.unwrap_or_default(),
            is_enabled: patch.is_enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Validate a complete record, e.g. one read back from storage.
pub fn validate(item: &MenuItem) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    check_menu_id(&item.menu_id, &mut violations);
    if item.label.trim().is_empty() {
        violations.push(Violation::new("label", "must not be empty"));
    }
    if item.path.trim().is_empty() {
        violations.push(Violation::new("path", "must not be empty"));
    }
    if item.order < 0 {
        violations.push(Violation::new("order", format!("must be non-negative, got {}", item.order)));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(violations))
    }
}

fn check_menu_id(menu_id: &str, violations: &mut Vec<Violation>) {
    if menu_id.is_empty() {
        violations.push(Violation::new("menuId", "must not be empty"));
    } else if !menu_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        violations.push(Violation::new(
            "menuId",
            format!("'{}' may only contain lowercase letters, digits and '-'", menu_id),
        ));
    }
}

/// A legacy allow-list maps onto a single required role only when it names
/// every role at or above its lowest member.
fn migrate_allow_list(roles: &[Role]) -> Result<Role, String> {
    let lowest = roles
        .iter()
        .min()
        .copied()
        .ok_or_else(|| "allow-list must name at least one role".to_string())?;

    let upward_closed = Role::ALL
        .iter()
        .filter(|role| **role >= lowest)
        .all(|role| roles.contains(role));

    if upward_closed {
        Ok(lowest)
    } else {
        let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
        Err(format!(
            "allow-list [{}] has no single minimum role; use requiredRole",
            names.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn role_hierarchy_is_total() {
        assert!(Role::Admin.satisfies(Role::DataSteward));
        assert!(Role::Admin.satisfies(Role::User));
        assert!(Role::DataSteward.satisfies(Role::User));
        assert!(!Role::User.satisfies(Role::DataSteward));
        assert!(!Role::DataSteward.satisfies(Role::Admin));
    }

    #[test]
    fn enums_use_wire_names() {
        assert_eq!(serde_json::to_value(Role::DataSteward).unwrap(), json!("data-steward"));
        assert_eq!(serde_json::to_value(Category::Administration).unwrap(), json!("administration"));
        assert_eq!("data-steward".parse::<Role>().unwrap(), Role::DataSteward);
        assert!("steward".parse::<Role>().is_err());
    }

    #[test]
    fn into_item_applies_defaults() {
        let patch = MenuPatch {
            label: Some("Dashboard".into()),
            path: Some("/dashboard".into()),
            ..Default::default()
        };
        let item = patch.into_item("dashboard", now()).unwrap();
        assert_eq!(item.category, Category::Primary);
        assert_eq!(item.order, 0);
        assert_eq!(item.required_role, Role::User);
        assert!(item.is_enabled);
    }

    #[test]
    fn validation_reports_every_violation() {
        let patch = MenuPatch {
            label: Some("  ".into()),
            order: Some(-3),
            ..Default::default()
        };
        let err = patch.into_item("Bad Id", now()).unwrap_err();
        let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["menuId", "label", "path", "order"]);
    }

    #[test]
    fn partial_patch_does_not_require_label() {
        assert!(MenuPatch::enabled(false).validate("dashboard", false).is_ok());
        assert!(MenuPatch::enabled(false).validate("dashboard", true).is_err());
    }

    #[test]
    fn unknown_enum_values_fail_to_parse() {
        let result: Result<MenuPatch, _> = serde_json::from_value(json!({
            "label": "Reports",
            "path": "/reports",
            "category": "sidebar"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn legacy_text_field_is_read_as_label() {
        let patch: MenuPatch = serde_json::from_value(json!({
            "text": "Glossary",
            "path": "/glossary"
        }))
        .unwrap();
        assert_eq!(patch.label.as_deref(), Some("Glossary"));
    }

    #[test]
    fn upward_closed_allow_list_migrates() {
        let patch: MenuPatch = serde_json::from_value(json!({
            "label": "Stewardship",
            "path": "/stewardship",
            "roles": ["admin", "data-steward"]
        }))
        .unwrap();
        let item = patch.into_item("stewardship", now()).unwrap();
        assert_eq!(item.required_role, Role::DataSteward);
    }

    #[test]
    fn gapped_allow_list_is_rejected() {
        let patch: MenuPatch = serde_json::from_value(json!({
            "label": "Odd",
            "path": "/odd",
            "roles": ["admin", "user"]
        }))
        .unwrap();
        let err = patch.into_item("odd", now()).unwrap_err();
        assert_eq!(err.violations()[0].field, "roles");
    }

    #[test]
    fn apply_reports_changes_only() {
        let mut item = MenuPatch::definition("Reports", "/reports", Category::Secondary, 10, Role::User)
            .into_item("reports", now())
            .unwrap();
        let before = item.updated_at;

        let same = MenuPatch::definition("Reports", "/reports", Category::Secondary, 10, Role::User);
        assert!(!item.apply(&same, now()));
        assert_eq!(item.updated_at, before);

        assert!(item.apply(&MenuPatch::enabled(false), now()));
        assert!(!item.is_enabled);
    }
}
