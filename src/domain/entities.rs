//! Domain entities: core data structures

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Scalar fields of one department/unit, without its children.
///
/// This is what the arena stores per node; the tree edges live in the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub organization_id: String,
    pub organization_name: String,
    /// Parent at creation (or last relocation) time, `None` for roots.
    pub parent_organization_id: Option<String>,
    pub manager_id: String,
    /// Snapshot of the manager's name, not kept in sync with the directory.
    #[serde(default)]
    pub manager_first_name: String,
    #[serde(default)]
    pub manager_last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u32>,
}

impl Organization {
    pub fn manager_display_name(&self) -> String {
        format!("{} {}", self.manager_first_name, self.manager_last_name)
            .trim()
            .to_string()
    }

    /// Label used in parent pick lists: `Name (ID)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.organization_name, self.organization_id)
    }
}

/// Nested interchange shape of a department, as exchanged with persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationNode {
    #[serde(flatten)]
    pub organization: Organization,
    #[serde(default)]
    pub children: Vec<OrganizationNode>,
}

impl OrganizationNode {
    pub fn leaf(organization: Organization) -> Self {
        Self {
            organization,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.organization.organization_id
    }
}

/// Flat record as stored by the backend (one row per organization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub organization_id: String,
    pub organization_name: String,
    pub manager_id: String,
    #[serde(default, alias = "parent_organization_id")]
    pub parent_department_id: Option<String>,
}

/// Directory entry used to resolve manager names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Snapshot of the employee directory, indexed by employee id.
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    employees: Vec<Employee>,
    by_id: HashMap<String, usize>,
}

impl EmployeeDirectory {
    pub fn new(employees: Vec<Employee>) -> Self {
        let mut by_id = HashMap::with_capacity(employees.len());
        for (pos, employee) in employees.iter().enumerate() {
            // first entry wins on duplicate ids
            by_id.entry(employee.employee_id.clone()).or_insert(pos);
        }
        Self { employees, by_id }
    }

    pub fn get(&self, employee_id: &str) -> Option<&Employee> {
        self.by_id.get(employee_id).map(|&pos| &self.employees[pos])
    }

    /// First and last name of an employee, empty strings when unknown.
    pub fn manager_names(&self, employee_id: &str) -> (String, String) {
        self.get(employee_id)
            .map(|e| (e.first_name.clone(), e.last_name.clone()))
            .unwrap_or_default()
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

impl From<Vec<Employee>> for EmployeeDirectory {
    fn from(employees: Vec<Employee>) -> Self {
        Self::new(employees)
    }
}

/// Where a new or relocated organization should hang.
///
/// `Unset` models an empty parent selection; it never passes `add` validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParentSelection {
    #[default]
    Unset,
    Root,
    Organization(String),
}

impl ParentSelection {
    /// Maps an optional, possibly blank, id onto a selection.
    pub fn from_optional_id(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => Self::Organization(id.to_string()),
            _ => Self::Unset,
        }
    }
}

/// Input of the `add` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewOrganization {
    pub organization_name: String,
    pub manager_id: String,
    pub parent: ParentSelection,
}

/// Input of the `update` operation: name and manager only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationPatch {
    pub organization_name: String,
    pub manager_id: String,
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
