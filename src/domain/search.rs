//! Case-insensitive substring search over employees and organizations.

use itertools::Itertools;

use crate::domain::arena::Forest;
use crate::domain::entities::{Employee, Organization, OrganizationNode};

/// Something that can be matched against a free-text query.
pub trait Searchable {
    /// Fields the query is matched against.
    fn search_fields(&self) -> Vec<String>;

    fn matches(&self, needle_lowercase: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lowercase))
    }
}

impl Searchable for Employee {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.employee_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.full_name(),
        ]
    }
}

impl Searchable for Organization {
    fn search_fields(&self) -> Vec<String> {
        vec![self.organization_id.clone(), self.organization_name.clone()]
    }
}

impl Searchable for OrganizationNode {
    fn search_fields(&self) -> Vec<String> {
        self.organization.search_fields()
    }
}

impl<T: Searchable + ?Sized> Searchable for &T {
    fn search_fields(&self) -> Vec<String> {
        (**self).search_fields()
    }
}

/// Keeps the items matching `query`, in input order.
///
/// A blank query keeps everything.
pub fn filter_by_query<I, T>(items: I, query: &str) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: Searchable,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.into_iter().collect();
    }
    items
        .into_iter()
        .filter(|item| item.matches(&needle))
        .collect()
}

/// Every organization in pre-order.
pub fn flatten(forest: &Forest) -> Vec<&Organization> {
    forest.iter().map(|(_, entry)| &entry.organization).collect()
}

/// `(id, "Name (ID)")` pairs in pre-order, for parent selection widgets.
pub fn picklist(forest: &Forest) -> Vec<(String, String)> {
    forest
        .iter()
        .map(|(_, entry)| {
            let org = &entry.organization;
            (org.organization_id.clone(), org.label())
        })
        .collect()
}

/// Comma separated ids, used in log lines.
pub fn id_summary<'a>(orgs: impl IntoIterator<Item = &'a Organization>) -> String {
    orgs.into_iter().map(|o| o.organization_id.as_str()).join(", ")
}
