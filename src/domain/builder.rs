//! Builds a forest from flat organization records.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use crate::domain::arena::Forest;
use crate::domain::entities::{EmployeeDirectory, Organization, OrganizationRecord};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::search::id_summary;

/// Constructs an organization forest from one-row-per-organization records.
///
/// A record becomes a root when its parent is null, points at itself, or
/// points at an id that is not among the records. Manager names are resolved
/// from the directory.
pub struct TreeBuilder<'a> {
    directory: &'a EmployeeDirectory,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(directory: &'a EmployeeDirectory) -> Self {
        Self { directory }
    }

    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&self, records: &[OrganizationRecord]) -> DomainResult<Forest> {
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if positions.insert(&record.organization_id, pos).is_some() {
                return Err(DomainError::DuplicateId(record.organization_id.clone()));
            }
        }

        // children per parent position, in record order
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (pos, record) in records.iter().enumerate() {
            match self.parent_position(record, &positions) {
                Some(parent) => children.entry(parent).or_default().push(pos),
                None => roots.push(pos),
            }
        }

        let mut forest = Forest::new();
        let mut placed: HashSet<usize> = HashSet::with_capacity(records.len());
        for root in roots {
            self.place_subtree(root, records, &children, &mut forest, &mut placed)?;
        }

        // Whatever is left only references itself through a cycle.
        for (pos, record) in records.iter().enumerate() {
            if !placed.contains(&pos) {
                warn!("parent cycle at {}, attaching as root", record.organization_id);
                self.place_subtree(pos, records, &children, &mut forest, &mut placed)?;
            }
        }

        debug!(
            "built forest with {} organizations, roots: {}",
            forest.len(),
            id_summary(forest.roots())
        );
        Ok(forest)
    }

    fn parent_position(
        &self,
        record: &OrganizationRecord,
        positions: &HashMap<&str, usize>,
    ) -> Option<usize> {
        let parent_id = record.parent_department_id.as_deref()?;
        if parent_id == record.organization_id {
            return None;
        }
        let found = positions.get(parent_id).copied();
        if found.is_none() {
            debug!(
                "{} references unknown parent {}, treating as root",
                record.organization_id, parent_id
            );
        }
        found
    }

    fn place_subtree(
        &self,
        start: usize,
        records: &[OrganizationRecord],
        children: &HashMap<usize, Vec<usize>>,
        forest: &mut Forest,
        placed: &mut HashSet<usize>,
    ) -> DomainResult<()> {
        let mut stack = vec![(start, None)];
        while let Some((pos, parent_idx)) = stack.pop() {
            if !placed.insert(pos) {
                continue;
            }
            let record = &records[pos];
            // A cycle member attached as root keeps no parent reference.
            let parent_id = parent_idx
                .and_then(|idx| forest.entry(idx))
                .map(|e| e.organization.organization_id.clone());
            let (first, last) = self.directory.manager_names(&record.manager_id);
            let organization = Organization {
                organization_id: record.organization_id.clone(),
                organization_name: record.organization_name.clone(),
                parent_organization_id: parent_id,
                manager_id: record.manager_id.clone(),
                manager_first_name: first,
                manager_last_name: last,
                employee_count: None,
            };
            let idx = forest.attach(organization, parent_idx)?;
            if let Some(kids) = children.get(&pos) {
                for &kid in kids.iter().rev() {
                    stack.push((kid, Some(idx)));
                }
            }
        }
        Ok(())
    }
}
