//! Organization forest editor.
//!
//! Every operation takes the current forest by reference and returns a new
//! forest, or an error with the input left as it was.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::domain::arena::Forest;
use crate::domain::entities::{
    is_blank, EmployeeDirectory, NewOrganization, Organization, OrganizationPatch,
    ParentSelection,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ids::generate_next_id;

/// Behavior switches for the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorOptions {
    /// Accept `ParentSelection::Root` when adding.
    pub allow_root_parent: bool,
    /// Refuse to remove organizations that still have children.
    pub strict_remove: bool,
    /// Re-resolve manager names from the directory on update.
    pub refresh_manager_names: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            allow_root_parent: false,
            strict_remove: true,
            refresh_manager_names: false,
        }
    }
}

/// Pure editor over an organization forest.
#[derive(Debug, Clone, Default)]
pub struct OrgTreeEditor {
    options: EditorOptions,
    directory: EmployeeDirectory,
}

impl OrgTreeEditor {
    pub fn new(options: EditorOptions, directory: EmployeeDirectory) -> Self {
        Self { options, directory }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn directory(&self) -> &EmployeeDirectory {
        &self.directory
    }

    /// All organizations in pre-order.
    pub fn flatten<'f>(&self, forest: &'f Forest) -> Vec<&'f Organization> {
        crate::domain::search::flatten(forest)
    }

    pub fn find_by_id<'f>(&self, forest: &'f Forest, id: &str) -> DomainResult<&'f Organization> {
        forest.get(id).ok_or_else(|| DomainError::not_found(id))
    }

    pub fn generate_next_id(&self, forest: &Forest) -> DomainResult<String> {
        generate_next_id(forest)
    }

    /// Adds a new leaf organization and returns the new forest with its id.
    ///
    /// An unresolvable parent id places the organization at root level.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn add(&self, forest: &Forest, new: &NewOrganization) -> DomainResult<(Forest, String)> {
        if is_blank(&new.organization_name) || is_blank(&new.manager_id) {
            return Err(DomainError::missing_fields());
        }
        let requested_parent = match &new.parent {
            ParentSelection::Unset => return Err(DomainError::missing_fields()),
            ParentSelection::Root if !self.options.allow_root_parent => {
                return Err(DomainError::missing_fields())
            }
            ParentSelection::Root => None,
            ParentSelection::Organization(id) if is_blank(id) => {
                return Err(DomainError::missing_fields())
            }
            ParentSelection::Organization(id) => Some(id.as_str()),
        };

        let parent_idx = requested_parent.and_then(|id| {
            let idx = forest.index_of(id);
            if idx.is_none() {
                debug!("parent {} not found, adding at root level", id);
            }
            idx
        });
        let parent_id = parent_idx
            .and_then(|idx| forest.entry(idx))
            .map(|e| e.organization.organization_id.clone());

        let id = generate_next_id(forest)?;
        let (first, last) = self.directory.manager_names(&new.manager_id);
        let organization = Organization {
            organization_id: id.clone(),
            organization_name: new.organization_name.clone(),
            parent_organization_id: parent_id,
            manager_id: new.manager_id.clone(),
            manager_first_name: first,
            manager_last_name: last,
            employee_count: None,
        };

        let mut next = forest.clone();
        next.attach(organization, parent_idx)?;
        info!("added organization {}", id);
        Ok((next, id))
    }

    /// Renames an organization and/or changes its manager id.
    ///
    /// Parent and children are left alone. Manager names are only refreshed
    /// when `refresh_manager_names` is enabled.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn update(&self, forest: &Forest, id: &str, patch: &OrganizationPatch) -> DomainResult<Forest> {
        if is_blank(&patch.organization_name) || is_blank(&patch.manager_id) {
            return Err(DomainError::missing_fields());
        }
        let idx = forest.index_of(id).ok_or_else(|| DomainError::not_found(id))?;

        let mut next = forest.clone();
        let entry = next.entry_mut(idx).ok_or_else(|| DomainError::not_found(id))?;
        let org = &mut entry.organization;
        org.organization_name = patch.organization_name.clone();
        if self.options.refresh_manager_names && org.manager_id != patch.manager_id {
            let (first, last) = self.directory.manager_names(&patch.manager_id);
            org.manager_first_name = first;
            org.manager_last_name = last;
        }
        org.manager_id = patch.manager_id.clone();
        info!("updated organization {}", id);
        Ok(next)
    }

    /// Removes an organization.
    ///
    /// With `strict_remove` only leaves can be removed; otherwise the whole
    /// subtree goes with it.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn remove(&self, forest: &Forest, id: &str) -> DomainResult<Forest> {
        let idx = forest.index_of(id).ok_or_else(|| DomainError::not_found(id))?;
        let child_count = forest.entry(idx).map(|e| e.children.len()).unwrap_or(0);
        if self.options.strict_remove && child_count > 0 {
            return Err(DomainError::conflict(
                id,
                format!("has {} child organization(s)", child_count),
            ));
        }

        let mut next = forest.clone();
        next.drop_subtree(idx);
        info!(
            "removed organization {} ({} node(s))",
            id,
            forest.len() - next.len()
        );
        Ok(next)
    }

    /// Moves an organization, with its subtree, below another parent or to root level.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn relocate(&self, forest: &Forest, id: &str, target: &ParentSelection) -> DomainResult<Forest> {
        let idx = forest.index_of(id).ok_or_else(|| DomainError::not_found(id))?;
        let parent_idx = match target {
            ParentSelection::Unset => return Err(DomainError::missing_fields()),
            ParentSelection::Root => None,
            ParentSelection::Organization(parent_id) => {
                let parent_idx = forest
                    .index_of(parent_id)
                    .ok_or_else(|| DomainError::not_found(parent_id.as_str()))?;
                if forest.is_in_subtree(idx, parent_idx) {
                    return Err(DomainError::conflict(
                        id,
                        format!("cannot move below itself or its descendant {}", parent_id),
                    ));
                }
                Some(parent_idx)
            }
        };
        let parent_id = parent_idx
            .and_then(|p| forest.entry(p))
            .map(|e| e.organization.organization_id.clone());

        let mut next = forest.clone();
        next.unlink(idx);
        next.relink(idx, parent_idx);
        if let Some(entry) = next.entry_mut(idx) {
            entry.organization.parent_organization_id = parent_id.clone();
        }
        info!("moved organization {} under {:?}", id, parent_id);
        Ok(next)
    }
}
