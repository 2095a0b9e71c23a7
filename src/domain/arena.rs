//! Arena-backed organization forest.
//!
//! Nodes live in a generational arena; edges are arena indices. A side map
//! from `organization_id` to index gives constant-time lookup by id.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::{Organization, OrganizationNode};
use crate::domain::error::{DomainError, DomainResult};

/// Arena slot: one organization plus its tree links.
#[derive(Debug, Clone)]
pub struct OrgEntry {
    pub organization: Organization,
    /// Index of parent entry, None for roots
    pub parent: Option<Index>,
    /// Child entries in display order
    pub children: Vec<Index>,
}

/// Forest of organization trees.
///
/// Values are cheap to clone relative to the nested representation and every
/// editor operation returns a fresh `Forest`, so the caller's value is never
/// observed half-mutated.
#[derive(Debug, Clone)]
pub struct Forest {
    arena: Arena<OrgEntry>,
    by_id: HashMap<String, Index>,
    roots: Vec<Index>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new()
    }
}

impl Forest {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_id: HashMap::new(),
            roots: Vec::new(),
        }
    }

    /// Converts the nested interchange shape into an arena forest.
    ///
    /// Root and child order is preserved. Fails if an id occurs twice.
    #[instrument(level = "debug", skip(nodes), fields(roots = nodes.len()))]
    pub fn from_nodes(nodes: Vec<OrganizationNode>) -> DomainResult<Self> {
        let mut forest = Self::new();
        // (node, parent) pairs; reversed so that pops come out in order
        let mut stack: Vec<(OrganizationNode, Option<Index>)> =
            nodes.into_iter().rev().map(|n| (n, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            let OrganizationNode {
                organization,
                children,
            } = node;
            let idx = forest.attach(organization, parent)?;
            for child in children.into_iter().rev() {
                stack.push((child, Some(idx)));
            }
        }
        Ok(forest)
    }

    /// Converts back to the nested interchange shape.
    #[instrument(level = "debug", skip(self))]
    pub fn to_nodes(&self) -> Vec<OrganizationNode> {
        self.roots
            .iter()
            .filter_map(|&idx| self.build_node(idx))
            .collect()
    }

    fn build_node(&self, idx: Index) -> Option<OrganizationNode> {
        let entry = self.arena.get(idx)?;
        Some(OrganizationNode {
            organization: entry.organization.clone(),
            children: entry
                .children
                .iter()
                .filter_map(|&child| self.build_node(child))
                .collect(),
        })
    }

    /// Appends an organization under `parent` (or as a new root).
    pub(crate) fn attach(
        &mut self,
        organization: Organization,
        parent: Option<Index>,
    ) -> DomainResult<Index> {
        if self.by_id.contains_key(&organization.organization_id) {
            return Err(DomainError::DuplicateId(organization.organization_id));
        }
        let id = organization.organization_id.clone();
        let idx = self.arena.insert(OrgEntry {
            organization,
            parent,
            children: Vec::new(),
        });
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_entry) => parent_entry.children.push(idx),
            None => self.roots.push(idx),
        }
        self.by_id.insert(id, idx);
        Ok(idx)
    }

    /// Detaches `idx` from its parent's child list (or the root list).
    pub(crate) fn unlink(&mut self, idx: Index) {
        let parent = self.arena.get(idx).and_then(|e| e.parent);
        let siblings = match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_entry) => &mut parent_entry.children,
            None => &mut self.roots,
        };
        siblings.retain(|&sibling| sibling != idx);
    }

    /// Removes `idx` and its whole subtree from the arena.
    pub(crate) fn drop_subtree(&mut self, idx: Index) {
        self.unlink(idx);
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.arena.remove(current) {
                self.by_id.remove(&entry.organization.organization_id);
                stack.extend(entry.children);
            }
        }
    }

    /// Re-hangs an already-unlinked node below `parent` (or as root).
    pub(crate) fn relink(&mut self, idx: Index, parent: Option<Index>) {
        if let Some(entry) = self.arena.get_mut(idx) {
            entry.parent = parent;
        }
        match parent.and_then(|p| self.arena.get_mut(p)) {
            Some(parent_entry) => parent_entry.children.push(idx),
            None => self.roots.push(idx),
        }
    }

    pub fn index_of(&self, id: &str) -> Option<Index> {
        self.by_id.get(id).copied()
    }

    pub fn entry(&self, idx: Index) -> Option<&OrgEntry> {
        self.arena.get(idx)
    }

    pub(crate) fn entry_mut(&mut self, idx: Index) -> Option<&mut OrgEntry> {
        self.arena.get_mut(idx)
    }

    pub fn get(&self, id: &str) -> Option<&Organization> {
        self.index_of(id)
            .and_then(|idx| self.arena.get(idx))
            .map(|e| &e.organization)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Organization> + '_ {
        self.roots
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .map(|e| &e.organization)
    }

    /// Direct children of `id`, in order. Unknown ids yield `NotFound`.
    pub fn children_of(&self, id: &str) -> DomainResult<Vec<&Organization>> {
        let entry = self
            .index_of(id)
            .and_then(|idx| self.arena.get(idx))
            .ok_or_else(|| DomainError::not_found(id))?;
        Ok(entry
            .children
            .iter()
            .filter_map(|&c| self.arena.get(c))
            .map(|e| &e.organization)
            .collect())
    }

    /// Parent organization of `id`, following tree position.
    pub fn parent_of(&self, id: &str) -> Option<&Organization> {
        self.index_of(id)
            .and_then(|idx| self.arena.get(idx))
            .and_then(|e| e.parent)
            .and_then(|p| self.arena.get(p))
            .map(|e| &e.organization)
    }

    /// True if `candidate` is `ancestor` itself or lies in its subtree.
    pub(crate) fn is_in_subtree(&self, ancestor: Index, candidate: Index) -> bool {
        let mut current = Some(candidate);
        while let Some(idx) = current {
            if idx == ancestor {
                return true;
            }
            current = self.arena.get(idx).and_then(|e| e.parent);
        }
        false
    }

    /// Pre-order iterator: node before its children, roots and children in order.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Number of levels in the deepest tree, 0 for an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.roots
            .iter()
            .map(|&root| self.calculate_depth(root))
            .max()
            .unwrap_or(0)
    }

    fn calculate_depth(&self, idx: Index) -> usize {
        if let Some(entry) = self.arena.get(idx) {
            1 + entry
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Ids of all organizations without children, in pre-order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, entry)| entry.children.is_empty())
            .map(|(_, entry)| entry.organization.organization_id.clone())
            .collect()
    }

    /// Renders the forest for terminal display.
    ///
    /// Multiple roots hang below a synthetic `label` node.
    pub fn to_tree_string(&self, label: &str) -> Tree<String> {
        fn build(forest: &Forest, idx: Index) -> Option<Tree<String>> {
            let entry = forest.arena.get(idx)?;
            let org = &entry.organization;
            let manager = org.manager_display_name();
            let text = if manager.is_empty() {
                format!("{} [{}]", org.label(), org.manager_id)
            } else {
                format!("{} [{}]", org.label(), manager)
            };
            let leaves: Vec<_> = entry
                .children
                .iter()
                .filter_map(|&c| build(forest, c))
                .collect();
            Some(Tree::new(text).with_leaves(leaves))
        }

        let leaves: Vec<_> = self
            .roots
            .iter()
            .filter_map(|&root| build(self, root))
            .collect();
        Tree::new(label.to_string()).with_leaves(leaves)
    }
}

pub struct PreOrderIterator<'a> {
    forest: &'a Forest,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(forest: &'a Forest) -> Self {
        // Push roots in reverse order for left-to-right traversal
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a OrgEntry);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(entry) = self.forest.arena.get(current) {
                for &child in entry.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current, entry));
            }
        }
        None
    }
}
