//! Organization structure service
//!
//! Loads the forest and the employee directory, runs one editor operation
//! and writes the resulting forest back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt, JsonResultExt};
use crate::domain::{
    filter_by_query, DomainError, EditorOptions, Employee, EmployeeDirectory, Forest,
    NewOrganization, OrgTreeEditor, Organization, OrganizationNode, OrganizationPatch,
    OrganizationRecord, ParentSelection, TreeBuilder,
};
use crate::infrastructure::traits::FileSystem;

/// Deepest forest that is written to disk.
///
/// Every level costs two JSON nesting levels (node object and `children`
/// array) and serde_json refuses to read past 128.
pub const MAX_FOREST_DEPTH: usize = 60;

/// Locations of the JSON documents the service works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    /// Nested forest (array of organization nodes)
    pub forest_file: PathBuf,
    /// Employee directory (array of employees)
    pub directory_file: PathBuf,
}

/// Service for reading and editing the organization structure.
pub struct OrganizationService {
    fs: Arc<dyn FileSystem>,
    paths: DocumentPaths,
    options: EditorOptions,
}

impl OrganizationService {
    /// Create a new organization service.
    pub fn new(fs: Arc<dyn FileSystem>, paths: DocumentPaths, options: EditorOptions) -> Self {
        Self { fs, paths, options }
    }

    pub fn paths(&self) -> &DocumentPaths {
        &self.paths
    }

    /// Load the forest; a missing file is an empty forest.
    #[instrument(level = "debug", skip(self))]
    pub fn load_forest(&self) -> ApplicationResult<Forest> {
        let path = &self.paths.forest_file;
        if !self.fs.exists(path) {
            debug!("load_forest: {} does not exist, starting empty", path.display());
            return Ok(Forest::new());
        }
        let content = self.fs.read_to_string(path).with_path_context("read forest", path)?;
        let nodes: Vec<OrganizationNode> =
            serde_json::from_str(&content).with_document_context("parse forest", path)?;
        Ok(Forest::from_nodes(nodes)?)
    }

    /// Load the employee directory; a missing file is an empty directory.
    #[instrument(level = "debug", skip(self))]
    pub fn load_directory(&self) -> ApplicationResult<EmployeeDirectory> {
        let path = &self.paths.directory_file;
        if !self.fs.exists(path) {
            debug!("load_directory: {} does not exist", path.display());
            return Ok(EmployeeDirectory::default());
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read directory", path)?;
        let employees: Vec<Employee> =
            serde_json::from_str(&content).with_document_context("parse directory", path)?;
        debug!("load_directory: {} employees", employees.len());
        Ok(EmployeeDirectory::new(employees))
    }

    #[instrument(level = "debug", skip(self, forest), fields(organizations = forest.len()))]
    pub fn save_forest(&self, forest: &Forest) -> ApplicationResult<()> {
        let path = &self.paths.forest_file;
        let depth = forest.depth();
        if depth > MAX_FOREST_DEPTH {
            return Err(ApplicationError::TooDeep {
                depth,
                limit: MAX_FOREST_DEPTH,
            });
        }
        let mut content = serde_json::to_string_pretty(&forest.to_nodes())
            .with_document_context("serialize forest", path)?;
        content.push('\n');
        self.fs
            .write_atomic(path, &content)
            .with_path_context("write forest", path)
    }

    /// Editor configured with the current options and directory snapshot.
    pub fn editor(&self) -> ApplicationResult<OrgTreeEditor> {
        Ok(OrgTreeEditor::new(self.options.clone(), self.load_directory()?))
    }

    pub fn find(&self, id: &str) -> ApplicationResult<Organization> {
        let forest = self.load_forest()?;
        let org = forest.get(id).ok_or_else(|| DomainError::not_found(id))?;
        Ok(org.clone())
    }

    pub fn next_id(&self) -> ApplicationResult<String> {
        Ok(crate::domain::generate_next_id(&self.load_forest()?)?)
    }

    /// Add an organization and persist; returns the assigned id.
    pub fn add(&self, new: &NewOrganization) -> ApplicationResult<String> {
        let forest = self.load_forest()?;
        let (forest, id) = self.editor()?.add(&forest, new)?;
        self.save_forest(&forest)?;
        Ok(id)
    }

    pub fn update(&self, id: &str, patch: &OrganizationPatch) -> ApplicationResult<()> {
        let forest = self.load_forest()?;
        let forest = self.editor()?.update(&forest, id, patch)?;
        self.save_forest(&forest)
    }

    pub fn remove(&self, id: &str) -> ApplicationResult<()> {
        let forest = self.load_forest()?;
        let forest = self.editor()?.remove(&forest, id)?;
        self.save_forest(&forest)
    }

    pub fn relocate(&self, id: &str, target: &ParentSelection) -> ApplicationResult<()> {
        let forest = self.load_forest()?;
        let forest = self.editor()?.relocate(&forest, id, target)?;
        self.save_forest(&forest)
    }

    pub fn search_organizations(&self, query: &str) -> ApplicationResult<Vec<Organization>> {
        let forest = self.load_forest()?;
        let all = crate::domain::flatten(&forest);
        Ok(filter_by_query(all, query).into_iter().cloned().collect())
    }

    pub fn search_employees(&self, query: &str) -> ApplicationResult<Vec<Employee>> {
        let directory = self.load_directory()?;
        Ok(filter_by_query(directory.employees(), query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Build the forest from a flat record file and replace the forest file with it.
    #[instrument(level = "debug", skip(self))]
    pub fn import_records(&self, records_file: &Path) -> ApplicationResult<usize> {
        let content = self
            .fs
            .read_to_string(records_file)
            .with_path_context("read records", records_file)?;
        let records: Vec<OrganizationRecord> =
            serde_json::from_str(&content).with_document_context("parse records", records_file)?;
        let directory = self.load_directory()?;
        let forest = TreeBuilder::new(&directory).build(&records)?;
        self.save_forest(&forest)?;
        Ok(forest.len())
    }
}
