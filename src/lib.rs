//! Organization hierarchy editing.
//!
//! The [`domain`] layer holds the pure forest editor; [`application`] wires it
//! to JSON documents through the I/O traits in [`infrastructure`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    DomainError, DomainResult, EditorOptions, Forest, NewOrganization, OrgTreeEditor,
    Organization, OrganizationNode, OrganizationPatch, ParentSelection,
};
