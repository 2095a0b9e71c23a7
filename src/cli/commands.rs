//! Command dispatch: one function per subcommand.

use std::io;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::OrganizationService;
use crate::cli::args::{Cli, Commands, ConfigCommands, ParentArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{picklist, DomainError, NewOrganization, OrganizationPatch, ParentSelection};
use crate::infrastructure::RealFileSystem;

/// Run the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".into()));
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    debug!("settings: {:?}", settings);

    if let Commands::Config { command } = command {
        return config_command(command, &settings);
    }

    let service = OrganizationService::new(
        Arc::new(RealFileSystem),
        settings.document_paths(),
        settings.editor.clone(),
    );

    match command {
        Commands::Tree => cmd_tree(&service),
        Commands::List => cmd_list(&service),
        Commands::Show { id } => cmd_show(&service, id),
        Commands::NextId => cmd_next_id(&service),
        Commands::Add {
            name,
            manager,
            parent,
        } => cmd_add(&service, name, manager, parent),
        Commands::Update { id, name, manager } => cmd_update(&service, id, name, manager),
        Commands::Remove { id } => cmd_remove(&service, id),
        Commands::Move { id, parent } => cmd_move(&service, id, parent),
        Commands::Search { query, employees } => cmd_search(&service, query, *employees),
        Commands::Import { records } => {
            let count = service.import_records(records)?;
            output::success(&format!(
                "imported {} organizations into {}",
                count,
                service.paths().forest_file.display()
            ));
            Ok(())
        }
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = std::env::current_dir().ok();
    let mut settings = Settings::load(cwd.as_deref())?;
    if let Some(forest) = &cli.forest {
        settings.forest_file = forest.clone();
    }
    if let Some(directory) = &cli.directory {
        settings.directory_file = directory.clone();
    }
    Ok(settings)
}

fn parent_selection(args: &ParentArgs) -> CliResult<ParentSelection> {
    match (&args.parent, args.root) {
        (Some(_), true) => Err(CliError::InvalidArgs(
            "--parent and --root are mutually exclusive".into(),
        )),
        (Some(id), false) => Ok(ParentSelection::from_optional_id(Some(id))),
        (None, true) => Ok(ParentSelection::Root),
        (None, false) => Ok(ParentSelection::Unset),
    }
}

fn config_command(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::field("global", &p.display()),
                None => output::warning("no config directory on this platform"),
            }
            if let Ok(cwd) = std::env::current_dir() {
                output::field("local", &local_config_path(&cwd).display());
            }
        }
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_tree(service: &OrganizationService) -> CliResult<()> {
    let forest = service.load_forest()?;
    if forest.is_empty() {
        output::warning("no organizations");
        return Ok(());
    }
    output::info(&forest.to_tree_string("organizations"));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_list(service: &OrganizationService) -> CliResult<()> {
    let forest = service.load_forest()?;
    for (id, label) in picklist(&forest) {
        output::info(&format!("{}\t{}", id, label));
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_show(service: &OrganizationService, id: &str) -> CliResult<()> {
    let forest = service.load_forest()?;
    let org = forest.get(id).ok_or_else(|| DomainError::not_found(id))?;
    output::header(&org.label());
    output::field(
        "parent",
        org.parent_organization_id.as_deref().unwrap_or("-"),
    );
    output::field(
        "manager",
        &format!("{} ({})", org.manager_display_name(), org.manager_id),
    );
    if let Some(count) = org.employee_count {
        output::field("employees", &count);
    }
    let children = forest.children_of(id)?;
    output::field("children", &children.len());
    for child in children {
        output::detail(&child.label());
    }
    Ok(())
}

#[instrument(skip(service))]
fn cmd_next_id(service: &OrganizationService) -> CliResult<()> {
    output::info(&service.next_id()?);
    Ok(())
}

#[instrument(skip(service))]
fn cmd_add(
    service: &OrganizationService,
    name: &str,
    manager: &str,
    parent: &ParentArgs,
) -> CliResult<()> {
    let new = NewOrganization {
        organization_name: name.to_string(),
        manager_id: manager.to_string(),
        parent: parent_selection(parent)?,
    };
    let id = service.add(&new)?;
    output::success(&format!("added {} ({})", name, id));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_update(service: &OrganizationService, id: &str, name: &str, manager: &str) -> CliResult<()> {
    let patch = OrganizationPatch {
        organization_name: name.to_string(),
        manager_id: manager.to_string(),
    };
    service.update(id, &patch)?;
    output::success(&format!("updated {}", id));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_remove(service: &OrganizationService, id: &str) -> CliResult<()> {
    service.remove(id)?;
    output::success(&format!("removed {}", id));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_move(service: &OrganizationService, id: &str, parent: &ParentArgs) -> CliResult<()> {
    let target = parent_selection(parent)?;
    service.relocate(id, &target)?;
    output::success(&format!("moved {}", id));
    Ok(())
}

#[instrument(skip(service))]
fn cmd_search(service: &OrganizationService, query: &str, employees: bool) -> CliResult<()> {
    if employees {
        for e in service.search_employees(query)? {
            output::info(&format!("{}\t{}", e.employee_id, e.full_name()));
        }
    } else {
        for org in service.search_organizations(query)? {
            output::info(&format!("{}\t{}", org.organization_id, org.label()));
        }
    }
    Ok(())
}
