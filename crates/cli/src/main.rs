use clap::{Parser, Subcommand};
use fhir::{BundleFormat, Communication, Organization};
use portal_core::{
    config::{default_locale_from_env_value, org_bundle_path_from_env_value},
    constants::ORG_BUNDLE_PATH_ENV,
    FileDirectory, OrgHierarchy, OrgId, OrganizationDirectory,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orgs")]
#[command(about = "Inspect an organization directory bundle")]
struct Cli {
    /// Bundle file (JSON, or YAML by .yaml/.yml extension); defaults to $ORG_BUNDLE_PATH
    #[arg(long, global = true)]
    bundle: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List top-level organizations
    TopLevel,
    /// Print the whole forest as an indented tree
    Tree,
    /// List all descendants of the given organizations
    Children {
        /// Organization ids
        ids: Vec<OrgId>,
    },
    /// List the given organizations each followed by its descendants
    HereBelow {
        /// Organization ids
        ids: Vec<OrgId>,
    },
    /// Show the top-level parent of an organization
    TopParent {
        /// Organization id
        id: OrgId,
    },
    /// Show the distinct top-level parents of several organizations
    UserTopParents {
        /// Organization ids
        ids: Vec<OrgId>,
    },
    /// Print the raw directory record of an organization
    Find {
        /// Organization id
        id: OrgId,
    },
    /// Show what the form hides when only the given leaf organizations are allowed
    Filter {
        /// Allowed leaf organization ids
        ids: Vec<OrgId>,
    },
    /// Print the communication languages implied by an organization selection
    Communication {
        /// Selected organization ids
        ids: Vec<OrgId>,
        /// Locale used when no selected organization names a language
        #[arg(long)]
        default_locale: Option<String>,
    },
    /// Show the practice region of an organization
    Region {
        /// Organization id
        id: OrgId,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'orgs --help' for commands");
        return Ok(());
    };

    let bundle_path = cli
        .bundle
        .unwrap_or_else(|| org_bundle_path_from_env_value(std::env::var(ORG_BUNDLE_PATH_ENV).ok()));
    let directory = FileDirectory::new(bundle_path);
    let bundle = directory.fetch()?;
    if bundle.skipped > 0 {
        eprintln!("Skipped {} unusable directory entries", bundle.skipped);
    }
    let hierarchy = OrgHierarchy::from_records(&bundle.records);

    match command {
        Commands::TopLevel => {
            for id in hierarchy.top_level_orgs() {
                println!("{}", describe(&hierarchy, id));
            }
        }
        Commands::Tree => {
            for id in hierarchy.forest_roots() {
                print_tree(&hierarchy, id, 0)?;
            }
        }
        Commands::Children { ids } => {
            print_ids(&hierarchy, &hierarchy.child_orgs(&ids)?);
        }
        Commands::HereBelow { ids } => {
            print_ids(&hierarchy, &hierarchy.here_below_orgs(&ids)?);
        }
        Commands::TopParent { id } => match hierarchy.top_level_parent_org(id)? {
            Some(top) => println!("{}", describe(&hierarchy, top)),
            None => eprintln!("Unknown organization: {id}"),
        },
        Commands::UserTopParents { ids } => {
            print_ids(&hierarchy, &hierarchy.user_top_level_parent_orgs(&ids)?);
        }
        Commands::Find { id } => match OrgHierarchy::find_org(&bundle.records, id) {
            Some(record) => println!(
                "{}",
                Organization::render_bundle(std::slice::from_ref(record), BundleFormat::Json)?
            ),
            None => eprintln!("Organization {id} not found in directory"),
        },
        Commands::Filter { ids } => match hierarchy.filter_orgs(&ids)? {
            None => println!("No filtering applies."),
            Some(visibility) => {
                println!("Hidden checkboxes: {}", join(visibility.hidden_checkboxes.iter()));
                println!("Hidden labels: {}", join(visibility.hidden_labels.iter()));
                println!("Hidden groups: {}", join(visibility.hidden_groups.iter()));
            }
        },
        Commands::Communication {
            ids,
            default_locale,
        } => {
            let default_locale = default_locale_from_env_value(default_locale);
            let entries = hierarchy.communication_for_orgs(&ids, default_locale.as_ref());
            println!("{}", Communication::render(&entries)?);
        }
        Commands::Region { id } => match hierarchy.region_of(id) {
            Some(region) => println!("{region}"),
            None => eprintln!("No practice region recorded for organization {id}"),
        },
    }

    Ok(())
}

fn describe(hierarchy: &OrgHierarchy, id: OrgId) -> String {
    match hierarchy.get(id) {
        Some(node) if node.is_placeholder() => format!("{id}: {} (placeholder)", node.name()),
        Some(node) => format!("{id}: {}", node.name()),
        None => format!("{id}: <unknown>"),
    }
}

fn print_ids(hierarchy: &OrgHierarchy, ids: &[OrgId]) {
    if ids.is_empty() {
        println!("No organizations found.");
    }
    for id in ids {
        println!("{}", describe(hierarchy, *id));
    }
}

fn print_tree(
    hierarchy: &OrgHierarchy,
    id: OrgId,
    depth: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    // Walks child links directly, so guard against cycles first.
    if depth == 0 {
        hierarchy.child_orgs(&[id])?;
    }
    println!("{}{}", "  ".repeat(depth), describe(hierarchy, id));
    if let Some(node) = hierarchy.get(id) {
        for child in node.children() {
            print_tree(hierarchy, *child, depth + 1)?;
        }
    }
    Ok(())
}

fn join<'a>(ids: impl Iterator<Item = &'a OrgId>) -> String {
    let ids: Vec<String> = ids.map(OrgId::to_string).collect();
    if ids.is_empty() {
        "-".to_string()
    } else {
        ids.join(", ")
    }
}
