//! jira-relay - Rate-limited JIRA adapter
//!
//! One-shot CLI over the tool surface. Results print as JSON on stdout;
//! errors go to stderr with a non-zero exit.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process;

use jira_relay::jira::types::{CreateIssueFields, UpdateIssueFields};
use jira_relay::{logging, RelayConfig, RelayTools};

/// jira-relay - JIRA issue operations with teams, aliases, and pacing
#[derive(Parser, Debug)]
#[command(name = "jira-relay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: ~/.config/jira-relay/config.yaml,
    /// falling back to JIRA_* environment variables)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search issues with a raw JQL query
    Search {
        /// JQL query string
        jql: String,

        /// Maximum number of results
        #[arg(short, long)]
        max_results: Option<u32>,
    },

    /// Search issues assigned to any member of a team
    SearchTeam {
        /// Registered team name
        team: String,

        /// Restrict to a project key
        #[arg(short, long)]
        project: Option<String>,

        /// Restrict to a status
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        max_results: Option<u32>,
    },

    /// Show a single issue
    Get {
        /// Issue key (e.g., PROJ-123)
        key: String,
    },

    /// Create an issue
    Create {
        /// Project key
        project: String,

        /// Issue summary
        summary: String,

        /// Issue description
        #[arg(default_value = "")]
        description: String,

        /// Issue type
        #[arg(short = 't', long, default_value = "Task")]
        issue_type: String,

        /// Priority name
        #[arg(long)]
        priority: Option<String>,

        /// Assignee identifier
        #[arg(long)]
        assignee: Option<String>,

        /// Labels (repeatable)
        #[arg(long)]
        label: Vec<String>,

        /// Components, aliases allowed (repeatable)
        #[arg(long)]
        component: Vec<String>,

        /// Team to add as watchers on the new issue
        #[arg(long)]
        team: Option<String>,
    },

    /// Update issue fields
    Update {
        /// Issue key
        key: String,

        #[arg(long)]
        summary: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        assignee: Option<String>,

        /// Labels (repeatable, replaces existing)
        #[arg(long)]
        label: Vec<String>,

        /// Components, aliases allowed (repeatable, replaces existing)
        #[arg(long)]
        component: Vec<String>,
    },

    /// Transition an issue by transition name
    Transition {
        /// Issue key
        key: String,

        /// Transition name (e.g., "In Progress")
        name: String,
    },

    /// Add a comment to an issue
    Comment {
        /// Issue key
        key: String,

        /// Comment body
        body: String,

        /// Restrict visibility to a security level group
        #[arg(long)]
        security_level: Option<String>,
    },

    /// Link two issues
    Link {
        /// Link type name (e.g., "Blocks")
        link_type: String,

        /// Inward issue key
        inward: String,

        /// Outward issue key
        outward: String,

        /// Optional comment on the link
        #[arg(long)]
        comment: Option<String>,
    },

    /// List available issue link types
    LinkTypes,

    /// Log work on an issue
    LogTime {
        /// Issue key
        key: String,

        /// Time spent in JIRA format (e.g., "1h 30m")
        time_spent: String,

        /// Comment describing the work
        comment: String,

        /// Start timestamp (defaults to now)
        #[arg(long)]
        started: Option<String>,
    },

    /// List projects
    Projects,

    /// List the components of a project
    Components {
        /// Project key
        project: String,
    },

    /// List registered teams
    Teams,

    /// Register or replace a team
    AddTeam {
        /// Team name
        name: String,

        /// Member identifiers (at least one)
        #[arg(required = true)]
        members: Vec<String>,
    },

    /// Remove a team
    RemoveTeam {
        /// Team name
        name: String,
    },

    /// Add every member of a team as watchers on an issue
    AssignTeam {
        /// Issue key
        key: String,

        /// Team name
        team: String,
    },

    /// List the watchers of an issue
    Watchers {
        /// Issue key
        key: String,
    },

    /// Add a single watcher to an issue
    AddWatcher {
        /// Issue key
        key: String,

        /// Member identifier
        member: String,
    },

    /// Remove a single watcher from an issue
    RemoveWatcher {
        /// Issue key
        key: String,

        /// Member identifier
        member: String,
    },

    /// List component aliases
    Aliases,

    /// Add or replace a component alias
    AddAlias {
        /// Alias key
        alias: String,

        /// Canonical component name
        component: String,
    },

    /// Remove a component alias
    RemoveAlias {
        /// Alias key
        alias: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.config {
        Some(path) => RelayConfig::load(std::path::Path::new(&path))?,
        None => {
            let default = RelayConfig::default_path();
            if default.exists() {
                RelayConfig::load(&default)?
            } else {
                RelayConfig::from_env()
            }
        }
    };
    config.validate()?;

    let tools = RelayTools::new(&config)?;

    match cli.command {
        Commands::Search { jql, max_results } => {
            let issues = tools.search_issues(&jql, max_results).await?;
            print_json(&issues)
        }
        Commands::SearchTeam {
            team,
            project,
            status,
            max_results,
        } => {
            let issues = tools
                .search_issues_by_team(&team, project.as_deref(), status.as_deref(), max_results)
                .await?;
            print_json(&issues)
        }
        Commands::Get { key } => print_json(&tools.get_issue(&key).await?),
        Commands::Create {
            project,
            summary,
            description,
            issue_type,
            priority,
            assignee,
            label,
            component,
            team,
        } => {
            let fields = CreateIssueFields {
                project_key: project,
                summary,
                description,
                issue_type,
                priority,
                assignee,
                labels: label,
                components: component,
                ..Default::default()
            };
            print_json(&tools.create_issue(fields, team.as_deref()).await?)
        }
        Commands::Update {
            key,
            summary,
            description,
            priority,
            assignee,
            label,
            component,
        } => {
            let fields = UpdateIssueFields {
                summary,
                description,
                priority,
                assignee,
                labels: label,
                components: component,
                ..Default::default()
            };
            print_json(&tools.update_issue(&key, fields).await?)
        }
        Commands::Transition { key, name } => {
            print_json(&tools.transition_issue(&key, &name).await?)
        }
        Commands::Comment {
            key,
            body,
            security_level,
        } => print_json(&tools.add_comment(&key, &body, security_level.as_deref()).await?),
        Commands::Link {
            link_type,
            inward,
            outward,
            comment,
        } => {
            tools
                .link_issue(&link_type, &inward, &outward, comment.as_deref())
                .await?;
            println!("Linked {} -> {}", inward, outward);
            Ok(())
        }
        Commands::LinkTypes => print_json(&tools.get_link_types().await?),
        Commands::LogTime {
            key,
            time_spent,
            comment,
            started,
        } => {
            print_json(
                &tools
                    .log_time(&key, &time_spent, &comment, started.as_deref())
                    .await?,
            )
        }
        Commands::Projects => print_json(&tools.get_projects().await?),
        Commands::Components { project } => {
            print_json(&tools.get_project_components(&project).await?)
        }
        Commands::Teams => print_json(&tools.list_teams().await),
        Commands::AddTeam { name, members } => {
            tools.add_team(&name, members).await?;
            println!("Registered team '{}'", name);
            Ok(())
        }
        Commands::RemoveTeam { name } => {
            tools.remove_team(&name).await?;
            println!("Removed team '{}'", name);
            Ok(())
        }
        Commands::AssignTeam { key, team } => {
            print_json(&tools.assign_team_to_issue(&key, &team).await?)
        }
        Commands::Watchers { key } => print_json(&tools.get_issue_watchers(&key).await?),
        Commands::AddWatcher { key, member } => {
            tools.add_watcher_to_issue(&key, &member).await?;
            println!("Added watcher {} to {}", member, key);
            Ok(())
        }
        Commands::RemoveWatcher { key, member } => {
            tools.remove_watcher_from_issue(&key, &member).await?;
            println!("Removed watcher {} from {}", member, key);
            Ok(())
        }
        Commands::Aliases => print_json(&tools.list_component_aliases().await),
        Commands::AddAlias { alias, component } => {
            tools.add_component_alias(&alias, &component).await?;
            println!("Registered alias '{}' -> '{}'", alias, component);
            Ok(())
        }
        Commands::RemoveAlias { alias } => {
            tools.remove_component_alias(&alias).await?;
            println!("Removed alias '{}'", alias);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = logging::init() {
        eprintln!("warning: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
