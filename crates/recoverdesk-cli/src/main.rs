//! # recoverdesk
//!
//! Operator command line for the Recoverdesk collections back office.
//!
//! Each invocation signs in (or restores the stored session), builds the
//! demonstration case book, runs one command through the [`Desk`] and exits.
//! Only the activity log and the session survive between runs.

mod cli;
mod config;
mod render;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use recoverdesk_shared::constants::{APP_NAME, DEFAULT_RECENT_LOGS, DEFAULT_TOP_PERFORMERS};
use recoverdesk_shared::{AgentId, LogAction};
use recoverdesk_store::{
    ActivityLog, AgentUpdate, Desk, EntityStore, KeyValueStore, MemoryKv, Session, SqliteKv,
};

use crate::cli::{Cli, Commands};
use crate::config::DeskConfig;

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so command output stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,recoverdesk_store=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = DeskConfig::from_env();
    debug!(?config, "Loaded configuration");
    info!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let kv = open_kv(&config)?;
    let session = Session::restore(kv.clone());

    if let Commands::Logout = cli.command {
        session.logout()?;
        println!("Signed out");
        return Ok(());
    }

    let user = match (cli.email.as_deref(), cli.password.as_deref()) {
        (Some(email), Some(password)) => session.login(email, password)?,
        _ => session
            .current_user()
            .context("not signed in; pass --email and --password")?,
    };

    if let Commands::Whoami = cli.command {
        println!("{} <{}> {}", user.name, user.email, user.role);
        match session.token()? {
            Some(token) => println!("token: {token}"),
            None => println!("token: none"),
        }
        return Ok(());
    }

    let store = Arc::new(EntityStore::from_mock(&config.mock));
    let log = Arc::new(ActivityLog::open(kv));
    let desk = Desk::new(store, log, user);

    run(&desk, cli.command)
}

fn open_kv(config: &DeskConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    if config.in_memory {
        return Ok(Arc::new(MemoryKv::new()));
    }
    let kv = match &config.db_path {
        Some(path) => SqliteKv::open_at(path)
            .with_context(|| format!("opening {}", path.display()))?,
        None => SqliteKv::open_default().context("opening default database")?,
    };
    Ok(Arc::new(kv))
}

fn run(desk: &Desk, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Cases {
            status,
            search,
            sort,
        } => {
            let cases = desk.cases().browse(status, &search, sort);
            println!("{}", render::case_table(&cases));
        }

        Commands::Case { id } => {
            let case = desk.cases().get_case(&id)?;
            println!("{}", render::case_detail(&case));
        }

        Commands::Agents { search } => {
            let agents = match search {
                Some(query) => desk.agents().search_agents(&query),
                None => desk.agents().list_agents(),
            };
            println!("{}", render::agent_table(&agents));
        }

        Commands::Top { limit } => {
            let agents = desk.agents();
            for agent in agents.top_performers(limit) {
                println!("{}", render::performance_line(&agents.performance(agent.id)?));
            }
        }

        Commands::Assign { case, agent } => {
            let case = desk.assign_case(&case, agent)?;
            println!("{} assigned to {}", case.id, case.agent_name);
        }

        Commands::Unassign { case } => {
            let case = desk.unassign_case(&case)?;
            println!("{} is now {}", case.id, case.agent_name);
        }

        Commands::Status { case, status, note } => {
            let case = desk.change_case_status(&case, status, &note)?;
            println!("{} is now {}", case.id, case.status);
        }

        Commands::Call { case } => {
            let case = desk.call_customer(&case)?;
            println!("Calling {} on {}", case.customer, case.phone);
        }

        Commands::AddAgent { name, email } => {
            let agent = desk.add_agent(&name, &email)?;
            println!("Added agent {} ({})", agent.id, agent.name);
        }

        Commands::EditAgent { id, name, email } => {
            if name.is_none() && email.is_none() {
                bail!("nothing to change; pass --name and/or --email");
            }
            let agent = desk.edit_agent(
                id,
                AgentUpdate {
                    name,
                    email,
                    recovery: None,
                },
            )?;
            println!("Updated agent {}: {} ({})", agent.id, agent.name, agent.email);
        }

        Commands::DeleteAgent { id } => {
            let agent = desk.remove_agent(id)?;
            println!("Deleted agent {}", agent.name);
        }

        Commands::Logs {
            entity,
            user,
            action,
            search,
            limit,
        } => {
            let mut entries = desk
                .activity()
                .search(search.as_deref().unwrap_or(""), entity);
            if let Some(user) = user {
                entries.retain(|e| e.user == user);
            }
            if let Some(action) = action {
                let action = LogAction::from(action);
                entries.retain(|e| e.action == action);
            }
            entries.truncate(limit);
            println!("{}", render::log_table(&entries));
        }

        Commands::ClearLogs => {
            desk.clear_activity();
            println!("Activity log cleared");
        }

        Commands::Dashboard { agent } => dashboard(desk, agent)?,

        // Handled before the desk is opened.
        Commands::Whoami | Commands::Logout => {}
    }
    Ok(())
}

fn dashboard(desk: &Desk, agent: Option<AgentId>) -> anyhow::Result<()> {
    let agent_id = match agent {
        Some(id) => Some(desk.agents().get_agent(id)?.id),
        None if desk.actor().is_admin() => None,
        None => {
            let email = &desk.actor().email;
            let mine = desk.agents().search_agents(email);
            match mine.into_iter().find(|a| &a.email == email) {
                Some(a) => Some(a.id),
                None => bail!("no roster entry for {email}; pass --agent <id>"),
            }
        }
    };

    match agent_id {
        Some(id) => println!("{}", render::agent_dashboard(&desk.cases().agent_summary(id))),
        None => {
            println!("{}\n", render::portfolio(&desk.cases().portfolio_summary()));
            println!("Top performers");
            let agents = desk.agents();
            for a in agents.top_performers(DEFAULT_TOP_PERFORMERS) {
                println!("  {}", render::performance_line(&agents.performance(a.id)?));
            }
            println!("\nRecent activity");
            println!("{}", render::log_table(&desk.activity().recent(DEFAULT_RECENT_LOGS)));
        }
    }
    Ok(())
}
