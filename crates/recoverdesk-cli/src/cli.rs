//! Command-line argument parsing.

use clap::{Parser, Subcommand};

use recoverdesk_shared::{AgentId, CaseId, CaseStatus, LogEntity};
use recoverdesk_store::CaseSort;

/// Recoverdesk collections back office
#[derive(Parser)]
#[command(name = "recoverdesk")]
#[command(about = "Loan-collection case desk for agents and administrators", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Sign in with this email (demo accounts only)
    #[arg(long, global = true, requires = "password")]
    pub email: Option<String>,

    /// Password for --email
    #[arg(long, global = true, requires = "email")]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List cases
    Cases {
        /// Only cases in this status (assigned, follow-up, resolved, closed)
        #[arg(long)]
        status: Option<CaseStatus>,

        /// Match customer name or case id
        #[arg(long, default_value = "")]
        search: String,

        /// newest, amount or customer
        #[arg(long, default_value = "newest")]
        sort: CaseSort,
    },

    /// Show one case with its payments and timeline
    Case { id: CaseId },

    /// List agents
    Agents {
        #[arg(long)]
        search: Option<String>,
    },

    /// Agents ranked by recovery rate
    Top {
        #[arg(long, default_value_t = recoverdesk_shared::constants::DEFAULT_TOP_PERFORMERS)]
        limit: usize,
    },

    /// Assign a case to an agent
    Assign { case: CaseId, agent: AgentId },

    /// Take a case off its agent
    Unassign { case: CaseId },

    /// Move a case to a new status
    Status {
        case: CaseId,
        status: CaseStatus,
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Record a call to the case's customer
    Call { case: CaseId },

    /// Add an agent to the roster
    AddAgent { name: String, email: String },

    /// Change an agent's name or email
    EditAgent {
        id: AgentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Remove an agent; their cases become unassigned
    DeleteAgent { id: AgentId },

    /// Show the activity log
    Logs {
        #[arg(long)]
        entity: Option<LogEntity>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        action: Option<String>,
        /// Match details or user
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = recoverdesk_shared::constants::DEFAULT_RECENT_LOGS)]
        limit: usize,
    },

    /// Empty the activity log
    ClearLogs,

    /// Portfolio overview, or one agent's caseload
    Dashboard {
        /// Show this agent's caseload instead of the portfolio
        #[arg(long)]
        agent: Option<AgentId>,
    },

    /// Show the signed-in user and session token
    Whoami,

    /// Sign out and wipe stored state
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_status_change() {
        let cli = Cli::try_parse_from([
            "recoverdesk",
            "--email",
            "agent@demo.com",
            "--password",
            "agent",
            "status",
            "LN-1003",
            "follow-up",
            "--note",
            "promised Friday",
        ])
        .unwrap();

        assert_eq!(cli.email.as_deref(), Some("agent@demo.com"));
        match cli.command {
            Commands::Status { case, status, note } => {
                assert_eq!(case.as_str(), "LN-1003");
                assert_eq!(status, CaseStatus::FollowUp);
                assert_eq!(note, "promised Friday");
            }
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn parses_whoami() {
        let cli = Cli::try_parse_from(["recoverdesk", "whoami"]).unwrap();
        assert!(matches!(cli.command, Commands::Whoami));
        assert!(cli.email.is_none());
    }

    #[test]
    fn email_requires_password() {
        assert!(Cli::try_parse_from(["recoverdesk", "--email", "a@b.c", "cases"]).is_err());
    }

    #[test]
    fn rejects_unknown_sort() {
        assert!(Cli::try_parse_from(["recoverdesk", "cases", "--sort", "priority"]).is_err());
    }
}
