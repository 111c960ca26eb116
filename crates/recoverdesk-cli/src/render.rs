//! Plain-text output for terminal use.

use std::fmt::Write;

use recoverdesk_store::agents::AgentPerformance;
use recoverdesk_store::dashboard::{AgentSummary, PortfolioSummary};
use recoverdesk_store::{Agent, Case, LogEntry};

pub fn case_table(cases: &[Case]) -> String {
    let mut out = format!(
        "{:<9} {:<16} {:>10} {:<10} {:<16} {}\n",
        "ID", "CUSTOMER", "AMOUNT", "STATUS", "AGENT", "CREATED"
    );
    for c in cases {
        let _ = writeln!(
            out,
            "{:<9} {:<16} {:>10.2} {:<10} {:<16} {}",
            c.id,
            c.customer,
            c.amount,
            c.status,
            c.agent_name,
            c.created_at.format("%Y-%m-%d")
        );
    }
    let _ = write!(out, "{} case(s)", cases.len());
    out
}

pub fn case_detail(case: &Case) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  {}", case.id, case.customer);
    let _ = writeln!(out, "  phone:   {}", case.phone);
    let _ = writeln!(out, "  amount:  {:.2}", case.amount);
    let _ = writeln!(out, "  status:  {}", case.status);
    let _ = writeln!(out, "  agent:   {}", case.agent_name);
    let _ = writeln!(out, "  created: {}", case.created_at.format("%Y-%m-%d %H:%M"));

    let _ = writeln!(out, "\nPayments");
    for p in &case.payment_history {
        let _ = writeln!(
            out,
            "  {}  {:>10.2}  {:<9} {}",
            p.date, p.amount, p.status, p.method
        );
    }

    let _ = write!(out, "\nTimeline");
    for h in &case.history {
        let _ = write!(out, "\n  {}  {:<15} {}", h.date, h.stage, h.note);
    }
    out
}

pub fn agent_table(agents: &[Agent]) -> String {
    let mut out = format!(
        "{:<4} {:<18} {:<24} {:>5} {:>9}\n",
        "ID", "NAME", "EMAIL", "CASES", "RECOVERY"
    );
    for a in agents {
        let _ = writeln!(
            out,
            "{:<4} {:<18} {:<24} {:>5} {:>8.1}%",
            a.id, a.name, a.email, a.cases, a.recovery
        );
    }
    let _ = write!(out, "{} agent(s)", agents.len());
    out
}

pub fn performance_line(perf: &AgentPerformance) -> String {
    format!(
        "{:<18} {:>3} cases  {:>5.1}% recovered  {:.2} cases/day",
        perf.name, perf.total_cases, perf.recovery_rate, perf.avg_cases_per_day
    )
}

pub fn log_table(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for e in entries {
        let _ = writeln!(
            out,
            "{}  {:<12} {:<6} {:<10} {:<6} {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.user,
            e.role,
            e.action,
            e.entity,
            e.details
        );
    }
    let _ = write!(out, "{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
    out
}

pub fn portfolio(summary: &PortfolioSummary) -> String {
    let s = &summary.by_status;
    format!(
        "Total cases:      {}\n\
         Resolved/closed:  {}\n\
         Unassigned:       {}\n\
         Pending amount:   {:.2}\n\
         Efficiency:       {:.1}%\n\
         By status:        assigned {} / follow-up {} / resolved {} / closed {}",
        summary.total_cases,
        summary.resolved_cases,
        summary.unassigned_cases,
        summary.pending_amount,
        summary.efficiency,
        s.assigned,
        s.follow_up,
        s.resolved,
        s.closed
    )
}

pub fn agent_dashboard(summary: &AgentSummary) -> String {
    format!(
        "My cases:   {}\n\
         Resolved:   {}\n\
         Pending:    {}\n\
         Follow-up:  {}\n\n\
         {}",
        summary.total_cases,
        summary.resolved_cases,
        summary.pending_cases,
        summary.follow_up_cases,
        case_table(&summary.recent_cases)
    )
}
