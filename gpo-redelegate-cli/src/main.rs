//! Command-line front end for shifting GPO security delegations.
//!
//! The binary wires the remediation service to the GroupPolicy tooling on
//! the host, gates mutation behind an interactive confirmation of the
//! filtered target list, and reports a per-run summary. All human-readable
//! output goes to stderr.

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use gpo_redelegate_remediation::{
    GpoFilter, PermissionLevel, RemediationOutcome, RemediationPlan, RemediationRequest,
    RemediationService, TrusteeSpec, TrusteeType,
};
use log::debug;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "gpo-redelegate",
    version,
    about = "Grants one trustee a delegation level and revokes another trustee's access \
             across every GPO where the trustee to remove currently holds a delegation."
)]
struct Cli {
    /// Trustee that receives the new delegation
    #[arg(long)]
    trustee_to_add: String,

    /// Principal type of the trustee to add: User, Group or Computer
    #[arg(long, value_parser = parse_trustee_type)]
    trustee_to_add_type: TrusteeType,

    /// Delegation level granted to the added trustee:
    /// GpoEditDeleteModifySecurity, None, GpoEdit, GpoApply or GpoRead
    #[arg(long, value_parser = parse_permission_level)]
    permission_level: PermissionLevel,

    /// Trustee whose delegation is withdrawn
    #[arg(long)]
    trustee_to_remove: String,

    /// Principal type of the trustee to remove: User, Group or Computer
    #[arg(long, value_parser = parse_trustee_type)]
    trustee_to_remove_type: TrusteeType,

    /// Only evaluate GPOs whose display name starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Only evaluate GPOs whose display name contains this fragment
    #[arg(long)]
    substring: Option<String>,

    /// Report what would change without touching any GPO
    #[arg(long)]
    dry_run: bool,

    /// Skip the interactive confirmation of the target list
    #[arg(long)]
    skip_verification: bool,
}

fn parse_trustee_type(s: &str) -> Result<TrusteeType, String> {
    s.parse()
}

fn parse_permission_level(s: &str) -> Result<PermissionLevel, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let filter = GpoFilter::new(cli.prefix.clone(), cli.substring.clone());
    let request = RemediationRequest::new(
        TrusteeSpec::grant(
            cli.trustee_to_add.clone(),
            cli.trustee_to_add_type,
            cli.permission_level,
        ),
        TrusteeSpec::revoke(cli.trustee_to_remove.clone(), cli.trustee_to_remove_type),
        cli.dry_run,
    );
    debug!(
        "shifting delegations from {} to {} (dry run: {})",
        request.revoke.name, request.grant.name, request.dry_run
    );

    let service = RemediationService::connect();
    let plan = service
        .plan(&filter)
        .await
        .context("survey of the domain's policy objects failed")?;

    if plan.targets.is_empty() {
        eprintln!("No GPOs match the requested filters; nothing to do.");
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.skip_verification && !confirm(&plan)? {
        eprintln!("Aborted; no changes were made.");
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = service.apply(&plan, &request).await;
    print_outcome(&outcome);

    if outcome.has_failures() {
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Show the target set and wait for the operator's exact `Y`.
fn confirm(plan: &RemediationPlan) -> anyhow::Result<bool> {
    if plan.filtered {
        eprintln!(
            "The following {} GPO(s) will be evaluated:",
            plan.targets.len()
        );
        for gpo in &plan.targets {
            eprintln!("  {}", gpo.display_name);
        }
    } else {
        eprintln!(
            "{} ({} GPOs)",
            "No prefix or substring filter was given; every GPO in the domain will be evaluated."
                .yellow(),
            plan.targets.len()
        );
    }

    if !atty::is(atty::Stream::Stdin) {
        eprintln!(
            "Confirmation requires an interactive terminal; re-run with --skip-verification to proceed without one."
        );
        return Ok(false);
    }

    eprint!("Proceed? Enter Y to continue: ");
    io::stderr().flush().ok();

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(is_confirmation(&answer))
}

/// Exact, case-sensitive `Y`; only the line terminator is stripped.
fn is_confirmation(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']) == "Y"
}

fn print_outcome(outcome: &RemediationOutcome) {
    let mode = if outcome.dry_run { " (dry run)" } else { "" };
    eprintln!();
    eprintln!("{}{mode}", "Remediation summary".bold());
    eprintln!("  GPOs examined:       {}", outcome.examined);
    eprintln!("  Without delegation:  {}", outcome.skipped);
    eprintln!("  Delegations granted: {}", outcome.granted.len());
    eprintln!("  Delegations revoked: {}", outcome.revoked.len());
    eprintln!("  Mutations issued:    {}", outcome.mutations_issued);

    for name in &outcome.revoked {
        eprintln!("  {} {name}", "remediated".green());
    }
    for warning in &outcome.warnings {
        eprintln!("  {} {warning}", "warning".yellow());
    }
    for error in &outcome.errors {
        eprintln!("  {} {error}", "failed".red());
    }
    if outcome.has_failures() {
        eprintln!(
            "{}",
            "Some objects were not remediated; investigate and re-run.".red()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_requires_exact_y() {
        assert!(is_confirmation("Y"));
        assert!(is_confirmation("Y\n"));
        assert!(is_confirmation("Y\r\n"));

        assert!(!is_confirmation("y"));
        assert!(!is_confirmation("yes"));
        assert!(!is_confirmation("Yes"));
        assert!(!is_confirmation(" Y"));
        assert!(!is_confirmation("Y "));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("\n"));
    }

    #[test]
    fn test_cli_parses_full_argument_surface() {
        let cli = Cli::parse_from([
            "gpo-redelegate",
            "--trustee-to-add",
            "NewAdmins",
            "--trustee-to-add-type",
            "Group",
            "--permission-level",
            "GpoEditDeleteModifySecurity",
            "--trustee-to-remove",
            "OldAdmins",
            "--trustee-to-remove-type",
            "User",
            "--prefix",
            "Finance",
            "--substring",
            "2024",
            "--dry-run",
            "--skip-verification",
        ]);

        assert_eq!(cli.trustee_to_add, "NewAdmins");
        assert_eq!(cli.trustee_to_add_type, TrusteeType::Group);
        assert_eq!(
            cli.permission_level,
            PermissionLevel::GpoEditDeleteModifySecurity
        );
        assert_eq!(cli.trustee_to_remove, "OldAdmins");
        assert_eq!(cli.trustee_to_remove_type, TrusteeType::User);
        assert_eq!(cli.prefix.as_deref(), Some("Finance"));
        assert_eq!(cli.substring.as_deref(), Some("2024"));
        assert!(cli.dry_run);
        assert!(cli.skip_verification);
    }

    #[test]
    fn test_cli_rejects_unknown_enum_values() {
        let result = Cli::try_parse_from([
            "gpo-redelegate",
            "--trustee-to-add",
            "NewAdmins",
            "--trustee-to-add-type",
            "Printer",
            "--permission-level",
            "GpoEdit",
            "--trustee-to-remove",
            "OldAdmins",
            "--trustee-to-remove-type",
            "User",
        ]);
        assert!(result.is_err());
    }
}
