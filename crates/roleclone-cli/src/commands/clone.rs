//! Clone command - copies a role and its policy associations.

use anyhow::{Context, Result};
use roleclone::{AttachmentReport, ClonePlan, CloneReport, IdentityService, RoleCloner, Tag};
use roleclone_aws::{AwsIamService, AwsSettings};
use roleclone_config::{ConfigLoader, OutputFormat, RoleCloneConfig};
use serde::Serialize;
use tracing::debug;

use crate::style::colors::SemanticStyle;
use crate::style::{
    self, PolicyRow, Status, hint_line, info_table, policy_table, success_line, warn_line,
    with_spinner,
};

/// Options gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    pub source: String,
    pub target: String,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub page_size: Option<u32>,
    pub format: Option<OutputFormat>,
    pub dry_run: bool,
    pub project_dir: String,
}

/// What a clone invocation produced.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// `--dry-run`: the source was read, nothing was written.
    Planned(ClonePlan),
    /// The target role exists; some policies may have failed.
    Cloned(CloneReport),
}

/// Flags take precedence over every configuration source.
pub fn settings(options: &CloneOptions, config: &RoleCloneConfig) -> AwsSettings {
    AwsSettings {
        region: options.region.clone().or_else(|| config.aws.region.clone()),
        profile: options.profile.clone().or_else(|| config.aws.profile.clone()),
        endpoint_url: options
            .endpoint_url
            .clone()
            .or_else(|| config.aws.endpoint_url.clone()),
        page_size: options.page_size.or(config.clone.page_size),
    }
}

pub fn run(options: &CloneOptions) -> Result<()> {
    let config = ConfigLoader::new()
        .with_project_dir(&options.project_dir)
        .load()
        .context("Failed to load configuration")?;

    if !config.output.color {
        style::set_no_color(true);
    }
    let format = options.format.unwrap_or(config.output.format);

    let settings = settings(options, &config);
    debug!(?settings, "Resolved AWS settings");

    let service = AwsIamService::connect(&settings).context("Failed to set up IAM client")?;

    let outcome = clone_role(&RoleCloner::new(&service), options)?;
    println!("{}", render(&outcome, format)?);
    Ok(())
}

/// Plans the clone and, unless `dry_run` is set, applies it.
///
/// Policy replication failures are part of a successful outcome; only
/// failures to read the source or create the target are errors.
pub fn clone_role<S: IdentityService>(
    cloner: &RoleCloner<S>,
    options: &CloneOptions,
) -> Result<Outcome> {
    let plan = with_spinner(&format!("Reading role {}...", options.source), || {
        cloner.plan(&options.source, &options.target)
    })
    .with_context(|| format!("Failed to read role {}", options.source))?;

    if options.dry_run {
        return Ok(Outcome::Planned(plan));
    }

    let report = with_spinner(&format!("Creating role {}...", options.target), || {
        cloner.execute(&plan)
    })
    .with_context(|| format!("Failed to create role {}", options.target))?;

    Ok(Outcome::Cloned(report))
}

/// Renders an outcome for stdout.
pub fn render(outcome: &Outcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => Ok(match outcome {
            Outcome::Planned(plan) => plan_text(plan),
            Outcome::Cloned(report) => report_text(report),
        }),
    }
}

fn format_tags(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    tags.iter()
        .map(|t| format!("{}={}", t.key, t.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn plan_text(plan: &ClonePlan) -> String {
    let request = &plan.request;
    let mut lines = vec![
        format!(
            "Plan: clone {} as {}",
            plan.source.role_name.name(),
            request.role_name.name()
        ),
        String::new(),
    ];

    let entries = [
        ("Source ARN", plan.source.arn.clone()),
        ("Path", request.path.clone()),
        (
            "Description",
            request.description.clone().unwrap_or_else(|| "-".into()),
        ),
        (
            "Max session",
            request
                .max_session_duration
                .map_or_else(|| "-".into(), |s| format!("{s}s")),
        ),
        (
            "Permissions boundary",
            request
                .permissions_boundary
                .clone()
                .unwrap_or_else(|| "-".into()),
        ),
        ("Tags", format_tags(&request.tags)),
        ("Trust policy", request.assume_role_policy_document.clone()),
    ];
    lines.push(info_table(&entries).to_string());

    if plan.inventory.is_empty() {
        lines.push(hint_line("Source role has no inline or managed policies."));
    } else {
        let rows: Vec<PolicyRow<'_>> = plan
            .inventory
            .inline
            .iter()
            .map(|p| PolicyRow {
                kind: "inline",
                policy: &p.name,
                status: Status::Planned,
                detail: "",
            })
            .chain(plan.inventory.managed.iter().map(|p| PolicyRow {
                kind: "managed",
                policy: p.label(),
                status: Status::Planned,
                detail: &p.arn,
            }))
            .collect();
        lines.push(policy_table(&rows).to_string());
    }

    lines.push(String::new());
    lines.push(hint_line("Dry run: nothing was created. Re-run without --dry-run to apply."));
    lines.join("\n")
}

fn report_rows<'a>(kind: &'a str, report: &'a AttachmentReport) -> Vec<PolicyRow<'a>> {
    report
        .applied
        .iter()
        .map(|policy| PolicyRow {
            kind,
            policy,
            status: Status::Applied,
            detail: "",
        })
        .chain(report.failed.iter().map(|failure| PolicyRow {
            kind,
            policy: &failure.policy,
            status: Status::Failed,
            detail: &failure.reason,
        }))
        .collect()
}

fn report_text(report: &CloneReport) -> String {
    let mut lines = vec![success_line(&format!(
        "Created role {} ({})",
        report.target, report.target_arn
    ))];

    let mut rows = report_rows("inline", &report.inline);
    rows.extend(report_rows("managed", &report.managed));
    if !rows.is_empty() {
        lines.push(policy_table(&rows).to_string());
    }

    if report.is_complete() {
        lines.push(success_line(&format!(
            "Cloned {} as {} ({} inline, {} managed)",
            report.source,
            report.target,
            report.inline.applied.len(),
            report.managed.applied.len()
        )));
    } else {
        lines.push(warn_line(&format!(
            "Cloned {} as {} with {} policy failure(s); fix them manually",
            report.source,
            report.target,
            report.failure_count()
        )));
    }
    lines.join("\n")
}
