//! Subcommand flows. Each one drives [`TriggerActions`] the way the trigger
//! screen would and turns a raised alert into an error.

use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use dispatch::{Workflow, WorkflowApi, WorkflowId};
use trigger::TriggerActions;

/// Values collected from `trigger` flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerArgs {
    pub workflow: String,
    pub git_ref: String,
    pub inputs: Vec<(String, String)>,
    pub enable: Vec<String>,
}

/// Parses a `NAME=VALUE` pair. The value may be empty or contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in '{raw}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Finds a workflow by numeric id, exact name, or unique case-insensitive name.
pub fn resolve_workflow<'a>(workflows: &'a [Workflow], key: &str) -> Result<&'a Workflow> {
    if let Ok(id) = key.parse::<WorkflowId>() {
        if let Some(workflow) = workflows.iter().find(|w| w.id == id) {
            return Ok(workflow);
        }
    }
    if let Some(workflow) = workflows.iter().find(|w| w.name == key) {
        return Ok(workflow);
    }

    let mut matches = workflows.iter().filter(|w| w.name.eq_ignore_ascii_case(key));
    match (matches.next(), matches.next()) {
        (Some(workflow), None) => Ok(workflow),
        (Some(_), Some(_)) => bail!("workflow name '{key}' is ambiguous; use its id"),
        _ => bail!("no workflow named '{key}'"),
    }
}

fn check_alert<A: WorkflowApi + ?Sized>(actions: &TriggerActions<A>) -> Result<()> {
    match actions.snapshot().alert {
        Some(alert) => Err(anyhow!(alert.message)),
        None => Ok(()),
    }
}

async fn refreshed<A: WorkflowApi + ?Sized>(actions: &TriggerActions<A>) -> Result<()> {
    actions.refresh().await;
    check_alert(actions).context("failed to load workflows and branches")
}

async fn select_with_options<A: WorkflowApi + ?Sized>(
    actions: &TriggerActions<A>,
    key: &str,
) -> Result<Workflow> {
    refreshed(actions).await?;
    let workflow = resolve_workflow(&actions.snapshot().workflows, key)?.clone();
    if !actions.select_workflow(workflow.id) {
        check_alert(actions)?;
    }
    actions.fetch_workflow_options().await;
    check_alert(actions)?;
    Ok(workflow)
}

pub async fn list_workflows<A, W>(actions: &TriggerActions<A>, out: &mut W) -> Result<()>
where
    A: WorkflowApi + ?Sized,
    W: Write,
{
    refreshed(actions).await?;
    for workflow in actions.snapshot().workflows {
        writeln!(out, "{}\t{}", workflow.id, workflow.name)?;
    }
    Ok(())
}

pub async fn list_branches<A, W>(
    actions: &TriggerActions<A>,
    search: Option<&str>,
    out: &mut W,
) -> Result<()>
where
    A: WorkflowApi + ?Sized,
    W: Write,
{
    refreshed(actions).await?;
    if let Some(search) = search {
        actions.filter_branches(search);
    }
    for branch in actions.snapshot().branches {
        writeln!(out, "{branch}")?;
    }
    Ok(())
}

pub async fn list_options<A, W>(actions: &TriggerActions<A>, key: &str, out: &mut W) -> Result<()>
where
    A: WorkflowApi + ?Sized,
    W: Write,
{
    select_with_options(actions, key).await?;
    let session = actions.snapshot();
    for name in session.boolean_options.keys() {
        writeln!(out, "{name}\tboolean")?;
    }
    for name in session.string_options.keys() {
        writeln!(out, "{name}\tstring")?;
    }
    Ok(())
}

pub async fn trigger<A, W>(actions: &TriggerActions<A>, args: &TriggerArgs, out: &mut W) -> Result<()>
where
    A: WorkflowApi + ?Sized,
    W: Write,
{
    let workflow = select_with_options(actions, &args.workflow).await?;
    if !actions.select_branch(&args.git_ref) {
        check_alert(actions)?;
    }

    for name in &args.enable {
        if !actions.set_boolean_option(name, true) {
            bail!("'{name}' is not a boolean option of '{}'", workflow.name);
        }
    }
    for (name, value) in &args.inputs {
        if !actions.set_string_option(name, value.as_str()) {
            bail!("'{name}' is not a string option of '{}'", workflow.name);
        }
    }

    actions.trigger_workflow().await;
    check_alert(actions)?;

    let receipt = actions
        .snapshot()
        .last_dispatch
        .context("dispatch finished without a receipt")?;
    writeln!(
        out,
        "Triggered '{}' on {} at {}",
        receipt.workflow.name, receipt.git_ref, receipt.dispatched_at
    )?;
    Ok(())
}
