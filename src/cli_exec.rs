use anyhow::{Context, Result};

use gitops_console::api::ApiClient;
use gitops_console::change_tree::{self, TreeNode};
use gitops_console::console::{
    Completion, Delivery, DeploymentGate, GateState, SelectionContext, execute,
};
use gitops_console::model::{Mode, NginxCheck, SyncStats, UpdateResult};

use crate::TargetArgs;

pub(super) fn groups(client: &ApiClient, json: bool) -> Result<()> {
    let listing = client.list_groups()?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).context("serialize groups json")?
        );
        return Ok(());
    }
    if listing.groups.is_empty() {
        println!("No groups configured");
    }
    for group in &listing.groups {
        println!("{}", group.name);
        for host in &group.hosts {
            println!("  {} ({}) {}", host.host, host.name, host.config_dir_suffix);
        }
    }
    Ok(())
}

pub(super) fn tree(
    client: &ApiClient,
    target: &TargetArgs,
    mode: Mode,
    show_all: bool,
    json: bool,
) -> Result<()> {
    let listing = client.fetch_tree(&target.group, &target.host, mode)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).context("serialize tree json")?
        );
        return Ok(());
    }
    let forest = change_tree::build(&listing.prefix, &listing.paths, &listing.statuses(), show_all);
    if forest.is_empty() {
        println!("{}", if show_all { "No files" } else { "No changed files" });
        return Ok(());
    }
    for node in &forest {
        print_node(node, 0);
    }
    println!(
        "{} changed file(s)",
        change_tree::changed_leaf_count(&forest)
    );
    Ok(())
}

fn print_node(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.is_leaf() {
        let icon = node.marker().map_or(" ", |m| m.icon);
        println!("{}{} {}", indent, icon, node.name);
    } else {
        println!("{}  {}/", indent, node.name);
        for child in node.children() {
            print_node(child, depth + 1);
        }
    }
}

pub(super) fn diff(
    client: &ApiClient,
    target: &TargetArgs,
    path: &str,
    mode: Mode,
    json: bool,
) -> Result<()> {
    let record = client.triple_diff(&target.group, &target.host, path, mode)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&record).context("serialize diff json")?
        );
        return Ok(());
    }
    println!("path: {}", record.path);
    println!("compare: remote vs {}", record.compare_label);
    if let Some(status) = record.status() {
        println!("status: {} {}", status.marker().icon, status.as_str());
    }
    if record.diff.trim().is_empty() {
        println!("No differences");
    } else {
        println!("{}", record.diff.trim_end());
    }
    Ok(())
}

pub(super) fn check(client: &ApiClient, target: &TargetArgs, mode: Mode, json: bool) -> Result<()> {
    let result = client.run_check(&target.group, &target.host, mode)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("serialize check json")?
        );
    } else {
        println!("check: {}", verdict(result.ok));
        if let Some(sync) = &result.sync {
            print_sync(sync);
        }
        if let Some(nginx) = &result.nginx {
            print_nginx(nginx);
        }
    }
    if !result.ok {
        anyhow::bail!("check failed for {}/{} ({})", target.group, target.host, mode);
    }
    Ok(())
}

/// Prepare, then apply only if the gate allows it.
pub(super) fn update(client: &ApiClient, target: &TargetArgs, apply: bool, json: bool) -> Result<()> {
    let ctx = SelectionContext::new(&target.group, &target.host, Mode::Prod);
    let mut gate = DeploymentGate::default();
    let mut shown = Vec::new();

    let request = gate.prepare(Some(&ctx))?;
    let delivery = match execute(client, request) {
        Completion::Prepare { ticket, outcome } => gate.complete_prepare(&ticket, Some(&ctx), outcome),
        other => anyhow::bail!("unexpected {} completion", other.label()),
    };
    shown.extend(gate.latest());
    settle(delivery, &shown, json)?;

    if !gate.apply_enabled() {
        emit(&shown, json)?;
        anyhow::bail!("prepare did not pass the nginx check; not applying");
    }
    if !apply {
        emit(&shown, json)?;
        if !json {
            println!("prepare passed; re-run with --apply to reload production");
        }
        return Ok(());
    }

    let request = gate.apply(Some(&ctx))?;
    let delivery = match execute(client, request) {
        Completion::Apply { ticket, outcome } => gate.complete_apply(&ticket, Some(&ctx), outcome),
        other => anyhow::bail!("unexpected {} completion", other.label()),
    };
    shown.extend(gate.latest());
    settle(delivery, &shown, json)?;
    emit(&shown, json)?;
    match gate.state() {
        GateState::Applied { result } if !result.success => {
            anyhow::bail!("apply failed: {}", result.message)
        }
        _ => Ok(()),
    }
}

/// Shows whatever diagnostic arrived before turning a failed delivery into an error.
fn settle(delivery: Delivery, shown: &[UpdateResult], json: bool) -> Result<()> {
    match delivery {
        Delivery::Applied => Ok(()),
        Delivery::Stale => anyhow::bail!("update result was superseded"),
        Delivery::Rejected(err) => {
            emit(shown, json)?;
            Err(err)
        }
        Delivery::Failed(err) => Err(err),
    }
}

fn emit(shown: &[UpdateResult], json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(shown).context("serialize update json")?
        );
        return Ok(());
    }
    for result in shown {
        match result {
            UpdateResult::Prepare(prepare) => {
                println!("prepare: {}", verdict(prepare.nginx_ok()));
                if let Some(sync) = &prepare.sync {
                    print_sync(sync);
                }
                match &prepare.nginx {
                    Some(nginx) => print_nginx(nginx),
                    None => println!("nginx: no check reported"),
                }
            }
            UpdateResult::Apply(applied) => {
                println!("apply: {}", verdict(applied.success));
                if !applied.message.is_empty() {
                    println!("{}", applied.message);
                }
                if let Some(nginx) = &applied.nginx {
                    print_nginx(nginx);
                }
            }
        }
    }
    Ok(())
}

pub(super) fn git_status(client: &ApiClient, json: bool) -> Result<()> {
    let status = client.git_status()?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).context("serialize git status json")?
        );
        return Ok(());
    }
    println!("status: {}", status.status.label());
    println!("branch: {}", status.branch);
    println!("sync_mode: {}", status.sync_mode);
    for (label, commit) in [("local", &status.local_commit), ("remote", &status.remote_commit)] {
        if let Some(c) = commit {
            let subject = c.message.lines().next().unwrap_or_default();
            println!("{}: {} {} {} {}", label, c.short_hash(), c.author, c.timestamp, subject);
        }
    }
    if let Some(err) = &status.error {
        println!("error: {}", err);
    }
    if let Some(diff) = status.diff.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", diff.trim_end());
    }
    Ok(())
}

fn verdict(ok: bool) -> &'static str {
    if ok { "passed" } else { "FAILED" }
}

fn print_sync(sync: &SyncStats) {
    println!(
        "sync: total={} skipped={} updated={} added={} deleted={}",
        sync.total, sync.skipped, sync.updated, sync.added, sync.deleted
    );
    for (mark, files) in [
        ("~", &sync.updated_files),
        ("+", &sync.added_files),
        ("-", &sync.deleted_files),
    ] {
        for file in files.iter().flatten() {
            println!("  {} {}", mark, file);
        }
    }
}

fn print_nginx(nginx: &NginxCheck) {
    println!("nginx: {} ({})", verdict(nginx.ok), nginx.command);
    for line in nginx.output.lines() {
        println!("  {}", line);
    }
}
