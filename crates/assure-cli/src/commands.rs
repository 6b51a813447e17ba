//! Subcommand implementations over in-memory values
//!
//! File handling lives in `main.rs`; everything here is pure so it can be
//! tested without touching the filesystem.

use anyhow::{bail, Context as _};
use assure_layout::{
    calculate_connection_hints, CanvasNode, CanvasTransform, ConnectionHint, LayoutConfig, PlacementEngine,
    PlacementRequest, PlacementResult, Point,
};
use assure_model::{AssuranceCase, Element, ElementKey};
use assure_tree::{CaseSnapshot, DeletePolicy};
use serde::Serialize;

/// Parse a case file: a full snapshot (`{"case": .., "orphans": [..]}`)
/// or a bare case with no orphans
pub(crate) fn parse_snapshot(text: &str) -> anyhow::Result<CaseSnapshot> {
    let value: serde_json::Value = serde_json::from_str(text).context("case file is not valid JSON")?;
    if value.get("case").is_some() {
        return serde_json::from_value(value).context("invalid case snapshot");
    }
    let case: AssuranceCase = serde_json::from_value(value).context("invalid assurance case")?;
    Ok(CaseSnapshot::new(case))
}

/// Parse a canvas node list
pub(crate) fn parse_nodes(text: &str) -> anyhow::Result<Vec<CanvasNode>> {
    serde_json::from_str(text).context("invalid node list")
}

/// Reattach orphan `key` under `parent`
pub(crate) fn attach(snapshot: &CaseSnapshot, key: ElementKey, parent: ElementKey) -> anyhow::Result<CaseSnapshot> {
    let Some(orphan) = snapshot.orphans().get(&key).cloned() else {
        if snapshot.is_attached(&key) {
            bail!("{key} is already attached");
        }
        bail!("{key} is not in the orphan set");
    };
    Ok(snapshot.attach(orphan, parent)?)
}

pub(crate) fn detach(snapshot: &CaseSnapshot, key: ElementKey) -> anyhow::Result<CaseSnapshot> {
    Ok(snapshot.detach(key)?)
}

pub(crate) fn move_element(
    snapshot: &CaseSnapshot,
    key: ElementKey,
    parent: ElementKey,
) -> anyhow::Result<CaseSnapshot> {
    Ok(snapshot.move_element(key, parent)?)
}

pub(crate) fn remove(snapshot: &CaseSnapshot, key: ElementKey, keep_children: bool) -> anyhow::Result<CaseSnapshot> {
    let policy = if keep_children {
        DeletePolicy::OrphanChildren
    } else {
        DeletePolicy::Cascade
    };
    Ok(snapshot.remove(key, policy)?)
}

/// Orphans, optionally only those attachable under `node_type`
pub(crate) fn orphans(snapshot: &CaseSnapshot, node_type: Option<&str>) -> Vec<Element> {
    match node_type {
        Some(node_type) => snapshot
            .filter_orphans_for_node(node_type)
            .into_iter()
            .cloned()
            .collect(),
        None => snapshot.orphans().iter().cloned().collect(),
    }
}

/// Summary printed by `assure check`
#[derive(Debug, Serialize)]
pub(crate) struct CheckReport {
    pub(crate) clean: bool,
    pub(crate) placed: usize,
    pub(crate) orphans: usize,
    pub(crate) violations: Vec<String>,
}

pub(crate) fn check(snapshot: &CaseSnapshot) -> CheckReport {
    let report = snapshot.partition_report();
    CheckReport {
        clean: report.is_clean(),
        placed: snapshot.index().len(),
        orphans: snapshot.orphans().len(),
        violations: report.violations.iter().map(ToString::to_string).collect(),
    }
}

pub(crate) fn place<T: CanvasTransform + ?Sized>(
    engine: &PlacementEngine,
    request: &PlacementRequest,
    nodes: &[CanvasNode],
    transform: &T,
) -> anyhow::Result<PlacementResult> {
    Ok(engine.place(request, nodes, transform)?)
}

pub(crate) fn hints(layout: &LayoutConfig, position: Point, nodes: &[CanvasNode]) -> Vec<ConnectionHint> {
    calculate_connection_hints(position, nodes, layout)
}
