//! trexa-graph
//!
//! Folder/file tree of a directory as `{nodes, links}` JSON for the 3D view.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use trexa_core::{Error, Result};
use walkdir::{DirEntry, WalkDir};

pub const FOLDER_COLOR: &str = "rgba(93, 109, 126, 0.8)";
pub const FILE_COLOR: &str = "rgba(52, 152, 219, 0.8)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub relationship: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileTreeGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Node {
    fn folder(id: String, label: String) -> Self {
        Self { id, label, kind: NodeKind::Folder, color: FOLDER_COLOR.to_string(), size_kb: None, modified_timestamp: None }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn contains(source: &str, target: &str) -> Link {
    Link { source: source.to_string(), target: target.to_string(), relationship: "contains".to_string() }
}

/// Walk `root` (hidden entries excluded) into folder and file nodes.
///
/// # Errors
/// `NotFound` when `root` is not a directory.
pub fn build_file_tree_graph(root: &Path) -> Result<FileTreeGraph> {
    if !root.is_dir() {
        error!("Provided path '{}' is not a valid directory.", root.display());
        return Err(Error::NotFound(root.to_path_buf()));
    }
    info!("Starting file tree scan at: {}", root.display());

    let root_label = trexa_core::config::absolutize(root)
        .file_name()
        .map_or_else(|| root.to_string_lossy().to_string(), |n| n.to_string_lossy().to_string());
    let mut graph = FileTreeGraph::default();
    let root_id = root.to_string_lossy().to_string();
    graph.nodes.push(Node::folder(root_id.clone(), root_label));

    let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| !is_hidden(e));
    for entry in walker.skip(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Could not access entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        let id = path.to_string_lossy().to_string();
        let label = entry.file_name().to_string_lossy().to_string();
        // Depth-1 entries point at the root node id as given, trailing separator and all.
        let parent = match path.parent() {
            Some(p) if entry.depth() > 1 => p.to_string_lossy().to_string(),
            _ => root_id.clone(),
        };

        if entry.file_type().is_dir() {
            graph.nodes.push(Node::folder(id.clone(), label));
            graph.links.push(contains(&parent, &id));
            continue;
        }
        let stat = match fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                warn!("Could not access metadata for {}: {}", path.display(), e);
                continue;
            }
        };
        #[allow(clippy::cast_precision_loss)]
        let size_kb = (stat.len() as f64 / 1024.0 * 100.0).round() / 100.0;
        let modified = stat.modified().ok().map(|t| DateTime::<Local>::from(t).format("%Y-%m-%dT%H:%M:%S%.6f").to_string());
        graph.nodes.push(Node {
            id: id.clone(),
            label,
            kind: NodeKind::File,
            color: FILE_COLOR.to_string(),
            size_kb: Some(size_kb),
            modified_timestamp: modified,
        });
        graph.links.push(contains(&parent, &id));
    }

    info!("Graph built successfully: {} nodes and {} links created.", graph.nodes.len(), graph.links.len());
    Ok(graph)
}

/// Pretty-print `graph` to `output`, creating parent directories. Failures
/// are logged only.
pub fn write_graph(graph: &FileTreeGraph, output: &Path) {
    let result = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| serde_json::to_string_pretty(graph).map_err(std::io::Error::other))
        .and_then(|json| fs::write(output, json));
    match result {
        Ok(()) => info!("Successfully wrote graph data to {}", output.display()),
        Err(e) => error!("Failed to write graph data to file: {}", e),
    }
}

/// Build the graph for `root` and persist it to `output`.
pub fn build_and_write(root: &Path, output: &Path) -> Result<FileTreeGraph> {
    let graph = build_file_tree_graph(root)?;
    write_graph(&graph, output);
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_nodes_serialize_with_type_and_size() {
        let node = Node {
            id: "/r/a.txt".into(),
            label: "a.txt".into(),
            kind: NodeKind::File,
            color: FILE_COLOR.into(),
            size_kb: Some(1.5),
            modified_timestamp: Some("2024-01-01T00:00:00.000000".into()),
        };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["type"], "file");
        assert_eq!(v["size_kb"], 1.5);
        let folder = serde_json::to_value(Node::folder("/r".into(), "r".into())).unwrap();
        assert_eq!(folder["type"], "folder");
        assert!(folder.get("size_kb").is_none());
    }
}
