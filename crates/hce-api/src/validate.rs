use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use hce_core::{DialogueTree, Node, NodeId, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeIssueKind {
    MissingStart,
    DanglingNext { target: NodeId },
    DanglingOption { index: usize, target: NodeId },
    InputWithoutKey,
    InputWithoutNext,
    LinkWithoutNext,
    RedirectWithoutLink,
    OptionsMissing,
    RelayCycle { path: Vec<NodeId> },
}

/// An authoring problem found in a dialogue tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeIssue {
    pub node_id: NodeId,
    pub kind: TreeIssueKind,
}

impl TreeIssue {
    fn new(node_id: &str, kind: TreeIssueKind) -> Self {
        Self {
            node_id: node_id.to_string(),
            kind,
        }
    }
}

impl fmt::Display for TreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TreeIssueKind::MissingStart => {
                write!(f, "start node \"{}\" is not defined", self.node_id)
            }
            TreeIssueKind::DanglingNext { target } => write!(
                f,
                "{}: nextNode \"{}\" is not defined",
                self.node_id, target
            ),
            TreeIssueKind::DanglingOption { index, target } => write!(
                f,
                "{}: option {} points to undefined node \"{}\"",
                self.node_id, index, target
            ),
            TreeIssueKind::InputWithoutKey => {
                write!(f, "{}: input node has no nextStateKey", self.node_id)
            }
            TreeIssueKind::InputWithoutNext => {
                write!(f, "{}: input node has no nextNode", self.node_id)
            }
            TreeIssueKind::LinkWithoutNext => {
                write!(f, "{}: link node has no nextNode", self.node_id)
            }
            TreeIssueKind::RedirectWithoutLink => {
                write!(f, "{}: redirect node has no link", self.node_id)
            }
            TreeIssueKind::OptionsMissing => {
                write!(f, "{}: options node offers no options", self.node_id)
            }
            TreeIssueKind::RelayCycle { path } => write!(
                f,
                "{}: nodes continue into each other without stopping ({})",
                self.node_id,
                path.join(" -> ")
            ),
        }
    }
}

/// Reports every authoring issue in `tree`, ordered by node id with cycles last.
pub fn validate_tree(tree: &DialogueTree, start: &str) -> Vec<TreeIssue> {
    let mut issues = Vec::new();
    if !tree.contains(start) {
        issues.push(TreeIssue::new(start, TreeIssueKind::MissingStart));
    }

    for (node_id, node) in tree.iter() {
        check_node(tree, node_id, node, &mut issues);
    }

    issues.extend(relay_cycles(tree));
    issues
}

fn check_node(tree: &DialogueTree, node_id: &str, node: &Node, issues: &mut Vec<TreeIssue>) {
    if let Some(target) = &node.next_node {
        if !tree.contains(target) {
            issues.push(TreeIssue::new(
                node_id,
                TreeIssueKind::DanglingNext {
                    target: target.clone(),
                },
            ));
        }
    }
    for (index, option) in node.options.iter().enumerate() {
        if !tree.contains(&option.next_node) {
            issues.push(TreeIssue::new(
                node_id,
                TreeIssueKind::DanglingOption {
                    index,
                    target: option.next_node.clone(),
                },
            ));
        }
    }

    match node.kind {
        NodeKind::QuestionWithInput => {
            if node.next_state_key.is_none() {
                issues.push(TreeIssue::new(node_id, TreeIssueKind::InputWithoutKey));
            }
            if node.next_node.is_none() {
                issues.push(TreeIssue::new(node_id, TreeIssueKind::InputWithoutNext));
            }
        }
        NodeKind::MessageWithLink if node.next_node.is_none() => {
            issues.push(TreeIssue::new(node_id, TreeIssueKind::LinkWithoutNext));
        }
        NodeKind::InternalRedirect if node.link.is_none() => {
            issues.push(TreeIssue::new(node_id, TreeIssueKind::RedirectWithoutLink));
        }
        NodeKind::QuestionWithOptions if node.options.is_empty() => {
            issues.push(TreeIssue::new(node_id, TreeIssueKind::OptionsMissing));
        }
        _ => {}
    }
}

/// The node a completed node moves on to without waiting for the user.
fn relay_target(node: &Node) -> Option<&NodeId> {
    match node.kind {
        NodeKind::QuestionWithInput => None,
        NodeKind::InternalRedirect if node.link.is_some() => node.next_node.as_ref(),
        NodeKind::MessageWithLink => node.next_node.as_ref(),
        _ if !node.options.is_empty() => None,
        _ => node.next_node.as_ref(),
    }
}

fn relay_cycles(tree: &DialogueTree) -> Vec<TreeIssue> {
    let edges: BTreeMap<&NodeId, &NodeId> = tree
        .iter()
        .filter_map(|(node_id, node)| {
            relay_target(node)
                .filter(|target| tree.contains(target))
                .map(|target| (node_id, target))
        })
        .collect();

    let mut settled: BTreeSet<&NodeId> = BTreeSet::new();
    let mut issues = Vec::new();
    for (node_id, _) in tree.iter() {
        if settled.contains(node_id) {
            continue;
        }
        let mut path: Vec<&NodeId> = Vec::new();
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if settled.contains(current) {
                break;
            }
            if let Some(position) = path.iter().position(|seen| *seen == current) {
                let cycle: Vec<NodeId> = path[position..]
                    .iter()
                    .map(|id| (*id).clone())
                    .chain(std::iter::once(current.clone()))
                    .collect();
                issues.push(TreeIssue::new(
                    current,
                    TreeIssueKind::RelayCycle { path: cycle },
                ));
                break;
            }
            path.push(current);
            cursor = edges.get(current).copied();
        }
        settled.extend(path);
    }
    issues
}
