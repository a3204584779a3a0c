//! Relation graph to tree construction
//!
//! File type relations form a general graph: cycles and multiple paths are
//! allowed. Renderers lay dictionaries out as a tree, so the graph is walked
//! breadth-first from a root and every edge reaching an already visited file
//! type is kept aside as a dropped relation instead of becoming a tree edge.
//!
//! Nodes live in an arena and are identified by their index, assigned in
//! traversal order. The same dictionary, root and direction always produce
//! the same ids.

use dictlens_core::{Dictionary, EdgeDirection, Field, Relation};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Node identifier (arena index, 0 is the root)
pub type NodeId = usize;

/// Why a relation did not become a tree edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroppedKind {
    /// Both endpoints sit at the same depth
    SameLevel,

    /// Endpoints sit at different depths
    Cross,

    /// The relation points back at its own file type
    SelfReference,

    /// The target is not a file type of this dictionary
    Unresolved,
}

/// A relation that was not turned into a tree edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRelation {
    /// Name of the file type the edge leads to
    pub target: String,

    pub kind: DroppedKind,

    /// The declared relation behind the edge
    pub relation: Relation,
}

/// A node of the relation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,

    /// File type name
    pub name: String,

    /// Distance from the root
    pub depth: usize,

    pub parent: Option<NodeId>,

    /// Children in traversal order
    pub children: Vec<NodeId>,

    /// Fields of the file type, empty when the file type does not exist
    pub fields: Vec<Field>,

    /// Edges leaving this node that were not used as tree edges
    pub dropped: Vec<DroppedRelation>,
}

/// Kind of a renderer link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Tree,
    Dropped(DroppedKind),
}

/// An edge handed to the renderer, with the relations it stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLink {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,

    /// Relations declared between the two file types
    pub relations: Vec<Relation>,

    /// True when the relations are declared on the target, not the source
    pub reversed: bool,
}

impl TreeLink {
    /// One line per relation: `owner( fields ) -> other( other_fields )`
    pub fn describe(&self) -> Vec<String> {
        let owner = if self.reversed { &self.target } else { &self.source };
        self.relations
            .iter()
            .map(|r| {
                format!(
                    "{} -> {}",
                    relation_text(owner, &r.fields),
                    relation_text(&r.other, &r.other_fields)
                )
            })
            .collect()
    }
}

/// Format a join side as `name( f1, f2 )`
pub fn relation_text(name: &str, fields: &[String]) -> String {
    format!("{}( {} )", name, fields.join(", "))
}

/// Rooted tree over a dictionary's relation graph
///
/// Only produced by [`RelationTree::build`], so there is always a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationTree {
    nodes: Vec<TreeNode>,
    direction: EdgeDirection,
}

impl RelationTree {
    /// Build the tree rooted at `root_name`
    ///
    /// When `root_name` is not a file type of the dictionary the result is
    /// a single root node with no children.
    pub fn build(dictionary: &Dictionary, root_name: &str, direction: EdgeDirection) -> Self {
        let root = TreeNode {
            id: 0,
            name: root_name.to_string(),
            depth: 0,
            parent: None,
            children: Vec::new(),
            fields: Vec::new(),
            dropped: Vec::new(),
        };

        let Some(root_type) = dictionary.file_type(root_name) else {
            tracing::debug!(root = root_name, version = %dictionary.version, "root is not a file type");
            return Self {
                nodes: vec![root],
                direction,
            };
        };

        let mut nodes = vec![TreeNode {
            fields: root_type.fields.clone(),
            ..root
        }];

        let edges = outgoing_edges(dictionary, direction);

        // Visited set: name -> node id
        let mut visited: HashMap<&str, NodeId> = HashMap::new();
        visited.insert(root_type.name.as_str(), 0);

        let mut queue = VecDeque::from([0]);

        while let Some(current) = queue.pop_front() {
            let Some(out) = edges.get(nodes[current].name.as_str()) else {
                continue;
            };

            for &(target, relation) in out {
                let Some(target_type) = dictionary.file_type(target) else {
                    tracing::warn!(
                        from = %nodes[current].name,
                        to = target,
                        "relation target is not a file type"
                    );
                    nodes[current].dropped.push(DroppedRelation {
                        target: target.to_string(),
                        kind: DroppedKind::Unresolved,
                        relation: relation.clone(),
                    });
                    continue;
                };

                if let Some(&seen) = visited.get(target) {
                    let kind = if seen == current {
                        DroppedKind::SelfReference
                    } else if nodes[seen].depth == nodes[current].depth {
                        DroppedKind::SameLevel
                    } else {
                        DroppedKind::Cross
                    };
                    nodes[current].dropped.push(DroppedRelation {
                        target: target.to_string(),
                        kind,
                        relation: relation.clone(),
                    });
                    continue;
                }

                let id = nodes.len();
                nodes.push(TreeNode {
                    id,
                    name: target_type.name.clone(),
                    depth: nodes[current].depth + 1,
                    parent: Some(current),
                    children: Vec::new(),
                    fields: target_type.fields.clone(),
                    dropped: Vec::new(),
                });
                nodes[current].children.push(id);
                visited.insert(target, id);
                queue.push_back(id);
            }
        }

        tracing::debug!(
            root = root_name,
            version = %dictionary.version,
            nodes = nodes.len(),
            "built relation tree"
        );

        Self { nodes, direction }
    }

    /// The root node
    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// All nodes in traversal order
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    /// Find a node by file type name
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Immediate children of a node
    pub fn children(&self, id: NodeId) -> Vec<&TreeNode> {
        self.node(id)
            .map(|n| n.children.iter().filter_map(|&c| self.node(c)).collect())
            .unwrap_or_default()
    }

    /// Parent/child id pairs in traversal order
    pub fn tree_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .filter_map(|n| n.parent.map(|p| (p, n.id)))
            .collect()
    }

    /// Nodes at a given depth
    pub fn nodes_at_depth(&self, depth: usize) -> Vec<&TreeNode> {
        self.nodes.iter().filter(|n| n.depth == depth).collect()
    }

    /// Greatest depth in the tree
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    /// Whether a node has a dropped relation to a node at its own depth
    ///
    /// Renderers add horizontal room for such nodes.
    pub fn has_same_level_relation(&self, id: NodeId) -> bool {
        self.node(id)
            .map(|n| n.dropped.iter().any(|d| d.kind == DroppedKind::SameLevel))
            .unwrap_or(false)
    }

    /// All dropped relations with the node they leave from
    pub fn dropped_relations(&self) -> Vec<(&TreeNode, &DroppedRelation)> {
        self.nodes
            .iter()
            .flat_map(|n| n.dropped.iter().map(move |d| (n, d)))
            .collect()
    }

    /// Renderer links: tree edges first, then dropped relations
    pub fn links(&self, dictionary: &Dictionary) -> Vec<TreeLink> {
        let tree = self.tree_edges().into_iter().filter_map(|(p, c)| {
            let (parent, child) = (self.node(p)?, self.node(c)?);
            Some(link(dictionary, &parent.name, &child.name, LinkKind::Tree))
        });

        let dropped = self.dropped_relations().into_iter().map(|(node, d)| {
            link(dictionary, &node.name, &d.target, LinkKind::Dropped(d.kind))
        });

        tree.chain(dropped).collect()
    }
}

/// Build the tree rooted at `root_name` following relations forward
pub fn build_relation_tree(dictionary: &Dictionary, root_name: &str) -> RelationTree {
    RelationTree::build(dictionary, root_name, EdgeDirection::Forward)
}

/// Outgoing edges per file type, in dictionary and relation order
///
/// In reverse mode a relation to an unknown file type stays on its owner,
/// so the walk still reports it as unresolved.
fn outgoing_edges(
    dictionary: &Dictionary,
    direction: EdgeDirection,
) -> HashMap<&str, Vec<(&str, &Relation)>> {
    let mut edges: HashMap<&str, Vec<(&str, &Relation)>> = HashMap::new();

    for file_type in &dictionary.files {
        for relation in &file_type.relations {
            let (owner, other) = (file_type.name.as_str(), relation.other.as_str());
            let (from, to) = match direction {
                EdgeDirection::Forward => (owner, other),
                EdgeDirection::Reverse if dictionary.file_type(other).is_some() => (other, owner),
                EdgeDirection::Reverse => (owner, other),
            };
            edges.entry(from).or_default().push((to, relation));
        }
    }

    edges
}

/// Relations between two file types, looked up on `source` first
fn link(dictionary: &Dictionary, source: &str, target: &str, kind: LinkKind) -> TreeLink {
    let declared = |owner: &str, other: &str| -> Vec<Relation> {
        dictionary
            .file_type(owner)
            .map(|f| {
                f.relations
                    .iter()
                    .filter(|r| r.other == other)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    };

    let mut relations = declared(source, target);
    let mut reversed = false;
    if relations.is_empty() {
        relations = declared(target, source);
        reversed = true;
    }

    TreeLink {
        source: source.to_string(),
        target: target.to_string(),
        kind,
        relations,
        reversed,
    }
}
