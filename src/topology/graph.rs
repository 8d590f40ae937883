//! Declarative node/link graph.
//!
//! The graph is fully specified before any runtime is asked to build it.
//! Nodes keep their declaration order, which is also the order in which
//! they are handed to the runtime.

use super::types::{LinkDescriptor, LinkParams, NodeDescriptor, NodeKind, TopologyError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Topology {
    nodes: Vec<NodeDescriptor>,
    links: Vec<LinkDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    link_keys: HashSet<(String, String)>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node. Names must be unique within the topology.
    pub fn add_node(&mut self, node: NodeDescriptor) -> Result<(), TopologyError> {
        if self.index.contains_key(&node.name) {
            return Err(TopologyError::DuplicateNode(node.name));
        }
        log::debug!("Declared {:?} node '{}'", node.kind(), node.name);
        self.index.insert(node.name.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Link two already declared nodes
    pub fn add_link(&mut self, a: &str, b: &str, params: LinkParams) -> Result<(), TopologyError> {
        for endpoint in [a, b] {
            if !self.index.contains_key(endpoint) {
                return Err(TopologyError::UnknownNode(endpoint.to_string()));
            }
        }
        if a == b {
            return Err(TopologyError::SelfLink(a.to_string()));
        }

        let link = LinkDescriptor { a: a.to_string(), b: b.to_string(), params };
        let (first, second) = link.key();
        let key = (first.to_string(), second.to_string());
        if !self.link_keys.insert(key) {
            return Err(TopologyError::DuplicateLink(a.to_string(), b.to_string()));
        }

        log::debug!("Declared link {} <-> {}", a, b);
        self.links.push(link);
        Ok(())
    }

    /// Link consecutive nodes of `names` into a chain, returning the number of links added
    pub fn add_chain(&mut self, names: &[String], params: LinkParams) -> Result<usize, TopologyError> {
        for pair in names.windows(2) {
            self.add_link(&pair[0], &pair[1], params)?;
        }
        Ok(names.len().saturating_sub(1))
    }

    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkDescriptor] {
        &self.links
    }

    pub fn node(&self, name: &str) -> Option<&NodeDescriptor> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn count(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|n| n.kind() == kind).count()
    }

    pub fn names_with(&self, kind: NodeKind) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == kind)
            .map(|n| n.name.clone())
            .collect()
    }

    /// Whether any node needs the wireless medium
    pub fn is_wireless(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| matches!(n.kind(), NodeKind::AccessPoint | NodeKind::Station))
    }

    /// Number of links with both endpoints of the given kind
    pub fn links_between(&self, a: NodeKind, b: NodeKind) -> usize {
        self.links
            .iter()
            .filter(|l| {
                let ka = self.node(&l.a).map(NodeDescriptor::kind);
                let kb = self.node(&l.b).map(NodeDescriptor::kind);
                (ka == Some(a) && kb == Some(b)) || (ka == Some(b) && kb == Some(a))
            })
            .count()
    }
}
