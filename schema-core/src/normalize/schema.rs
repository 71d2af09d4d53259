//! The canonical schema arena.
//!
//! Mirrors the teacher's ID-addressed arena style (`RegistryV1`/`ByteState`
//! indexed by a newtype over `u32`) instead of a naive recursive
//! `enum Schema { ... Box<Schema> ... }` tree: `$ref` edges become plain
//! back-edges by [`NodeId`] rather than a second resolution pass over a
//! pointer-keyed map every time a reference is followed.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::pointer::Pointer;

/// An index into [`CanonicalSchema::nodes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// One node in the canonical schema arena: either a boolean schema
/// (`true`/`false`) or an object schema with its own keywords, edges to
/// nested schema locations, and an optional resolved `$ref` back-edge.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    Boolean(bool),
    Object {
        keywords: Map<String, Value>,
        /// Nested schema locations, keyed by the structural path suffix
        /// from this node (e.g. `"properties/foo"`, `"items"`, `"allOf/0"`).
        children: BTreeMap<String, NodeId>,
        /// Resolved target of a local (`#/...`) `$ref`, if present and
        /// resolvable within this document.
        ref_target: Option<NodeId>,
    },
}

/// The canonical schema: a flat arena of [`SchemaNode`]s addressed by
/// [`NodeId`], each tagged with the canonical pointer it was found at.
#[derive(Debug, Clone)]
pub struct CanonicalSchema {
    nodes: Vec<SchemaNode>,
    pointers: Vec<Pointer>,
    by_pointer: BTreeMap<Pointer, NodeId>,
    root: NodeId,
}

impl CanonicalSchema {
    pub(crate) fn builder() -> CanonicalSchemaBuilder {
        CanonicalSchemaBuilder { nodes: Vec::new(), pointers: Vec::new(), by_pointer: BTreeMap::new() }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0 as usize]
    }

    #[must_use]
    pub fn pointer_of(&self, id: NodeId) -> &Pointer {
        &self.pointers[id.0 as usize]
    }

    #[must_use]
    pub fn node_at(&self, pointer: &Pointer) -> Option<NodeId> {
        self.by_pointer.get(pointer).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate every node with its assigned id, in construction (pointer
    /// pre-order) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Follow `ref_target` edges from `id` until landing on a node that
    /// isn't itself a `$ref`.
    #[must_use]
    pub fn resolve_ref(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let SchemaNode::Object { ref_target: Some(target), .. } = self.get(current) {
            current = *target;
        }
        current
    }

    /// Look up a named property starting from the object node at `id`,
    /// following `$ref` edges and, when not declared directly, descending
    /// into each `allOf` branch in declaration order. Returns the resolved
    /// (non-`$ref`) node for the property's subschema along with the chain
    /// of `allOf` branch indices that led to it, empty when found directly.
    #[must_use]
    pub fn resolve_property(&self, id: NodeId, name: &str) -> Option<(NodeId, Vec<usize>)> {
        let resolved = self.resolve_ref(id);
        let SchemaNode::Object { children, .. } = self.get(resolved) else { return None };

        if let Some(&child) = children.get(&format!("properties/{name}")) {
            return Some((self.resolve_ref(child), Vec::new()));
        }

        let mut i = 0;
        while let Some(&branch) = children.get(&format!("allOf/{i}")) {
            if let Some((found, mut via)) = self.resolve_property(branch, name) {
                via.insert(0, i);
                return Some((found, via));
            }
            i += 1;
        }
        None
    }
}

pub(crate) struct CanonicalSchemaBuilder {
    nodes: Vec<SchemaNode>,
    pointers: Vec<Pointer>,
    by_pointer: BTreeMap<Pointer, NodeId>,
}

impl CanonicalSchemaBuilder {
    pub(crate) fn push(&mut self, pointer: Pointer, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.by_pointer.insert(pointer.clone(), id);
        self.pointers.push(pointer);
        self.nodes.push(node);
        id
    }

    pub(crate) fn node_at(&self, pointer: &Pointer) -> Option<NodeId> {
        self.by_pointer.get(pointer).copied()
    }

    pub(crate) fn set_ref_target(&mut self, id: NodeId, target: NodeId) {
        if let SchemaNode::Object { ref_target, .. } = &mut self.nodes[id.0 as usize] {
            *ref_target = Some(target);
        }
    }

    pub(crate) fn finish(self, root: NodeId) -> CanonicalSchema {
        CanonicalSchema { nodes: self.nodes, pointers: self.pointers, by_pointer: self.by_pointer, root }
    }
}
