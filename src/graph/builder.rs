use std::collections::HashMap;
use std::sync::Arc;

use smallvec::{SmallVec, smallvec};
use tracing::trace;

use crate::expression::registry;
use crate::foundation::core::{Component, Shape, Value};
use crate::foundation::error::{ShadegraphError, ShadegraphResult};
use crate::graph::cell::{Cell, CellId};
use crate::graph::node::{Builtin, Node, NodeId, NodeRef, OpKind, Operands};
use crate::graph::signature::{NodeDigest, digest_node};

/// Builds and owns one session's computation graph.
///
/// The builder hands out shared [`NodeRef`] handles and deduplicates
/// structurally identical subexpressions through a signature cache: two
/// occurrences of the same subexpression within one builder resolve to the
/// same node. Previously returned nodes are never mutated; composing a new
/// expression only adds nodes on top of existing ones, so the graph stays
/// acyclic by construction.
///
/// The cache lives as long as the builder; use one builder per scene to share
/// subgraphs across that scene's effects.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    next_node: u32,
    next_cell: u32,
    cache: HashMap<NodeDigest, NodeRef>,
}

impl GraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct nodes allocated so far.
    pub fn node_count(&self) -> usize {
        self.cache.len()
    }

    /// Intern a scalar constant.
    pub fn constant(&mut self, v: f64) -> NodeRef {
        self.intern(OpKind::Const(v), Shape::Scalar, SmallVec::new())
    }

    /// Intern a vector of 2..=4 constants as a `Construct` of `Const` nodes.
    pub fn constant_vector(&mut self, lanes: &[f64]) -> ShadegraphResult<NodeRef> {
        let shape = match lanes.len() {
            2..=4 => Shape::Vector(lanes.len() as u8),
            n => {
                return Err(ShadegraphError::validation(format!(
                    "constant vector must have 2..=4 lanes, got {n}"
                )));
            }
        };
        let args: Operands = lanes.iter().map(|&v| self.constant(v)).collect();
        Ok(self.intern(OpKind::Construct, shape, args))
    }

    /// Allocate a new mutable cell initialized to `initial`.
    ///
    /// Cells are created only for live external inputs (elapsed time, an
    /// audio-derived scalar); each call allocates fresh storage, so cells are
    /// never deduplicated against each other.
    pub fn cell(&mut self, initial: Value) -> Cell {
        let id = CellId(self.next_cell);
        self.next_cell += 1;
        Cell::new(id, initial)
    }

    /// The graph leaf reading `cell`.
    ///
    /// Splicing the same cell into many expressions yields the same node, so
    /// every consumer observes the single write slot.
    pub fn cell_node(&mut self, cell: &Cell) -> NodeRef {
        self.intern(OpKind::Cell(cell.clone()), cell.shape(), SmallVec::new())
    }

    /// The scalar per-element index leaf, supplied at evaluation time.
    pub fn index(&mut self) -> NodeRef {
        self.intern(OpKind::Index, Shape::Scalar, SmallVec::new())
    }

    /// Negate a node.
    pub fn neg(&mut self, a: &NodeRef) -> NodeRef {
        self.intern(OpKind::Neg, a.shape(), smallvec![a.clone()])
    }

    /// Elementwise `a + b` with scalar broadcasting.
    pub fn add(&mut self, a: &NodeRef, b: &NodeRef) -> ShadegraphResult<NodeRef> {
        self.binary(OpKind::Add, a, b)
    }

    /// Elementwise `a - b` with scalar broadcasting.
    pub fn sub(&mut self, a: &NodeRef, b: &NodeRef) -> ShadegraphResult<NodeRef> {
        self.binary(OpKind::Sub, a, b)
    }

    /// Elementwise `a * b` with scalar broadcasting.
    pub fn mul(&mut self, a: &NodeRef, b: &NodeRef) -> ShadegraphResult<NodeRef> {
        self.binary(OpKind::Mul, a, b)
    }

    /// Elementwise `a / b` with scalar broadcasting.
    pub fn div(&mut self, a: &NodeRef, b: &NodeRef) -> ShadegraphResult<NodeRef> {
        self.binary(OpKind::Div, a, b)
    }

    /// Elementwise remainder with scalar broadcasting; the result carries the
    /// divisor's sign.
    pub fn rem(&mut self, a: &NodeRef, b: &NodeRef) -> ShadegraphResult<NodeRef> {
        self.binary(OpKind::Rem, a, b)
    }

    /// Apply a registry builtin to `args`, checking arity and shapes.
    pub fn call(&mut self, builtin: Builtin, args: &[NodeRef]) -> ShadegraphResult<NodeRef> {
        let sig = registry::sig_of(builtin);
        if args.len() != sig.arity {
            return Err(ShadegraphError::validation(format!(
                "{}() expects {} arguments, got {}",
                sig.name,
                sig.arity,
                args.len()
            )));
        }
        let shapes: Vec<Shape> = args.iter().map(|a| a.shape()).collect();
        let shape = registry::result_shape(sig, &shapes).map_err(ShadegraphError::validation)?;
        Ok(self.intern(
            OpKind::Call(builtin),
            shape,
            args.iter().cloned().collect(),
        ))
    }

    /// Extract one component of a vector node.
    pub fn swizzle(&mut self, a: &NodeRef, component: Component) -> ShadegraphResult<NodeRef> {
        match a.shape() {
            Shape::Vector(w) if component.index() < w as usize => Ok(self.intern(
                OpKind::Swizzle(component),
                Shape::Scalar,
                smallvec![a.clone()],
            )),
            shape => Err(ShadegraphError::validation(format!(
                "component .{} is out of range for {shape}",
                component.name()
            ))),
        }
    }

    /// Construct a vector from 2..=4 scalar nodes.
    pub fn construct(&mut self, components: &[NodeRef]) -> ShadegraphResult<NodeRef> {
        let shape = match components.len() {
            2..=4 => Shape::Vector(components.len() as u8),
            n => {
                return Err(ShadegraphError::validation(format!(
                    "vector construction takes 2..=4 components, got {n}"
                )));
            }
        };
        if let Some(bad) = components.iter().find(|c| c.shape() != Shape::Scalar) {
            return Err(ShadegraphError::validation(format!(
                "vector components must be scalar, got {}",
                bad.shape()
            )));
        }
        Ok(self.intern(OpKind::Construct, shape, components.iter().cloned().collect()))
    }

    fn binary(&mut self, op: OpKind, a: &NodeRef, b: &NodeRef) -> ShadegraphResult<NodeRef> {
        let shape = registry::binary_result_shape(a.shape(), b.shape())
            .map_err(ShadegraphError::validation)?;
        Ok(self.intern(op, shape, smallvec![a.clone(), b.clone()]))
    }

    /// Look up or allocate the node for `op` over `args`.
    ///
    /// Shape compatibility is the caller's responsibility: the public
    /// constructors and the expression resolver both check before interning.
    pub(crate) fn intern(&mut self, op: OpKind, shape: Shape, args: Operands) -> NodeRef {
        let digest = digest_node(&op, &args);
        if let Some(existing) = self.cache.get(&digest) {
            trace!(node = existing.id().0, "graph cache hit");
            return existing.clone();
        }

        let node = Arc::new(Node {
            id: NodeId(self.next_node),
            shape,
            op,
            args,
            digest,
        });
        self.next_node += 1;
        self.cache.insert(digest, node.clone());
        node
    }
}
