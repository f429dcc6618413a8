use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::{Component, Shape};
use crate::graph::cell::Cell;
use crate::graph::signature::NodeDigest;

/// Stable identity of a graph node within its builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Shared reference to a compiled computation node.
///
/// Nodes are referenced, never owned exclusively: the compiled output is a DAG,
/// and any node may appear as an operand of many parents.
pub type NodeRef = Arc<Node>;

pub(crate) type Operands = SmallVec<[NodeRef; 3]>;

/// Builtin functions the registry can lower calls to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `sin(x)`.
    Sin,
    /// `cos(x)`.
    Cos,
    /// `sqrt(x)`.
    Sqrt,
    /// `abs(x)`.
    Abs,
    /// `floor(x)`.
    Floor,
    /// `fract(x)`, as `x - floor(x)`.
    Fract,
    /// `pow(base, exponent)`.
    Pow,
    /// `clamp(x, lo, hi)`.
    Clamp,
    /// `smoothstep(edge0, edge1, x)`.
    Smoothstep,
    /// `mix(a, b, t)` linear blend.
    Mix,
    /// `hash(x)`: deterministic scalar hash in `[0, 1)`.
    Hash,
    /// `hash4(x)`: four decorrelated hashes of one scalar.
    Hash4,
}

/// Operation performed by a node over its operands.
#[derive(Clone, Debug)]
pub enum OpKind {
    /// Literal scalar constant.
    Const(f64),
    /// Mutable external input; the only node kind whose value can change after
    /// compilation.
    Cell(Cell),
    /// The per-element index supplied at evaluation time.
    Index,
    /// Unary negation.
    Neg,
    /// Elementwise addition.
    Add,
    /// Elementwise subtraction.
    Sub,
    /// Elementwise multiplication.
    Mul,
    /// Elementwise division.
    Div,
    /// Elementwise remainder; the result carries the divisor's sign.
    Rem,
    /// Registry function application.
    Call(Builtin),
    /// Extraction of one vector component.
    Swizzle(Component),
    /// Vector construction from scalar operands.
    Construct,
}

/// One operation in a compiled computation graph.
///
/// Immutable for its lifetime; only the value behind a [`OpKind::Cell`] leaf
/// ever changes after construction.
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) shape: Shape,
    pub(crate) op: OpKind,
    pub(crate) args: Operands,
    pub(crate) digest: NodeDigest,
}

impl Node {
    /// Stable identity within the owning builder.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Value shape this node produces.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// The operation tag.
    pub fn op(&self) -> &OpKind {
        &self.op
    }

    /// Ordered operand references.
    pub fn args(&self) -> &[NodeRef] {
        &self.args
    }

    /// Stable structural signature: operation tag + payload + operand ids.
    ///
    /// Two nodes from one builder have equal digests iff they were deduplicated
    /// into the same node.
    pub fn digest(&self) -> NodeDigest {
        self.digest
    }
}
