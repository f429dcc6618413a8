use smallvec::smallvec;

use crate::expression::ast::{BinaryOp, UnaryOp};
use crate::expression::resolve::{Typed, TypedKind};
use crate::graph::builder::GraphBuilder;
use crate::graph::node::{NodeRef, OpKind, Operands};

/// Lower a resolved expression into graph nodes, bottom-up.
///
/// Every node goes through the builder's structural cache, so repeated
/// subexpressions collapse onto existing nodes. Infallible: shape and arity
/// were fully validated during resolution.
pub(crate) fn lower(t: &Typed, g: &mut GraphBuilder) -> NodeRef {
    match &t.kind {
        TypedKind::Const(v) => g.constant(*v),

        TypedKind::Node(node) => node.clone(),

        TypedKind::Values(values) => {
            let args: Operands = values.iter().map(|&v| g.constant(v)).collect();
            g.intern(OpKind::Construct, t.shape, args)
        }

        TypedKind::Unary { op, expr } => {
            let a = lower(expr, g);
            let op = match op {
                UnaryOp::Neg => OpKind::Neg,
            };
            g.intern(op, t.shape, smallvec![a])
        }

        TypedKind::Binary { op, left, right } => {
            let l = lower(left, g);
            let r = lower(right, g);
            let op = match op {
                BinaryOp::Add => OpKind::Add,
                BinaryOp::Sub => OpKind::Sub,
                BinaryOp::Mul => OpKind::Mul,
                BinaryOp::Div => OpKind::Div,
                BinaryOp::Rem => OpKind::Rem,
            };
            g.intern(op, t.shape, smallvec![l, r])
        }

        TypedKind::Call { sig, args } => {
            let lowered: Operands = args.iter().map(|a| lower(a, g)).collect();
            g.intern(OpKind::Call(sig.builtin), t.shape, lowered)
        }

        TypedKind::Member { object, component } => {
            let obj = lower(object, g);
            g.intern(OpKind::Swizzle(*component), t.shape, smallvec![obj])
        }

        TypedKind::Vector { components } => {
            let lowered: Operands = components.iter().map(|c| lower(c, g)).collect();
            g.intern(OpKind::Construct, t.shape, lowered)
        }
    }
}
