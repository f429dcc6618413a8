use xxhash_rust::xxh3::Xxh3;

use crate::graph::node::{OpKind, Operands};

const XXH3_SEED: u64 = 0x5eed_c0de_d1a6_0517;

/// Stable 128-bit structural signature of a node.
///
/// Keyed on operation tag, literal payload, and operand identities; used by the
/// builder cache to guarantee at most one node per distinct subexpression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeDigest {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        self.write_bytes(&v.to_bits().to_le_bytes());
    }

    pub(crate) fn finish(self) -> NodeDigest {
        let v = self.inner.digest128();
        NodeDigest {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Structural signature of a prospective node, computed before allocation so
/// the builder can return a cached node instead.
pub(crate) fn digest_node(op: &OpKind, args: &Operands) -> NodeDigest {
    let mut h = StableHasher::new();

    match op {
        OpKind::Const(v) => {
            h.write_u8(0);
            h.write_f64(*v);
        }
        OpKind::Cell(cell) => {
            h.write_u8(1);
            h.write_u32(cell.id().0);
        }
        OpKind::Index => h.write_u8(2),
        OpKind::Neg => h.write_u8(3),
        OpKind::Add => h.write_u8(4),
        OpKind::Sub => h.write_u8(5),
        OpKind::Mul => h.write_u8(6),
        OpKind::Div => h.write_u8(7),
        OpKind::Rem => h.write_u8(8),
        OpKind::Call(builtin) => {
            h.write_u8(9);
            h.write_u8(*builtin as u8);
        }
        OpKind::Swizzle(component) => {
            h.write_u8(10);
            h.write_u8(component.index() as u8);
        }
        OpKind::Construct => h.write_u8(11),
    }

    h.write_u32(args.len() as u32);
    for a in args.iter() {
        h.write_u32(a.id().0);
    }

    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    #[test]
    fn payload_distinguishes_constants() {
        let none: Operands = SmallVec::new();
        let a = digest_node(&OpKind::Const(1.0), &none);
        let b = digest_node(&OpKind::Const(2.0), &none);
        let c = digest_node(&OpKind::Const(1.0), &none);
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn tag_distinguishes_ops() {
        let none: Operands = SmallVec::new();
        assert_ne!(
            digest_node(&OpKind::Index, &none),
            digest_node(&OpKind::Construct, &none)
        );
    }
}
