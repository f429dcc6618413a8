use std::collections::HashMap;

use rayon::prelude::*;

use crate::foundation::core::Value;
use crate::foundation::math;
use crate::graph::node::{Builtin, NodeId, NodeRef, OpKind};

/// Per-evaluation inputs that are not part of graph state.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext {
    /// Value of the per-element index leaf.
    pub index: f64,
}

/// CPU reference evaluator for compiled graphs.
///
/// Evaluation is total: shapes and arities were validated when the graph was
/// constructed, so a built graph cannot fail here. The memo table is reused
/// across calls for its allocation but cleared per call, so writes to mutable
/// cells between evaluations are always observed.
#[derive(Debug, Default)]
pub struct Evaluator {
    memo: HashMap<NodeId, Value>,
}

impl Evaluator {
    /// Create an evaluator with an empty memo table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `root`, sharing work across the DAG's reused subexpressions.
    pub fn eval(&mut self, root: &NodeRef, ctx: &EvalContext) -> Value {
        self.memo.clear();
        eval_node(root, ctx, &mut self.memo)
    }
}

/// Evaluate `root` for element indices `0..count` in parallel.
///
/// The per-frame render path evaluates on the GPU; this is the CPU fallback
/// and test path, sized for the demo's hundreds of thousands of elements.
pub fn eval_elements(root: &NodeRef, count: u32) -> Vec<Value> {
    (0..count)
        .into_par_iter()
        .map_init(Evaluator::new, |ev, i| {
            ev.eval(
                root,
                &EvalContext {
                    index: f64::from(i),
                },
            )
        })
        .collect()
}

fn eval_node(n: &NodeRef, ctx: &EvalContext, memo: &mut HashMap<NodeId, Value>) -> Value {
    if let Some(v) = memo.get(&n.id()) {
        return *v;
    }

    let shape = n.shape();
    let v = match n.op() {
        OpKind::Const(v) => Value::Scalar(*v),
        OpKind::Cell(cell) => cell.get(),
        OpKind::Index => Value::Scalar(ctx.index),

        OpKind::Neg => {
            let a = eval_node(&n.args()[0], ctx, memo);
            Value::from_lanes(shape, |k| -a.lane(k))
        }
        OpKind::Add => binary(n, ctx, memo, |a, b| a + b),
        OpKind::Sub => binary(n, ctx, memo, |a, b| a - b),
        OpKind::Mul => binary(n, ctx, memo, |a, b| a * b),
        OpKind::Div => binary(n, ctx, memo, |a, b| a / b),
        OpKind::Rem => binary(n, ctx, memo, math::wrap_rem),

        OpKind::Call(builtin) => call(*builtin, n, ctx, memo),

        OpKind::Swizzle(component) => {
            let a = eval_node(&n.args()[0], ctx, memo);
            Value::Scalar(a.lane(component.index()))
        }

        OpKind::Construct => {
            let lanes: Vec<f64> = n
                .args()
                .iter()
                .map(|a| eval_node(a, ctx, memo).lane(0))
                .collect();
            Value::from_lanes(shape, |k| lanes[k])
        }
    };

    memo.insert(n.id(), v);
    v
}

fn binary(
    n: &NodeRef,
    ctx: &EvalContext,
    memo: &mut HashMap<NodeId, Value>,
    f: impl Fn(f64, f64) -> f64,
) -> Value {
    let a = eval_node(&n.args()[0], ctx, memo);
    let b = eval_node(&n.args()[1], ctx, memo);
    Value::from_lanes(n.shape(), |k| f(a.lane(k), b.lane(k)))
}

fn call(builtin: Builtin, n: &NodeRef, ctx: &EvalContext, memo: &mut HashMap<NodeId, Value>) -> Value {
    let shape = n.shape();
    match builtin {
        Builtin::Sin => unary(n, ctx, memo, f64::sin),
        Builtin::Cos => unary(n, ctx, memo, f64::cos),
        Builtin::Sqrt => unary(n, ctx, memo, f64::sqrt),
        Builtin::Abs => unary(n, ctx, memo, f64::abs),
        Builtin::Floor => unary(n, ctx, memo, f64::floor),
        Builtin::Fract => unary(n, ctx, memo, math::fract),

        Builtin::Pow => binary(n, ctx, memo, f64::powf),

        Builtin::Clamp => {
            let x = eval_node(&n.args()[0], ctx, memo);
            let lo = eval_node(&n.args()[1], ctx, memo);
            let hi = eval_node(&n.args()[2], ctx, memo);
            Value::from_lanes(shape, |k| math::clamp(x.lane(k), lo.lane(k), hi.lane(k)))
        }
        Builtin::Smoothstep => {
            let e0 = eval_node(&n.args()[0], ctx, memo);
            let e1 = eval_node(&n.args()[1], ctx, memo);
            let x = eval_node(&n.args()[2], ctx, memo);
            Value::from_lanes(shape, |k| math::smoothstep(e0.lane(k), e1.lane(k), x.lane(k)))
        }
        Builtin::Mix => {
            let a = eval_node(&n.args()[0], ctx, memo);
            let b = eval_node(&n.args()[1], ctx, memo);
            let t = eval_node(&n.args()[2], ctx, memo);
            Value::from_lanes(shape, |k| math::lerp(a.lane(k), b.lane(k), t.lane(k)))
        }

        Builtin::Hash => {
            let x = eval_node(&n.args()[0], ctx, memo);
            Value::Scalar(math::hash11(x.lane(0)))
        }
        Builtin::Hash4 => {
            let x = eval_node(&n.args()[0], ctx, memo).lane(0);
            Value::Vec4(math::HASH_LANE_OFFSETS.map(|o| math::hash11(x + o)))
        }
    }
}

fn unary(
    n: &NodeRef,
    ctx: &EvalContext,
    memo: &mut HashMap<NodeId, Value>,
    f: impl Fn(f64) -> f64,
) -> Value {
    let a = eval_node(&n.args()[0], ctx, memo);
    Value::from_lanes(n.shape(), |k| f(a.lane(k)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::compile::compile_template;
    use crate::expression::template::Template;
    use crate::foundation::core::Value;
    use crate::graph::builder::GraphBuilder;

    fn eval_str(src: &str) -> Value {
        let mut g = GraphBuilder::new();
        let root = compile_template(&Template::new(src), &mut g).unwrap();
        Evaluator::new().eval(&root, &EvalContext::default())
    }

    #[test]
    fn arithmetic_matches_direct_evaluation() {
        assert_eq!(eval_str("1.0 + 2.0 * 3.0"), Value::Scalar(7.0));
        assert_eq!(eval_str("(1.0 + 2.0) * 3.0"), Value::Scalar(9.0));
        assert_eq!(eval_str("-2.0 * 3.0"), Value::Scalar(-6.0));
        assert_eq!(eval_str("7.0 / 2.0"), Value::Scalar(3.5));
    }

    #[test]
    fn remainder_takes_sign_of_divisor() {
        assert_eq!(eval_str("5.0 % 3.0"), Value::Scalar(2.0));
        assert_eq!(eval_str("-1.0 % 3.0"), Value::Scalar(2.0));
        assert_eq!(eval_str("(0.0 - 1.0) % 3.0"), Value::Scalar(2.0));
    }

    #[test]
    fn builtins_match_known_values() {
        assert_eq!(eval_str("clamp(5.0, 0.0, 1.0)"), Value::Scalar(1.0));
        assert_eq!(eval_str("mix(0.0, 10.0, 0.5)"), Value::Scalar(5.0));
        assert_eq!(eval_str("smoothstep(0.0, 1.0, 0.5)"), Value::Scalar(0.5));
        assert_eq!(eval_str("sin(0.0)"), Value::Scalar(0.0));
        assert_eq!(eval_str("abs(0.0 - 4.0)"), Value::Scalar(4.0));
        assert_eq!(eval_str("fract(1.0 / 0.5 + 0.25)"), Value::Scalar(0.25));
        assert_eq!(eval_str("pow(2.0, 10.0)"), Value::Scalar(1024.0));
        assert_eq!(eval_str("floor(2.75)"), Value::Scalar(2.0));
        assert_eq!(eval_str("sqrt(9.0)"), Value::Scalar(3.0));
    }

    #[test]
    fn vectors_broadcast_and_swizzle() {
        assert_eq!(
            eval_str("1.0 + vec3(10.0, 20.0, 30.0)"),
            Value::Vec3([11.0, 21.0, 31.0])
        );
        assert_eq!(eval_str("vec3(1.0, 2.0, 3.0).y"), Value::Scalar(2.0));
        assert_eq!(
            eval_str("vec2(1.0, 2.0) * vec2(3.0, 4.0)"),
            Value::Vec2([3.0, 8.0])
        );
    }

    #[test]
    fn index_leaf_reads_context() {
        let mut g = GraphBuilder::new();
        let idx = g.index();
        let t = Template::new("").splice(&idx, " * 2.0");
        let root = compile_template(&t, &mut g).unwrap();

        let mut ev = Evaluator::new();
        assert_eq!(ev.eval(&root, &EvalContext { index: 3.0 }), Value::Scalar(6.0));
        assert_eq!(ev.eval(&root, &EvalContext { index: 5.0 }), Value::Scalar(10.0));
    }

    #[test]
    fn batch_matches_single_eval() {
        let mut g = GraphBuilder::new();
        let idx = g.index();
        let t = Template::new("hash(").splice(&idx, ")");
        let root = compile_template(&t, &mut g).unwrap();

        let batch = eval_elements(&root, 64);
        let mut ev = Evaluator::new();
        for (i, v) in batch.iter().enumerate() {
            let single = ev.eval(
                &root,
                &EvalContext {
                    index: i as f64,
                },
            );
            assert_eq!(*v, single);
        }
    }

    #[test]
    fn hash4_lanes_are_decorrelated_and_in_range() {
        let mut g = GraphBuilder::new();
        let root = compile_template(&Template::new("hash4(12.5)"), &mut g).unwrap();
        let v = Evaluator::new().eval(&root, &EvalContext::default());
        let Value::Vec4(lanes) = v else {
            panic!("expected vec4, got {v:?}");
        };
        for l in lanes {
            assert!((0.0..1.0).contains(&l));
        }
        assert_ne!(lanes[0], lanes[1]);
    }
}
