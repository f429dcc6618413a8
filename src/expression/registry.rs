use crate::foundation::core::Shape;
use crate::graph::node::Builtin;

/// Shape rule a registry entry applies to its (arity-checked) arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShapeRule {
    /// Elementwise over all arguments: shapes broadcast pairwise, the result is
    /// the widest operand shape.
    Elementwise,
    /// `mix(a, b, t)`: `a` and `b` share one shape, `t` is scalar or that shape;
    /// the result is `a`'s shape.
    Blend,
    /// Scalar arguments only, fixed result shape (the hash spreaders).
    ScalarIn(Shape),
}

/// One row of the closed function table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FnSig {
    pub(crate) name: &'static str,
    pub(crate) builtin: Builtin,
    pub(crate) arity: usize,
    pub(crate) rule: ShapeRule,
}

/// The full function registry. Extending the language means adding a row here
/// (plus the matching evaluator arm); no other component changes.
pub(crate) const REGISTRY: &[FnSig] = &[
    FnSig {
        name: "sin",
        builtin: Builtin::Sin,
        arity: 1,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "cos",
        builtin: Builtin::Cos,
        arity: 1,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "sqrt",
        builtin: Builtin::Sqrt,
        arity: 1,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "abs",
        builtin: Builtin::Abs,
        arity: 1,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "floor",
        builtin: Builtin::Floor,
        arity: 1,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "fract",
        builtin: Builtin::Fract,
        arity: 1,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "pow",
        builtin: Builtin::Pow,
        arity: 2,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "clamp",
        builtin: Builtin::Clamp,
        arity: 3,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "smoothstep",
        builtin: Builtin::Smoothstep,
        arity: 3,
        rule: ShapeRule::Elementwise,
    },
    FnSig {
        name: "mix",
        builtin: Builtin::Mix,
        arity: 3,
        rule: ShapeRule::Blend,
    },
    FnSig {
        name: "hash",
        builtin: Builtin::Hash,
        arity: 1,
        rule: ShapeRule::ScalarIn(Shape::Scalar),
    },
    FnSig {
        name: "hash4",
        builtin: Builtin::Hash4,
        arity: 1,
        rule: ShapeRule::ScalarIn(Shape::Vector(4)),
    },
];

pub(crate) fn lookup(name: &str) -> Option<&'static FnSig> {
    REGISTRY.iter().find(|sig| sig.name == name)
}

/// Signature of a builtin, for graph-level callers that skip name lookup.
pub(crate) fn sig_of(builtin: Builtin) -> &'static FnSig {
    match REGISTRY.iter().find(|sig| sig.builtin == builtin) {
        Some(sig) => sig,
        // Builtin is a closed enum and the table covers it; pinned by test.
        None => unreachable!("builtin {builtin:?} has no registry row"),
    }
}

/// Named constants resolvable as bare identifiers.
pub(crate) fn constant(name: &str) -> Option<f64> {
    match name {
        "PI" => Some(std::f64::consts::PI),
        _ => None,
    }
}

/// Result shape for `sig` applied to `args`. Arity is the caller's problem;
/// a shape violation comes back as a plain message for the caller to wrap
/// with offset context.
pub(crate) fn result_shape(sig: &FnSig, args: &[Shape]) -> Result<Shape, String> {
    match sig.rule {
        ShapeRule::Elementwise => {
            let mut out = Shape::Scalar;
            for &arg in args {
                out = Shape::broadcast(out, arg).ok_or_else(|| {
                    format!(
                        "{}() arguments must share one vector width, got {} vs {}",
                        sig.name, out, arg
                    )
                })?;
            }
            Ok(out)
        }
        ShapeRule::Blend => {
            let (a, b, t) = (args[0], args[1], args[2]);
            if a != b {
                return Err(format!("mix() endpoints must share a shape, got {a} vs {b}"));
            }
            if t != Shape::Scalar && t != a {
                return Err(format!(
                    "mix() factor must be scalar or match the endpoints, got {t}"
                ));
            }
            Ok(a)
        }
        ShapeRule::ScalarIn(out) => {
            for &arg in args {
                if arg != Shape::Scalar {
                    return Err(format!("{}() arguments must be scalar, got {arg}", sig.name));
                }
            }
            Ok(out)
        }
    }
}

/// Result shape of a binary arithmetic operator.
pub(crate) fn binary_result_shape(a: Shape, b: Shape) -> Result<Shape, String> {
    Shape::broadcast(a, b)
        .ok_or_else(|| format!("operands must share one vector width, got {a} vs {b}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_unique() {
        for (i, a) in REGISTRY.iter().enumerate() {
            for b in &REGISTRY[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn elementwise_broadcasts() {
        let sig = lookup("clamp").unwrap();
        assert_eq!(
            result_shape(sig, &[Shape::Vector(3), Shape::Scalar, Shape::Scalar]),
            Ok(Shape::Vector(3))
        );
        assert!(result_shape(sig, &[Shape::Vector(3), Shape::Vector(2), Shape::Scalar]).is_err());
    }

    #[test]
    fn mix_requires_matching_endpoints() {
        let sig = lookup("mix").unwrap();
        assert_eq!(
            result_shape(sig, &[Shape::Vector(3), Shape::Vector(3), Shape::Scalar]),
            Ok(Shape::Vector(3))
        );
        assert!(result_shape(sig, &[Shape::Vector(3), Shape::Scalar, Shape::Scalar]).is_err());
        assert!(
            result_shape(sig, &[Shape::Vector(3), Shape::Vector(3), Shape::Vector(2)]).is_err()
        );
    }

    #[test]
    fn hash4_spreads_to_vec4() {
        let sig = lookup("hash4").unwrap();
        assert_eq!(result_shape(sig, &[Shape::Scalar]), Ok(Shape::Vector(4)));
        assert!(result_shape(sig, &[Shape::Vector(2)]).is_err());
    }

    #[test]
    fn every_builtin_has_a_row() {
        use Builtin::*;
        for b in [
            Sin, Cos, Sqrt, Abs, Floor, Fract, Pow, Clamp, Smoothstep, Mix, Hash, Hash4,
        ] {
            assert_eq!(sig_of(b).builtin, b);
        }
    }

    #[test]
    fn pi_resolves() {
        assert_eq!(constant("PI"), Some(std::f64::consts::PI));
        assert_eq!(constant("TAU"), None);
    }
}
