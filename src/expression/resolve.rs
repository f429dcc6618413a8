use std::collections::BTreeMap;

use crate::expression::ast::{BinaryOp, Expr, ExprKind, UnaryOp};
use crate::expression::error::CompileError;
use crate::expression::lexer::Span;
use crate::expression::registry::{self, FnSig};
use crate::expression::template::Splice;
use crate::foundation::core::{Component, Shape};
use crate::graph::node::NodeRef;

/// Named graph inputs an expression may reference as bare identifiers.
///
/// Bindings are explicitly injected per compile call (`time`, `index`, global
/// tunables); named constants such as `PI` resolve first and cannot be
/// shadowed.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    map: BTreeMap<String, NodeRef>,
}

impl Inputs {
    /// Create an empty binding table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to a graph node, replacing any previous binding.
    pub fn bind(&mut self, name: impl Into<String>, node: NodeRef) {
        self.map.insert(name.into(), node);
    }

    /// Chained form of [`Inputs::bind`].
    pub fn with(mut self, name: impl Into<String>, node: NodeRef) -> Self {
        self.bind(name, node);
        self
    }

    /// Look up a bound node.
    pub fn get(&self, name: &str) -> Option<&NodeRef> {
        self.map.get(name)
    }
}

/// Shape-annotated expression tree, ready for lowering.
#[derive(Debug, Clone)]
pub(crate) struct Typed {
    pub(crate) shape: Shape,
    pub(crate) span: Span,
    pub(crate) kind: TypedKind,
}

#[derive(Debug, Clone)]
pub(crate) enum TypedKind {
    Const(f64),
    /// An existing node: a placeholder splice or a bound identifier.
    Node(NodeRef),
    /// A spliced number array, lowered to a construction of constants.
    Values(Vec<f64>),
    Unary {
        op: UnaryOp,
        expr: Box<Typed>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Typed>,
        right: Box<Typed>,
    },
    Call {
        sig: &'static FnSig,
        args: Vec<Typed>,
    },
    Member {
        object: Box<Typed>,
        component: Component,
    },
    Vector {
        components: Vec<Typed>,
    },
}

pub(crate) struct ResolveCtx<'a> {
    pub(crate) splices: &'a [Splice],
    pub(crate) inputs: Option<&'a Inputs>,
}

/// Assign shapes bottom-up and validate operator/function use.
pub(crate) fn resolve(e: &Expr, ctx: &ResolveCtx<'_>) -> Result<Typed, CompileError> {
    let span = e.span;
    match &e.kind {
        ExprKind::Number(v) => Ok(Typed {
            shape: Shape::Scalar,
            span,
            kind: TypedKind::Const(*v),
        }),

        ExprKind::Ident(name) => {
            if let Some(v) = registry::constant(name) {
                return Ok(Typed {
                    shape: Shape::Scalar,
                    span,
                    kind: TypedKind::Const(v),
                });
            }
            if let Some(node) = ctx.inputs.and_then(|inputs| inputs.get(name)) {
                return Ok(Typed {
                    shape: node.shape(),
                    span,
                    kind: TypedKind::Node(node.clone()),
                });
            }
            Err(CompileError::unknown_identifier(
                span.start,
                format!("\"{name}\" is neither a named constant nor a bound input"),
            ))
        }

        ExprKind::Placeholder(i) => {
            // The lexer only emits indices that exist in the splice sequence.
            let splice = &ctx.splices[*i as usize];
            match splice {
                Splice::Number(v) => Ok(Typed {
                    shape: Shape::Scalar,
                    span,
                    kind: TypedKind::Const(*v),
                }),
                Splice::Node(node) => Ok(Typed {
                    shape: node.shape(),
                    span,
                    kind: TypedKind::Node(node.clone()),
                }),
                Splice::Array(values) => {
                    let shape = match values.len() {
                        2..=4 => Shape::Vector(values.len() as u8),
                        n => {
                            return Err(CompileError::shape(
                                span.start,
                                format!("interpolated array must have 2..=4 elements, got {n}"),
                            ));
                        }
                    };
                    Ok(Typed {
                        shape,
                        span,
                        kind: TypedKind::Values(values.clone()),
                    })
                }
            }
        }

        ExprKind::Unary { op, expr } => {
            let inner = resolve(expr, ctx)?;
            Ok(Typed {
                shape: inner.shape,
                span,
                kind: TypedKind::Unary {
                    op: *op,
                    expr: Box::new(inner),
                },
            })
        }

        ExprKind::Binary { op, left, right } => {
            let l = resolve(left, ctx)?;
            let r = resolve(right, ctx)?;
            let shape = registry::binary_result_shape(l.shape, r.shape)
                .map_err(|msg| CompileError::shape(span.start, msg))?;
            Ok(Typed {
                shape,
                span,
                kind: TypedKind::Binary {
                    op: *op,
                    left: Box::new(l),
                    right: Box::new(r),
                },
            })
        }

        ExprKind::Call { func, args } => {
            let Some(sig) = registry::lookup(func) else {
                return Err(CompileError::unknown_function(
                    span.start,
                    format!("\"{func}\" is not in the function registry"),
                ));
            };
            if args.len() != sig.arity {
                return Err(CompileError::arity(
                    span.start,
                    format!(
                        "{}() expects {} arguments, got {}",
                        sig.name,
                        sig.arity,
                        args.len()
                    ),
                ));
            }
            let mut typed_args = Vec::with_capacity(args.len());
            for a in args {
                typed_args.push(resolve(a, ctx)?);
            }
            let shapes: Vec<Shape> = typed_args.iter().map(|a| a.shape).collect();
            let shape = registry::result_shape(sig, &shapes)
                .map_err(|msg| CompileError::shape(span.start, msg))?;
            Ok(Typed {
                shape,
                span,
                kind: TypedKind::Call {
                    sig,
                    args: typed_args,
                },
            })
        }

        ExprKind::Member { object, component } => {
            let obj = resolve(object, ctx)?;
            match obj.shape {
                Shape::Vector(w) if component.index() < w as usize => Ok(Typed {
                    shape: Shape::Scalar,
                    span,
                    kind: TypedKind::Member {
                        object: Box::new(obj),
                        component: *component,
                    },
                }),
                Shape::Vector(w) => Err(CompileError::swizzle(
                    span.start,
                    format!("component .{} is out of range for vec{w}", component.name()),
                )),
                Shape::Scalar => Err(CompileError::swizzle(
                    span.start,
                    format!("cannot access .{} on a scalar", component.name()),
                )),
            }
        }

        ExprKind::Vector { width, components } => {
            if components.len() != *width as usize {
                return Err(CompileError::arity(
                    span.start,
                    format!(
                        "vec{width}() expects {width} components, got {}",
                        components.len()
                    ),
                ));
            }
            let mut typed = Vec::with_capacity(components.len());
            for c in components {
                let t = resolve(c, ctx)?;
                if t.shape != Shape::Scalar {
                    return Err(CompileError::shape(
                        t.span.start,
                        format!("vector components must be scalar, got {}", t.shape),
                    ));
                }
                typed.push(t);
            }
            Ok(Typed {
                shape: Shape::Vector(*width),
                span,
                kind: TypedKind::Vector { components: typed },
            })
        }
    }
}
