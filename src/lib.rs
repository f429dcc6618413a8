//! Shadegraph compiles arithmetic expressions into typed, deduplicated
//! computation graphs for per-element GPU effects.
//!
//! An effect author writes ordinary-looking arithmetic mixing literal syntax
//! with live values — `sin(z * 0.5 + t * 0.2) * 0.4` — as a [`Template`] of
//! text fragments and interpolated [`Splice`] values. Compilation runs once at
//! effect-setup time and produces a [`NodeRef`] into a shared DAG:
//!
//! - shapes (scalar, vec2/3/4) are inferred and checked up front, so a built
//!   graph cannot fail during evaluation;
//! - structurally identical subexpressions are deduplicated through the
//!   [`GraphBuilder`]'s signature cache;
//! - live inputs (time, audio-derived tunables) are mutable [`Cell`] leaves
//!   updated per frame without touching graph structure.
//!
//! The GPU shader emitter and render loop are external consumers of the
//! finished graph; the crate ships a CPU reference [`Evaluator`] used by tests
//! and demos.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod effect;
mod eval;
mod expression;
mod foundation;
mod graph;

pub use crate::foundation::core::{Component, Shape, Value};
pub use crate::foundation::error::{ShadegraphError, ShadegraphResult};

pub use crate::expression::compile::{compile_template, compile_template_with};
pub use crate::expression::error::{CompileError, CompileErrorKind};
pub use crate::expression::resolve::Inputs;
pub use crate::expression::template::{Splice, Template};

pub use crate::graph::builder::GraphBuilder;
pub use crate::graph::cell::{Cell, CellId};
pub use crate::graph::node::{Builtin, Node, NodeId, NodeRef, OpKind};
pub use crate::graph::signature::NodeDigest;

pub use crate::eval::evaluator::{EvalContext, Evaluator, eval_elements};

pub use crate::effect::def::{CompiledEffect, EffectDef, GlobalDef};
pub use crate::effect::globals::Globals;
pub use crate::effect::outputs::EffectOutputs;
