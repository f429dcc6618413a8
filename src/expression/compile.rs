use crate::expression::lexer::lex;
use crate::expression::lower::lower;
use crate::expression::parser::parse;
use crate::expression::resolve::{Inputs, ResolveCtx, resolve};
use crate::expression::template::Template;
use crate::foundation::error::ShadegraphResult;
use crate::graph::builder::GraphBuilder;
use crate::graph::node::NodeRef;

/// Compile a composite expression into one graph node.
///
/// Runs the full pipeline — lex, parse, shape resolution, cached lowering —
/// and returns the node representing the expression's result, or the first
/// compile error with source-offset context. Lowering only starts once the
/// whole expression has resolved, so a failed compile adds nothing to the
/// graph.
pub fn compile_template(template: &Template, graph: &mut GraphBuilder) -> ShadegraphResult<NodeRef> {
    compile_inner(template, None, graph)
}

/// Like [`compile_template`], with named [`Inputs`] bindings for bare
/// identifiers (`time`, `index`, global tunables).
pub fn compile_template_with(
    template: &Template,
    inputs: &Inputs,
    graph: &mut GraphBuilder,
) -> ShadegraphResult<NodeRef> {
    compile_inner(template, Some(inputs), graph)
}

#[tracing::instrument(skip_all, fields(splices = template.splice_count()))]
fn compile_inner(
    template: &Template,
    inputs: Option<&Inputs>,
    graph: &mut GraphBuilder,
) -> ShadegraphResult<NodeRef> {
    let tokens = lex(template)?;
    let ast = parse(tokens)?;
    let typed = resolve(
        &ast,
        &ResolveCtx {
            splices: &template.splices,
            inputs,
        },
    )?;
    Ok(lower(&typed, graph))
}
