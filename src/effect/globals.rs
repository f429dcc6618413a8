use std::collections::BTreeMap;

use crate::expression::resolve::Inputs;
use crate::foundation::core::Value;
use crate::foundation::error::{ShadegraphError, ShadegraphResult};
use crate::graph::builder::GraphBuilder;
use crate::graph::cell::Cell;
use crate::graph::node::NodeRef;

/// Identifiers that are always bound and cannot be redefined as globals.
const RESERVED: &[&str] = &["time", "index", "PI"];

/// Shared live inputs injected into effect compilation.
///
/// Holds the built-in `time` cell, the per-element `index` leaf, and any named
/// tunable cells (an audio-derived scale, a global size multiplier). Globals
/// are passed explicitly into each compile call — never ambient module state —
/// so unrelated effects share a cell only when handed the same `Globals` (or
/// the same [`Cell`] handle).
#[derive(Debug, Clone)]
pub struct Globals {
    time: Cell,
    time_node: NodeRef,
    index_node: NodeRef,
    cells: BTreeMap<String, (Cell, NodeRef)>,
}

impl Globals {
    /// Create the standard global set: `time` starting at zero plus the
    /// per-element `index`.
    pub fn new(graph: &mut GraphBuilder) -> Self {
        let time = graph.cell(Value::Scalar(0.0));
        let time_node = graph.cell_node(&time);
        let index_node = graph.index();
        Self {
            time,
            time_node,
            index_node,
            cells: BTreeMap::new(),
        }
    }

    /// The live time cell, written once per frame by the render loop.
    pub fn time(&self) -> &Cell {
        &self.time
    }

    /// The graph node reading the time cell.
    pub fn time_node(&self) -> &NodeRef {
        &self.time_node
    }

    /// The per-element index node.
    pub fn index_node(&self) -> &NodeRef {
        &self.index_node
    }

    /// Define a named tunable cell initialized to `initial`.
    ///
    /// The name becomes a bare identifier in effect expressions. Reserved
    /// names and duplicates are rejected.
    pub fn define(
        &mut self,
        graph: &mut GraphBuilder,
        name: &str,
        initial: Value,
    ) -> ShadegraphResult<Cell> {
        if RESERVED.contains(&name) {
            return Err(ShadegraphError::validation(format!(
                "\"{name}\" is a reserved input name"
            )));
        }
        if self.cells.contains_key(name) {
            return Err(ShadegraphError::validation(format!(
                "global \"{name}\" is already defined"
            )));
        }
        let cell = graph.cell(initial);
        let node = graph.cell_node(&cell);
        self.cells.insert(name.to_owned(), (cell.clone(), node));
        Ok(cell)
    }

    /// Look up a named tunable cell.
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name).map(|(cell, _)| cell)
    }

    /// The identifier binding table for expression compilation.
    pub fn inputs(&self) -> Inputs {
        let mut inputs = Inputs::new()
            .with("time", self.time_node.clone())
            .with("index", self.index_node.clone());
        for (name, (_, node)) in &self.cells {
            inputs.bind(name.clone(), node.clone());
        }
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_and_duplicate_names_are_rejected() {
        let mut g = GraphBuilder::new();
        let mut globals = Globals::new(&mut g);

        assert!(globals.define(&mut g, "time", Value::Scalar(0.0)).is_err());
        assert!(globals.define(&mut g, "PI", Value::Scalar(0.0)).is_err());

        globals.define(&mut g, "gain", Value::Scalar(1.0)).unwrap();
        assert!(globals.define(&mut g, "gain", Value::Scalar(2.0)).is_err());
    }

    #[test]
    fn inputs_expose_time_index_and_tunables() {
        let mut g = GraphBuilder::new();
        let mut globals = Globals::new(&mut g);
        globals
            .define(&mut g, "aniso", Value::Vec3([0.01, 0.01, 0.01]))
            .unwrap();

        let inputs = globals.inputs();
        assert!(inputs.get("time").is_some());
        assert!(inputs.get("index").is_some());
        assert!(inputs.get("aniso").is_some());
        assert!(inputs.get("gain").is_none());
    }

    #[test]
    fn tunable_writes_flow_through_the_shared_cell() {
        let mut g = GraphBuilder::new();
        let mut globals = Globals::new(&mut g);
        let gain = globals.define(&mut g, "gain", Value::Scalar(1.0)).unwrap();

        gain.set_scalar(0.25).unwrap();
        assert_eq!(globals.cell("gain").unwrap().get(), Value::Scalar(0.25));
    }
}
