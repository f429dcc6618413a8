use std::collections::BTreeMap;

use crate::effect::globals::Globals;
use crate::effect::outputs::EffectOutputs;
use crate::expression::compile::compile_template_with;
use crate::expression::template::Template;
use crate::foundation::core::Value;
use crate::foundation::error::{ShadegraphError, ShadegraphResult};
use crate::graph::builder::GraphBuilder;

/// Declarative effect definition: four output expressions plus named global
/// declarations, loadable from JSON.
///
/// Expressions reference `time`, `index`, declared globals, and `PI` as bare
/// identifiers; everything else comes from the fixed function registry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EffectDef {
    /// Effect name, used for diagnostics only.
    pub name: String,
    /// `vec3` position expression.
    pub position: String,
    /// `vec3` color expression.
    pub color: String,
    /// Scalar opacity expression.
    pub opacity: String,
    /// `vec3` anisotropic scale expression.
    pub scale: String,
    /// Named tunable cells and their initial values.
    #[serde(default)]
    pub globals: BTreeMap<String, GlobalDef>,
}

/// Initial value of a declared global: a scalar or a short vector.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum GlobalDef {
    /// Scalar cell.
    Scalar(f64),
    /// Vector cell of 2..=4 lanes.
    Vector(Vec<f64>),
}

impl GlobalDef {
    fn initial(&self) -> ShadegraphResult<Value> {
        match self {
            Self::Scalar(v) => Ok(Value::Scalar(*v)),
            Self::Vector(lanes) => {
                if lanes.len() == 1 {
                    return Err(ShadegraphError::validation(
                        "vector global must have 2..=4 lanes; write a plain number for scalars",
                    ));
                }
                Value::from_slice(lanes)
            }
        }
    }
}

/// A fully compiled effect: the output record plus its live inputs.
#[derive(Debug, Clone)]
pub struct CompiledEffect {
    /// Effect name from the definition.
    pub name: String,
    /// The four per-element output nodes.
    pub outputs: EffectOutputs,
    /// The globals feeding this effect (time plus declared tunables).
    pub globals: Globals,
}

impl EffectDef {
    /// Parse a definition from JSON.
    pub fn from_json(json: &str) -> ShadegraphResult<Self> {
        serde_json::from_str(json).map_err(|e| ShadegraphError::serde(e.to_string()))
    }

    /// Compile all four outputs into `graph`, creating this effect's globals.
    pub fn compile(&self, graph: &mut GraphBuilder) -> ShadegraphResult<CompiledEffect> {
        let mut globals = Globals::new(graph);
        for (name, def) in &self.globals {
            globals.define(graph, name, def.initial()?)?;
        }
        self.compile_with(graph, globals)
    }

    /// Compile against pre-built globals, so several effects can share cells.
    ///
    /// Declared globals must already exist in `globals` (or be definable
    /// without conflict); missing ones are created here.
    pub fn compile_with(
        &self,
        graph: &mut GraphBuilder,
        mut globals: Globals,
    ) -> ShadegraphResult<CompiledEffect> {
        for (name, def) in &self.globals {
            if globals.cell(name).is_none() {
                globals.define(graph, name, def.initial()?)?;
            }
        }

        let inputs = globals.inputs();
        let position = compile_template_with(&Template::new(&*self.position), &inputs, graph)?;
        let color = compile_template_with(&Template::new(&*self.color), &inputs, graph)?;
        let opacity = compile_template_with(&Template::new(&*self.opacity), &inputs, graph)?;
        let scale = compile_template_with(&Template::new(&*self.scale), &inputs, graph)?;

        let outputs = EffectOutputs::new(position, color, opacity, scale)?;
        Ok(CompiledEffect {
            name: self.name.clone(),
            outputs,
            globals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluator::{EvalContext, Evaluator};
    use crate::foundation::core::Value;

    fn minimal_def() -> EffectDef {
        EffectDef::from_json(
            r#"{
                "name": "pulse",
                "position": "vec3(0.0, 0.0, 0.0)",
                "color": "vec3(1.0, 1.0, 1.0)",
                "opacity": "clamp(gain, 0.0, 1.0)",
                "scale": "aniso * gain",
                "globals": { "gain": 1.0, "aniso": [0.01, 0.01, 0.01] }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn json_round_trips_and_compiles() {
        let def = minimal_def();
        assert_eq!(def.name, "pulse");

        let mut g = GraphBuilder::new();
        let effect = def.compile(&mut g).unwrap();

        let mut ev = Evaluator::new();
        let opacity = ev.eval(&effect.outputs.opacity, &EvalContext::default());
        assert_eq!(opacity, Value::Scalar(1.0));

        let scale = ev.eval(&effect.outputs.scale, &EvalContext::default());
        assert_eq!(scale, Value::Vec3([0.01, 0.01, 0.01]));
    }

    #[test]
    fn global_writes_change_dependent_outputs_only() {
        let def = minimal_def();
        let mut g = GraphBuilder::new();
        let effect = def.compile(&mut g).unwrap();

        let mut ev = Evaluator::new();
        let color_before = ev.eval(&effect.outputs.color, &EvalContext::default());

        effect
            .globals
            .cell("gain")
            .unwrap()
            .set_scalar(0.5)
            .unwrap();

        assert_eq!(
            ev.eval(&effect.outputs.opacity, &EvalContext::default()),
            Value::Scalar(0.5)
        );
        assert_eq!(
            ev.eval(&effect.outputs.scale, &EvalContext::default()),
            Value::Vec3([0.005, 0.005, 0.005])
        );
        // Independent outputs are untouched.
        assert_eq!(
            ev.eval(&effect.outputs.color, &EvalContext::default()),
            color_before
        );
    }

    #[test]
    fn bad_output_shapes_are_rejected() {
        let mut def = minimal_def();
        def.opacity = "vec2(1.0, 1.0)".to_owned();
        let mut g = GraphBuilder::new();
        assert!(def.compile(&mut g).is_err());
    }

    #[test]
    fn malformed_json_is_a_serde_error() {
        let err = EffectDef::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ShadegraphError::Serde(_)));
    }
}
