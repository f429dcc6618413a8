use std::fs;

use shadegraph::{EffectDef, EvalContext, Evaluator, GraphBuilder, Shape, Value};

fn load(name: &str) -> EffectDef {
    let json = fs::read_to_string(format!("tests/data/effects/{name}.json")).unwrap();
    EffectDef::from_json(&json).unwrap()
}

#[test]
fn load_and_compile_all_fixtures() {
    for entry in fs::read_dir("tests/data/effects").unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let def = EffectDef::from_json(&fs::read_to_string(&path).unwrap()).unwrap();

        let mut g = GraphBuilder::new();
        let effect = def.compile(&mut g).unwrap();

        // Output shapes are the fixed effect contract.
        assert_eq!(effect.outputs.position.shape(), Shape::Vector(3));
        assert_eq!(effect.outputs.color.shape(), Shape::Vector(3));
        assert_eq!(effect.outputs.opacity.shape(), Shape::Scalar);
        assert_eq!(effect.outputs.scale.shape(), Shape::Vector(3));

        // Every output evaluates to a finite value for a few elements.
        let mut ev = Evaluator::new();
        for index in [0.0, 1.0, 17.0] {
            let ctx = EvalContext { index };
            for node in [
                &effect.outputs.position,
                &effect.outputs.color,
                &effect.outputs.opacity,
                &effect.outputs.scale,
            ] {
                let v = ev.eval(node, &ctx);
                for k in 0..v.shape().lanes() {
                    assert!(v.lane(k).is_finite(), "{path:?} produced {v:?}");
                }
            }
        }
    }
}

#[test]
fn repeated_hash_terms_collapse_in_the_cache() {
    let def = load("starriver");
    let mut g = GraphBuilder::new();
    let effect = def.compile(&mut g).unwrap();

    // `hash4(index)` is written many times across position/opacity/scale but
    // lowers to a single node.
    let mut seen = std::collections::BTreeSet::new();
    let mut hash4_nodes = std::collections::BTreeSet::new();
    let mut stack: Vec<shadegraph::NodeRef> = vec![
        effect.outputs.position.clone(),
        effect.outputs.color.clone(),
        effect.outputs.opacity.clone(),
        effect.outputs.scale.clone(),
    ];
    while let Some(n) = stack.pop() {
        if !seen.insert(n.id()) {
            continue;
        }
        if matches!(n.op(), shadegraph::OpKind::Call(shadegraph::Builtin::Hash4)) {
            hash4_nodes.insert(n.id());
        }
        stack.extend(n.args().iter().cloned());
    }
    assert_eq!(hash4_nodes.len(), 1);

    // Recompiling the same definition reuses every cell-independent subgraph:
    // opacity and color come back as the very same nodes, while cell-backed
    // outputs get fresh leaves.
    let again = def.compile(&mut g).unwrap();
    assert!(std::sync::Arc::ptr_eq(
        &effect.outputs.opacity,
        &again.outputs.opacity
    ));
    assert!(std::sync::Arc::ptr_eq(
        &effect.outputs.color,
        &again.outputs.color
    ));
    assert!(!std::sync::Arc::ptr_eq(
        &effect.outputs.scale,
        &again.outputs.scale
    ));
}

#[test]
fn time_drives_position_but_not_color() {
    let def = load("starriver");
    let mut g = GraphBuilder::new();
    let effect = def.compile(&mut g).unwrap();

    let ctx = EvalContext { index: 3.0 };
    let mut ev = Evaluator::new();

    let p0 = ev.eval(&effect.outputs.position, &ctx);
    let c0 = ev.eval(&effect.outputs.color, &ctx);

    effect.globals.time().set_scalar(5.0).unwrap();

    assert_ne!(ev.eval(&effect.outputs.position, &ctx), p0);
    assert_eq!(ev.eval(&effect.outputs.color, &ctx), c0);
}

#[test]
fn audio_level_modulates_pulse_outputs() {
    let def = load("pulse");
    let mut g = GraphBuilder::new();
    let effect = def.compile(&mut g).unwrap();

    let ctx = EvalContext { index: 0.0 };
    let mut ev = Evaluator::new();

    assert_eq!(ev.eval(&effect.outputs.opacity, &ctx), Value::Scalar(0.0));

    // The render loop writes the sampled spectrum bin once per frame.
    effect.globals.cell("level").unwrap().set_scalar(1.0).unwrap();

    assert_eq!(ev.eval(&effect.outputs.opacity, &ctx), Value::Scalar(1.0));
    assert_eq!(
        ev.eval(&effect.outputs.color, &ctx),
        Value::Vec3([1.0, 0.5, 0.125])
    );
}
