//! Declarative effect loaded from JSON, with a simulated audio level driving
//! its tunable cell once per frame.

use shadegraph::{EffectDef, EvalContext, Evaluator, GraphBuilder};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let def = EffectDef::from_json(include_str!("../tests/data/effects/pulse.json"))?;

    let mut g = GraphBuilder::new();
    let effect = def.compile(&mut g)?;
    println!("compiled \"{}\": {} distinct nodes", effect.name, g.node_count());

    let level = effect
        .globals
        .cell("level")
        .ok_or_else(|| anyhow::anyhow!("pulse.json must declare a \"level\" global"))?;

    let mut ev = Evaluator::new();
    for frame in 0..8 {
        let seconds = frame as f64 / 60.0;
        effect.globals.time().set_scalar(seconds)?;

        // Stand-in for the spectrum bin the analyser would sample.
        level.set_scalar((seconds * 8.0).sin().abs())?;

        let ctx = EvalContext { index: 7.0 };
        let opacity = ev.eval(&effect.outputs.opacity, &ctx);
        let scale = ev.eval(&effect.outputs.scale, &ctx);
        println!(
            "frame {frame}: opacity {:.3}, scale ({:.4}, {:.4}, {:.4})",
            opacity.lane(0),
            scale.lane(0),
            scale.lane(1),
            scale.lane(2)
        );
    }

    Ok(())
}
