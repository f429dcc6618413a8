//! Star-river effect assembled through the template API, the way an effect
//! author would embed expressions in host code.

use shadegraph::{
    EffectOutputs, EvalContext, Evaluator, GraphBuilder, Template, Value, compile_template,
    eval_elements,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut g = GraphBuilder::new();

    // Live inputs: frame time plus the audio-driven scale written every frame.
    let time = g.cell(Value::Scalar(0.0));
    let t = g.cell_node(&time);
    let global_scale = g.cell(Value::Scalar(1.0));
    let gain = g.cell_node(&global_scale);

    // Per-element randomness, shared by every channel below.
    let index = g.index();
    let random = compile_template(&Template::new("hash4(").splice(&index, ")"), &mut g)?;

    let stream_length = 30.0;
    let stream_radius = 4.0;

    // Position along the stream, wrapped so stars recirculate.
    let zp = compile_template(
        &Template::new("((")
            .splice(&random, ".z * ")
            .splice(stream_length, " + ")
            .splice(&t, " * 0.1 + ")
            .splice(stream_length / 2.0, ") % ")
            .splice(stream_length, ") - ")
            .splice(stream_length / 2.0, ""),
        &mut g,
    )?;

    let theta = compile_template(
        &Template::new("2.0 * PI * ").splice(&random, ".x"),
        &mut g,
    )?;
    let r = compile_template(
        &Template::new("2.0 * sqrt(")
            .splice(&random, ".y) * ")
            .splice(stream_radius, ""),
        &mut g,
    )?;

    let undulate_x = compile_template(
        &Template::new("sin(")
            .splice(&zp, " * 0.5 + ")
            .splice(&t, " * 0.2) * 0.4 + sin(")
            .splice(&zp, " * 1.3 + ")
            .splice(&t, " * 0.13) * 0.2"),
        &mut g,
    )?;
    let undulate_y = compile_template(
        &Template::new("cos(")
            .splice(&zp, " * 0.7 + ")
            .splice(&t, " * 0.18) * 0.3"),
        &mut g,
    )?;

    let xp = compile_template(
        &Template::new("")
            .splice(&undulate_x, " + ")
            .splice(&r, " * cos(")
            .splice(&theta, ")"),
        &mut g,
    )?;
    let yp = compile_template(
        &Template::new("")
            .splice(&undulate_y, " + ")
            .splice(&r, " * sin(")
            .splice(&theta, ")"),
        &mut g,
    )?;

    let position = g.construct(&[xp, yp, zp])?;
    let color = g.constant_vector(&[1.0, 1.0, 1.0])?;
    let opacity = compile_template(
        &Template::new("fract(sin(")
            .splice(&random, ".x * 0.000001 + ")
            .splice(&random, ".y * 100.0) * 43758.5453)"),
        &mut g,
    )?;
    let scale = compile_template(
        &Template::new("")
            .splice(vec![0.01, 0.01, 0.01], " * ")
            .splice(&random, ".w * ")
            .splice(&gain, ""),
        &mut g,
    )?;

    let outputs = EffectOutputs::new(position, color, opacity, scale)?;
    println!("compiled star river: {} distinct nodes", g.node_count());

    // Drive a few frames on the CPU path and show one star's trajectory.
    let mut ev = Evaluator::new();
    for frame in 0..5 {
        time.set_scalar(frame as f64 / 60.0)?;
        global_scale.set_scalar(1.0 + 0.5 * (frame as f64 * 0.7).sin())?;
        let p = ev.eval(&outputs.position, &EvalContext { index: 42.0 });
        println!(
            "frame {frame}: star 42 at ({:+.3}, {:+.3}, {:+.3})",
            p.lane(0),
            p.lane(1),
            p.lane(2)
        );
    }

    let positions = eval_elements(&outputs.position, 100_000);
    println!("evaluated {} elements", positions.len());

    Ok(())
}
