use crate::foundation::core::Shape;
use crate::foundation::error::{ShadegraphError, ShadegraphResult};
use crate::graph::node::NodeRef;

/// The four graph outputs every visual effect produces per element.
///
/// The external renderer lowers these to per-element shader code; this record
/// only fixes the contract (names and shapes) at compile time.
#[derive(Debug, Clone)]
pub struct EffectOutputs {
    /// 3D position, `vec3`.
    pub position: NodeRef,
    /// Color channels, `vec3`.
    pub color: NodeRef,
    /// Opacity, scalar.
    pub opacity: NodeRef,
    /// Anisotropic scale, `vec3`.
    pub scale: NodeRef,
}

impl EffectOutputs {
    /// Assemble an output record, validating the shape of every channel.
    pub fn new(
        position: NodeRef,
        color: NodeRef,
        opacity: NodeRef,
        scale: NodeRef,
    ) -> ShadegraphResult<Self> {
        expect_shape("position", &position, Shape::Vector(3))?;
        expect_shape("color", &color, Shape::Vector(3))?;
        expect_shape("opacity", &opacity, Shape::Scalar)?;
        expect_shape("scale", &scale, Shape::Vector(3))?;
        Ok(Self {
            position,
            color,
            opacity,
            scale,
        })
    }
}

fn expect_shape(name: &str, node: &NodeRef, want: Shape) -> ShadegraphResult<()> {
    if node.shape() != want {
        return Err(ShadegraphError::validation(format!(
            "effect output \"{name}\" must be {want}, got {}",
            node.shape()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    #[test]
    fn shapes_are_enforced_per_channel() {
        let mut g = GraphBuilder::new();
        let v3 = g.constant_vector(&[0.0, 0.0, 0.0]).unwrap();
        let s = g.constant(1.0);

        assert!(EffectOutputs::new(v3.clone(), v3.clone(), s.clone(), v3.clone()).is_ok());
        // Scalar position is rejected.
        assert!(EffectOutputs::new(s.clone(), v3.clone(), s.clone(), v3.clone()).is_err());
        // Vector opacity is rejected.
        assert!(EffectOutputs::new(v3.clone(), v3.clone(), v3.clone(), v3).is_err());
    }
}
