use crate::foundation::error::{ShadegraphError, ShadegraphResult};

/// Value shape carried by every graph node: a scalar or a fixed-width vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single floating-point value.
    Scalar,
    /// A vector of `width` components, `width` in `2..=4`.
    Vector(u8),
}

impl Shape {
    /// Create a validated vector shape with `width` in `2..=4`.
    pub fn vector(width: u8) -> ShadegraphResult<Self> {
        if !(2..=4).contains(&width) {
            return Err(ShadegraphError::validation(format!(
                "vector width must be 2..=4, got {width}"
            )));
        }
        Ok(Self::Vector(width))
    }

    /// Number of lanes: 1 for scalars, the width for vectors.
    pub fn lanes(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector(w) => w as usize,
        }
    }

    /// Return `true` for vector shapes.
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vector(_))
    }

    /// Elementwise broadcast of two operand shapes.
    ///
    /// Equal shapes combine to themselves; a scalar broadcasts into the other
    /// operand's vector shape. Mismatched vector widths do not combine.
    pub fn broadcast(a: Shape, b: Shape) -> Option<Shape> {
        match (a, b) {
            (a, b) if a == b => Some(a),
            (Shape::Scalar, v @ Shape::Vector(_)) | (v @ Shape::Vector(_), Shape::Scalar) => {
                Some(v)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Vector(w) => write!(f, "vec{w}"),
        }
    }
}

/// One named vector component, used by swizzle access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
    /// First component.
    X,
    /// Second component.
    Y,
    /// Third component.
    Z,
    /// Fourth component.
    W,
}

impl Component {
    /// Zero-based lane index of this component.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
            Self::W => 3,
        }
    }

    /// Component name as written in source (`x`, `y`, `z`, `w`).
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::W => "w",
        }
    }

    pub(crate) fn from_name(s: &str) -> Option<Self> {
        match s {
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            "w" => Some(Self::W),
            _ => None,
        }
    }
}

/// A runtime value produced by evaluating a graph node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Scalar value.
    Scalar(f64),
    /// Two-component vector.
    Vec2([f64; 2]),
    /// Three-component vector.
    Vec3([f64; 3]),
    /// Four-component vector.
    Vec4([f64; 4]),
}

impl Value {
    /// Shape of this value.
    pub fn shape(&self) -> Shape {
        match self {
            Self::Scalar(_) => Shape::Scalar,
            Self::Vec2(_) => Shape::Vector(2),
            Self::Vec3(_) => Shape::Vector(3),
            Self::Vec4(_) => Shape::Vector(4),
        }
    }

    /// Lane `k` of this value; scalars broadcast to every lane.
    ///
    /// Out-of-range lanes on vectors clamp to the last lane, so the accessor is
    /// total; shape checking at graph construction keeps indices in range.
    pub fn lane(&self, k: usize) -> f64 {
        match self {
            Self::Scalar(v) => *v,
            Self::Vec2(v) => v[k.min(1)],
            Self::Vec3(v) => v[k.min(2)],
            Self::Vec4(v) => v[k.min(3)],
        }
    }

    /// Build a value of `shape` by computing each lane.
    pub fn from_lanes(shape: Shape, mut f: impl FnMut(usize) -> f64) -> Value {
        match shape {
            Shape::Scalar => Value::Scalar(f(0)),
            Shape::Vector(2) => Value::Vec2([f(0), f(1)]),
            Shape::Vector(3) => Value::Vec3([f(0), f(1), f(2)]),
            Shape::Vector(_) => Value::Vec4([f(0), f(1), f(2), f(3)]),
        }
    }

    /// Build a value from a slice: 1 element is a scalar, 2..=4 a vector.
    pub fn from_slice(lanes: &[f64]) -> ShadegraphResult<Value> {
        match lanes {
            [v] => Ok(Value::Scalar(*v)),
            [a, b] => Ok(Value::Vec2([*a, *b])),
            [a, b, c] => Ok(Value::Vec3([*a, *b, *c])),
            [a, b, c, d] => Ok(Value::Vec4([*a, *b, *c, *d])),
            other => Err(ShadegraphError::validation(format!(
                "value must have 1..=4 lanes, got {}",
                other.len()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_accepts_scalar_vector_pairs() {
        assert_eq!(
            Shape::broadcast(Shape::Scalar, Shape::Vector(3)),
            Some(Shape::Vector(3))
        );
        assert_eq!(
            Shape::broadcast(Shape::Vector(2), Shape::Scalar),
            Some(Shape::Vector(2))
        );
        assert_eq!(
            Shape::broadcast(Shape::Scalar, Shape::Scalar),
            Some(Shape::Scalar)
        );
        assert_eq!(Shape::broadcast(Shape::Vector(2), Shape::Vector(3)), None);
    }

    #[test]
    fn vector_width_is_validated() {
        assert!(Shape::vector(2).is_ok());
        assert!(Shape::vector(4).is_ok());
        assert!(Shape::vector(1).is_err());
        assert!(Shape::vector(5).is_err());
    }

    #[test]
    fn scalar_lane_broadcasts() {
        let v = Value::Scalar(7.0);
        assert_eq!(v.lane(0), 7.0);
        assert_eq!(v.lane(3), 7.0);

        let v = Value::Vec3([1.0, 2.0, 3.0]);
        assert_eq!(v.lane(0), 1.0);
        assert_eq!(v.lane(2), 3.0);
    }

    #[test]
    fn from_slice_maps_lengths() {
        assert_eq!(Value::from_slice(&[1.0]).unwrap(), Value::Scalar(1.0));
        assert_eq!(
            Value::from_slice(&[1.0, 2.0, 3.0]).unwrap(),
            Value::Vec3([1.0, 2.0, 3.0])
        );
        assert!(Value::from_slice(&[]).is_err());
        assert!(Value::from_slice(&[0.0; 5]).is_err());
    }
}
