use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::core::{Shape, Value};
use crate::foundation::error::{ShadegraphError, ShadegraphResult};

/// Stable identity of a mutable cell within its builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub u32);

/// Handle to a mutable graph leaf.
///
/// A cell is the single external write slot of a compiled graph: the render
/// loop overwrites its value every frame (elapsed time, an audio-derived
/// scalar) without touching graph structure. Handles are cheap to clone and
/// share one storage slot; distinct cells never share storage.
///
/// Storage is one relaxed [`AtomicU64`] bit-pattern per lane under the
/// single-writer / many-reader discipline of the render loop. Multiple writer
/// threads must keep to distinct cells.
#[derive(Clone, Debug)]
pub struct Cell {
    id: CellId,
    shape: Shape,
    slot: Arc<CellSlot>,
}

#[derive(Debug)]
struct CellSlot {
    lanes: [AtomicU64; 4],
}

impl Cell {
    pub(crate) fn new(id: CellId, initial: Value) -> Self {
        let cell = Self {
            id,
            shape: initial.shape(),
            slot: Arc::new(CellSlot {
                lanes: std::array::from_fn(|_| AtomicU64::new(0)),
            }),
        };
        cell.store(initial);
        cell
    }

    /// Builder-stable identity of this cell.
    pub fn id(&self) -> CellId {
        self.id
    }

    /// Shape fixed at creation; writes must match it.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Overwrite the cell's value. The shape must match the cell's shape.
    pub fn set(&self, value: Value) -> ShadegraphResult<()> {
        if value.shape() != self.shape {
            return Err(ShadegraphError::validation(format!(
                "cell expects {} value, got {}",
                self.shape,
                value.shape()
            )));
        }
        self.store(value);
        Ok(())
    }

    /// Overwrite a scalar cell; shorthand for [`Cell::set`].
    pub fn set_scalar(&self, v: f64) -> ShadegraphResult<()> {
        self.set(Value::Scalar(v))
    }

    /// Read the current value.
    pub fn get(&self) -> Value {
        Value::from_lanes(self.shape, |k| {
            f64::from_bits(self.slot.lanes[k].load(Ordering::Relaxed))
        })
    }

    fn store(&self, value: Value) {
        for k in 0..self.shape.lanes() {
            self.slot.lanes[k].store(value.lane(k).to_bits(), Ordering::Relaxed);
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Cell {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip() {
        let c = Cell::new(CellId(0), Value::Vec3([1.0, 2.0, 3.0]));
        assert_eq!(c.get(), Value::Vec3([1.0, 2.0, 3.0]));

        c.set(Value::Vec3([4.0, 5.0, 6.0])).unwrap();
        assert_eq!(c.get(), Value::Vec3([4.0, 5.0, 6.0]));
    }

    #[test]
    fn rejects_shape_changes() {
        let c = Cell::new(CellId(0), Value::Scalar(0.0));
        assert!(c.set(Value::Vec2([0.0, 1.0])).is_err());
        assert!(c.set_scalar(1.5).is_ok());
        assert_eq!(c.get(), Value::Scalar(1.5));
    }

    #[test]
    fn clones_share_storage() {
        let a = Cell::new(CellId(7), Value::Scalar(1.0));
        let b = a.clone();
        b.set_scalar(9.0).unwrap();
        assert_eq!(a.get(), Value::Scalar(9.0));
        assert_eq!(a, b);
    }
}
