//! Geometry payloads for camera-override commands

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Row-major 2D affine transform: two basis columns plus an origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub basis: [[f32; 2]; 2],
    pub origin: [f32; 2],
}

impl Transform2D {
    pub const IDENTITY: Self = Self {
        basis: [[1.0, 0.0], [0.0, 1.0]],
        origin: [0.0, 0.0],
    };

    /// Build the transform a 2D editor viewport applies: uniform zoom, with
    /// the origin shifted so `offset` lands at the top-left.
    pub fn from_zoom_offset(zoom: f32, offset: [f32; 2]) -> Self {
        Self {
            basis: [[zoom, 0.0], [0.0, zoom]],
            origin: [-offset[0] * zoom, -offset[1] * zoom],
        }
    }

    pub fn to_value(self) -> Value {
        Value::List(
            [
                self.basis[0][0],
                self.basis[0][1],
                self.basis[1][0],
                self.basis[1][1],
                self.origin[0],
                self.origin[1],
            ]
            .iter()
            .map(|f| Value::Float(f64::from(*f)))
            .collect(),
        )
    }
}

/// 3D transform: three basis columns plus an origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub basis: [[f32; 3]; 3],
    pub origin: [f32; 3],
}

impl Transform3D {
    pub const IDENTITY: Self = Self {
        basis: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        origin: [0.0, 0.0, 0.0],
    };

    pub fn to_value(self) -> Value {
        let mut floats = Vec::with_capacity(12);
        for column in self.basis {
            floats.extend(column);
        }
        floats.extend(self.origin);
        Value::List(floats.into_iter().map(|f| Value::Float(f64::from(f))).collect())
    }
}

/// Camera projection kind, with its single scalar parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Perspective { fov: f32 },
    Orthogonal { size: f32 },
}

impl Projection {
    pub fn is_perspective(self) -> bool {
        matches!(self, Projection::Perspective { .. })
    }

    /// The fov (perspective) or size (orthogonal) scalar sent on the wire
    pub fn scalar(self) -> f32 {
        match self {
            Projection::Perspective { fov } => fov,
            Projection::Orthogonal { size } => size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_offset_transform() {
        let t = Transform2D::from_zoom_offset(2.0, [10.0, 4.0]);
        assert_eq!(t.basis, [[2.0, 0.0], [0.0, 2.0]]);
        assert_eq!(t.origin, [-20.0, -8.0]);
    }

    #[test]
    fn transform3d_flattens_to_twelve_floats() {
        let v = Transform3D::IDENTITY.to_value();
        assert_eq!(v.as_list().unwrap().len(), 12);
    }
}
