use serde::{Deserialize, Serialize};

/// A position or velocity in world units. One world unit is one tile side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a vector from components.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `heading` (radians, 0 = +x).
    pub fn from_heading(heading: f32) -> Self {
        Self {
            x: heading.cos(),
            y: heading.sin(),
        }
    }

    /// Squared length.
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Length.
    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Squared distance to another point.
    pub fn distance_sq(self, other: Self) -> f32 {
        (self - other).length_sq()
    }

    /// Point halfway between `self` and `other`.
    pub fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) * 0.5,
            y: (self.y + other.y) * 0.5,
        }
    }

    /// Angle of this vector in radians (atan2 convention).
    pub fn heading(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// The tile containing this point.
    pub fn tile(self) -> TilePos {
        TilePos {
            x: self.x.floor() as i32,
            y: self.y.floor() as i32,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// An integer tile coordinate on the terrain grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl TilePos {
    /// Create a tile coordinate.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space center of this tile.
    pub fn center(self) -> Vec2 {
        Vec2 {
            x: self.x as f32 + 0.5,
            y: self.y as f32 + 0.5,
        }
    }
}

impl std::fmt::Display for TilePos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_of_negative_position_floors() {
        let p = Vec2::new(-0.2, 3.9);
        assert_eq!(p.tile(), TilePos::new(-1, 3));
    }

    #[test]
    fn tile_center_is_half_offset() {
        let c = TilePos::new(2, -1).center();
        assert!((c.x - 2.5).abs() < f32::EPSILON);
        assert!((c.y + 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_sq_avoids_root() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.distance_sq(b) - 25.0).abs() < f32::EPSILON);
        assert!((b.length() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn midpoint_is_symmetric() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 6.0);
        let m = a.midpoint(b);
        assert!((m.x - 2.0).abs() < f32::EPSILON);
        assert!((m.y - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn heading_round_trip() {
        let v = Vec2::from_heading(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
        assert!((v.heading() - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
