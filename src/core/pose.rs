//! Pose (Position + Orientierung) und Hilfsfunktionen für Look-Rotationen.

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Fahrtachse der Welt: Segmente werden entlang +Z verkettet.
pub const TRAVEL_AXIS: Vec3 = Vec3::Z;
/// Welt-Oben für Look-Rotationen.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Position und Orientierung eines Knotens oder Segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position (Welt- oder Segment-lokal, je nach Kontext)
    pub position: Vec3,
    /// Orientierung
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// Ursprung ohne Rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Erstellt eine neue Pose.
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Pose an einer Position ohne Rotation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Lokale Vorwärtsrichtung (+Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Lokale Rechtsrichtung (+X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Koordinate entlang der Fahrtachse (für Sortierung und Floating-Origin).
    pub fn travel_coordinate(&self) -> f32 {
        self.position.dot(TRAVEL_AXIS)
    }

    /// Transformiert eine lokale Pose in den Raum dieser Pose (`self * local`).
    pub fn transform(&self, local: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * local.position,
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Verschiebt die Pose entlang ihrer eigenen Rechtsachse.
    pub fn offset_right(&self, offset: f32) -> Pose {
        Pose {
            position: self.position + self.right() * offset,
            rotation: self.rotation,
        }
    }

    /// Prüft Gleichheit innerhalb einer Toleranz (Position und Rotation).
    pub fn abs_diff_eq(&self, other: &Pose, epsilon: f32) -> bool {
        self.position.abs_diff_eq(other.position, epsilon)
            && (self.rotation.dot(other.rotation).abs() - 1.0).abs() <= epsilon
    }
}

/// Rotation, deren Vorwärtsachse (+Z) in `direction` zeigt, mit `WORLD_UP` als Oben.
///
/// Bei (nahezu) degenerierter Richtung wird `fallback` zurückgegeben.
pub fn look_rotation(direction: Vec3, fallback: Quat) -> Quat {
    let Some(forward) = direction.try_normalize() else {
        return fallback;
    };
    let Some(right) = WORLD_UP.cross(forward).try_normalize() else {
        // Richtung parallel zu Oben: minimale Drehung statt Gimbal-Sprung
        return Quat::from_rotation_arc(Vec3::Z, forward);
    };
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn look_rotation_along_travel_axis_is_identity() {
        let rot = look_rotation(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);
        assert!(rot.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn look_rotation_points_forward_to_direction() {
        let dir = Vec3::new(1.0, 0.0, 1.0).normalize();
        let rot = look_rotation(dir, Quat::IDENTITY);
        let forward = rot * Vec3::Z;
        assert_relative_eq!(forward.x, dir.x, epsilon = 1e-5);
        assert_relative_eq!(forward.z, dir.z, epsilon = 1e-5);
        // kein Roll: Rechtsachse bleibt horizontal
        assert_relative_eq!((rot * Vec3::X).y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn zero_direction_returns_fallback() {
        let fallback = Quat::from_rotation_y(0.3);
        assert_eq!(look_rotation(Vec3::ZERO, fallback), fallback);
    }

    #[test]
    fn transform_composes_rotation_and_translation() {
        let parent = Pose::new(
            Vec3::new(0.0, 0.0, 10.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let child = parent.transform(&Pose::from_position(Vec3::new(0.0, 0.0, 5.0)));
        assert_relative_eq!(child.position.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(child.position.z, 10.0, epsilon = 1e-5);
    }

    #[test]
    fn offset_right_uses_local_axis() {
        let pose = Pose::from_position(Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(pose.offset_right(-2.0).position, Vec3::new(-2.0, 0.0, 3.0));
    }
}
