//! Nächster Punkt auf einer Polyline (parametrische Projektion).
//!
//! Einzige Implementierung für alle Abfragen: globaler Pfad, Nah-Fenster,
//! einzelne Segmente, Spuren und "nächste Spur". Die Aufrufer unterscheiden
//! sich nur in der übergebenen Punktliste.

use glam::Vec3;

/// Unterhalb dieser quadrierten Länge gilt ein Polyline-Abschnitt als degeneriert.
pub const DEGENERATE_SEGMENT_EPSILON: f32 = 1e-8;

/// Ergebnis einer Nächster-Punkt-Abfrage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Projizierter Punkt auf der Polyline
    pub point: Vec3,
    /// Richtung des getroffenen Abschnitts (`B - A`, nicht normalisiert)
    pub tangent: Vec3,
    /// Euklidische Distanz zwischen Ziel und `point`
    pub distance: f32,
    /// Index von `A` des getroffenen Abschnitts
    pub segment_index: usize,
    /// Parameter `t ∈ [0, 1]` auf dem Abschnitt
    pub t: f32,
}

impl ClosestPoint {
    /// Ergebnis für Punktlisten mit weniger als zwei Punkten.
    ///
    /// Nullpunkt, Standard-Vorwärtsrichtung (+Z), unendliche Distanz.
    pub const DEGENERATE: Self = Self {
        point: Vec3::ZERO,
        tangent: Vec3::Z,
        distance: f32::INFINITY,
        segment_index: 0,
        t: 0.0,
    };

    /// `true` wenn das Ergebnis der Degenerat-Sentinel ist.
    pub fn is_degenerate(&self) -> bool {
        self.distance.is_infinite()
    }

    /// Normalisierte Tangente (Fallback +Z bei Null-Tangente).
    pub fn direction(&self) -> Vec3 {
        self.tangent.try_normalize().unwrap_or(Vec3::Z)
    }
}

/// Projiziert `target` auf den Abschnitt `a → b`.
///
/// Gibt `(t, Punkt)` zurück; degenerierte Abschnitte liefern `a`.
#[inline]
pub fn project_onto_segment(target: Vec3, a: Vec3, b: Vec3) -> (f32, Vec3) {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq < DEGENERATE_SEGMENT_EPSILON {
        return (0.0, a);
    }
    let t = ((target - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (t, a + ab * t)
}

/// Findet den nächsten Punkt auf der durch `points` gegebenen Polyline.
///
/// Iteriert alle aufeinanderfolgenden Paare; bei Gleichstand gewinnt der erste
/// Abschnitt. Weniger als zwei Punkte → [`ClosestPoint::DEGENERATE`].
pub fn closest_point_on_polyline<I>(target: Vec3, points: I) -> ClosestPoint
where
    I: IntoIterator<Item = Vec3>,
{
    let mut iter = points.into_iter();
    let Some(mut a) = iter.next() else {
        return ClosestPoint::DEGENERATE;
    };

    let mut best = ClosestPoint::DEGENERATE;
    let mut best_dist_sq = f32::INFINITY;

    for (index, b) in iter.enumerate() {
        let (t, candidate) = project_onto_segment(target, a, b);
        let dist_sq = target.distance_squared(candidate);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = ClosestPoint {
                point: candidate,
                tangent: b - a,
                distance: 0.0,
                segment_index: index,
                t,
            };
        }
        a = b;
    }

    if best_dist_sq.is_finite() {
        best.distance = best_dist_sq.sqrt();
    }
    best
}

/// Ist `point` vor einem Beobachter an `origin` mit Blickrichtung `forward`?
pub fn is_point_ahead(origin: Vec3, forward: Vec3, point: Vec3) -> bool {
    forward.dot(point - origin) > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_path() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 20.0),
        ]
    }

    #[test]
    fn projects_onto_straight_path() {
        let hit = closest_point_on_polyline(Vec3::new(5.0, 0.0, 5.0), straight_path());

        assert_eq!(hit.point, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(hit.tangent, Vec3::new(0.0, 0.0, 10.0));
        assert_relative_eq!(hit.distance, 5.0);
        assert_eq!(hit.segment_index, 0);
    }

    #[test]
    fn clamps_beyond_endpoints() {
        let hit = closest_point_on_polyline(Vec3::new(0.0, 0.0, 35.0), straight_path());
        assert_eq!(hit.point, Vec3::new(0.0, 0.0, 20.0));
        assert_eq!(hit.segment_index, 1);
        assert_relative_eq!(hit.t, 1.0);

        let hit = closest_point_on_polyline(Vec3::new(1.0, 0.0, -4.0), straight_path());
        assert_eq!(hit.point, Vec3::ZERO);
        assert_relative_eq!(hit.t, 0.0);
    }

    #[test]
    fn fewer_than_two_points_returns_sentinel() {
        let hit = closest_point_on_polyline(Vec3::ONE, Vec::new());
        assert!(hit.is_degenerate());
        assert_eq!(hit.point, Vec3::ZERO);
        assert_eq!(hit.tangent, Vec3::Z);

        let hit = closest_point_on_polyline(Vec3::ONE, [Vec3::new(3.0, 0.0, 0.0)]);
        assert!(hit.is_degenerate());
    }

    #[test]
    fn duplicate_points_fall_back_to_start() {
        let p = Vec3::new(2.0, 0.0, 2.0);
        let hit = closest_point_on_polyline(Vec3::new(2.0, 0.0, 5.0), [p, p]);
        assert_eq!(hit.point, p);
        assert_relative_eq!(hit.distance, 3.0);
        assert!(!hit.distance.is_nan());
    }

    #[test]
    fn result_is_never_farther_than_any_vertex() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 8.0),
            Vec3::new(-2.0, 1.0, 15.0),
            Vec3::new(-2.0, 1.0, 15.0),
            Vec3::new(4.0, 0.0, 27.0),
        ];
        for i in 0..40 {
            let f = i as f32;
            let target = Vec3::new((f * 0.7).sin() * 9.0, (f * 0.3).cos(), f * 0.8 - 3.0);
            let hit = closest_point_on_polyline(target, points.iter().copied());
            for vertex in &points {
                assert!(hit.distance <= target.distance(*vertex) + 1e-4);
            }
        }
    }

    #[test]
    fn ahead_test_uses_forward_dot() {
        assert!(is_point_ahead(Vec3::ZERO, Vec3::Z, Vec3::new(3.0, 0.0, 1.0)));
        assert!(!is_point_ahead(Vec3::ZERO, Vec3::Z, Vec3::new(3.0, 0.0, -1.0)));
    }
}
