//! Spatial-Index (KD-Tree) über den Pfadpunkten.

use glam::Vec3;
use kiddo::{KdTree, SquaredEuclidean};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// Index des Punkts in der indexierten Liste
    pub index: usize,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f32,
}

/// Read-only Spatial-Index über einer Punktliste.
///
/// Wird nach jeder Änderung der Punktliste komplett neu aufgebaut.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 3>,
    len: usize,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 3]>::new()).into(),
            len: 0,
        }
    }

    /// Baut einen neuen Index; `SpatialMatch::index` entspricht der Iterationsreihenfolge.
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        let entries: Vec<[f64; 3]> = positions
            .into_iter()
            .map(|p| [p.x as f64, p.y as f64, p.z as f64])
            .collect();
        let tree: KdTree<f64, 3> = (&entries).into();

        Self {
            tree,
            len: entries.len(),
        }
    }

    /// Gibt die Anzahl indexierter Punkte zurück.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Gibt `true` zurück, wenn keine Punkte im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Findet den nächsten Punkt zur gegebenen Weltposition.
    pub fn nearest(&self, query: Vec3) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self.tree.nearest_one::<SquaredEuclidean>(&to_query(query));
        Some(SpatialMatch {
            index: result.item as usize,
            distance: (result.distance as f32).sqrt(),
        })
    }

    /// Findet alle Punkte mit Distanz strikt kleiner als `radius`, sortiert nach Distanz.
    pub fn within_radius(&self, query: Vec3, radius: f32) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let radius_sq = (radius as f64) * (radius as f64);
        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&to_query(query), radius_sq)
            .into_iter()
            .filter(|entry| entry.distance < radius_sq)
            .map(|entry| SpatialMatch {
                index: entry.item as usize,
                distance: (entry.distance as f32).sqrt(),
            })
            .collect::<Vec<_>>();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}

fn to_query(p: Vec3) -> [f64; 3] {
    [p.x as f64, p.y as f64, p.z as f64]
}
