//! Kurvenprofil: zufällige Seitenauslenkung eines Segments aus seiner Ruhe-Pose.
//!
//! Jede Randomisierung startet von den aufgezeichneten Ruhe-Posen, es gibt
//! also keine kumulative Drift über mehrere Recycle-Vorgänge.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::pose::{look_rotation, Pose};
use super::segment::Segment;
use crate::shared::options::CurveOptions;

/// Zufällig gezogenes Profil eines Segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveProfile {
    /// Seitlicher Auslenkungsvektor (segment-lokal)
    pub lateral: Vec3,
    /// Vorzeichenbehafteter Winkel
    pub angle: f32,
}

impl CurveProfile {
    /// Kein Profil (Ruhe-Pose).
    pub const NONE: Self = Self {
        lateral: Vec3::ZERO,
        angle: 0.0,
    };

    /// Auslenkung bei Einfluss 1.0 (`lateral * angle`).
    pub fn displacement(&self) -> Vec3 {
        self.lateral * self.angle
    }
}

/// Interpolation zwischen den Stützstellen einer [`ResponseCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurveInterpolation {
    Linear,
    /// Smoothstep zwischen benachbarten Stützstellen
    #[default]
    Smooth,
}

/// Stützstelle der Einfluss-Kurve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

/// Einfluss-Kurve über den normierten Knotenindex (0 = Wurzel, 1 = Ende).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCurve {
    /// Stützstellen, aufsteigend nach `time`
    pub keys: Vec<CurveKey>,
    #[serde(default)]
    pub interpolation: CurveInterpolation,
}

impl Default for ResponseCurve {
    /// Ease-In-Out von 0 nach 1.
    fn default() -> Self {
        Self {
            keys: vec![
                CurveKey {
                    time: 0.0,
                    value: 0.0,
                },
                CurveKey {
                    time: 1.0,
                    value: 1.0,
                },
            ],
            interpolation: CurveInterpolation::Smooth,
        }
    }
}

impl ResponseCurve {
    /// Lineare Kurve 0 → 1.
    pub fn linear() -> Self {
        Self {
            interpolation: CurveInterpolation::Linear,
            ..Self::default()
        }
    }

    /// Wertet die Kurve aus. Außerhalb der Stützstellen wird geklemmt.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time > b.time {
                continue;
            }
            let span = b.time - a.time;
            if span <= f32::EPSILON {
                return b.value;
            }
            let mut u = (time - a.time) / span;
            if self.interpolation == CurveInterpolation::Smooth {
                u = u * u * (3.0 - 2.0 * u);
            }
            return a.value + (b.value - a.value) * u;
        }
        last.value
    }
}

/// Zieht Kurvenprofile und verformt Segmente aus ihrer Ruhe-Pose.
#[derive(Debug, Clone)]
pub struct CurveProfileEvaluator {
    options: CurveOptions,
    rng: StdRng,
}

impl CurveProfileEvaluator {
    /// Erstellt den Generator; mit `options.seed` reproduzierbar.
    pub fn new(options: CurveOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { options, rng }
    }

    pub fn options(&self) -> &CurveOptions {
        &self.options
    }

    /// Zieht ein neues Profil: Winkelbetrag gleichverteilt in `[min, max]`,
    /// Vorzeichen gleichverteilt, seitlicher Vektor in `±lateral_range`.
    pub fn draw_profile(&mut self) -> CurveProfile {
        let range = self.options.lateral_range;
        let lateral_x = if range > 0.0 {
            self.rng.random_range(-range..=range)
        } else {
            0.0
        };
        let magnitude = if self.options.max_angle > self.options.min_angle {
            self.rng
                .random_range(self.options.min_angle..=self.options.max_angle)
        } else {
            self.options.min_angle
        };
        let sign = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };

        CurveProfile {
            lateral: Vec3::new(lateral_x, 0.0, 0.0),
            angle: sign * magnitude,
        }
    }

    /// Setzt das Segment auf die Ruhe-Pose zurück und krümmt es mit einem frischen Profil.
    pub fn randomize_curve(&mut self, segment: &mut Segment) -> CurveProfile {
        let profile = self.draw_profile();
        self.apply_profile(segment, profile);
        profile
    }

    /// Wendet ein konkretes Profil an (deterministisch, ausgehend von der Ruhe-Pose).
    pub fn apply_profile(&self, segment: &mut Segment, profile: CurveProfile) {
        let displacement = profile.displacement();
        let (nodes, rest) = segment.nodes_and_rest_mut();
        nodes.copy_from_slice(rest);

        let count = nodes.len();
        if count >= 2 {
            let last = (count - 1) as f32;
            for (i, node) in nodes.iter_mut().enumerate().skip(1) {
                let influence = self.options.response.evaluate(i as f32 / last);
                node.position = rest[i].position + displacement * influence;
            }
            orient_chain(nodes, rest);
        }

        segment.set_profile(profile);
    }

    /// Setzt ein Segment explizit auf seine Ruhe-Pose zurück.
    pub fn reset_to_rest(&self, segment: &mut Segment) {
        segment.reset_to_rest();
    }
}

/// Richtet die Knoten per Look-Rotation an ihren Nachbarn aus.
///
/// Vorwärtsdurchlauf Wurzel → vorletzter Knoten (Blick auf den Nachfolger),
/// danach das Ende rückwärts (Blick vom Vorgänger).
fn orient_chain(nodes: &mut [Pose], rest: &[Pose]) {
    let count = nodes.len();
    for i in 0..count - 1 {
        let dir = nodes[i + 1].position - nodes[i].position;
        nodes[i].rotation = look_rotation(dir, rest[i].rotation);
    }
    let tail = count - 1;
    let dir = nodes[tail].position - nodes[tail - 1].position;
    nodes[tail].rotation = look_rotation(dir, rest[tail].rotation);
}
