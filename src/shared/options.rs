//! Zentrale Konfiguration für das Straßensystem.
//!
//! `RoadOptions` enthält alle beim Start einlesbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::{ResponseCurve, RoadError, SegmentPrefab};

// ── Pool ────────────────────────────────────────────────────────────

/// Minimale Anzahl aktiver Segmente.
pub const MIN_POOL_SIZE: usize = 3;
/// Mindestabstand Betrachter → Segment-Anker, ab dem recycelt werden darf.
pub const RECYCLE_DISTANCE: f32 = 60.0;

// ── Kurvenprofil ────────────────────────────────────────────────────

/// Maximaler Betrag der seitlichen Auslenkung (Segment-lokal X).
pub const CURVE_LATERAL_RANGE: f32 = 1.0;
/// Minimaler Betrag des Kurvenwinkels.
pub const CURVE_MIN_ANGLE: f32 = 2.0;
/// Maximaler Betrag des Kurvenwinkels.
pub const CURVE_MAX_ANGLE: f32 = 8.0;

// ── Nah-Fenster ─────────────────────────────────────────────────────

/// Radius des Nah-Fensters um den Fahrer.
pub const NEAR_WINDOW_MAX_DISTANCE: f32 = 125.0;
/// Unterhalb dieser Distanz gilt ein Punkt immer als "vorne".
pub const NEAR_WINDOW_MIN_FRONT_DISTANCE: f32 = 20.0;
/// Aktualisierungsintervall des Nah-Fensters in Sekunden (Wall-Clock).
pub const NEAR_WINDOW_REFRESH_INTERVAL: f64 = 0.25;

// ── Floating Origin ─────────────────────────────────────────────────

/// Fahrtachsen-Koordinate, ab der die Welt zurückverschoben wird.
pub const FLOATING_ORIGIN_LIMIT: f32 = 1000.0;
/// Welteinheiten pro Einheit des Distanzzählers (1000 = Kilometer).
pub const DISTANCE_UNIT_SCALE: f32 = 1000.0;

/// Einstellungen des Kurvenprofil-Generators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurveOptions {
    /// Maximaler Betrag der seitlichen Auslenkung
    pub lateral_range: f32,
    /// Minimaler Winkelbetrag
    pub min_angle: f32,
    /// Maximaler Winkelbetrag
    pub max_angle: f32,
    /// Einfluss-Kurve über den normierten Knotenindex
    #[serde(default)]
    pub response: ResponseCurve,
    /// Fester Seed für reproduzierbare Straßen (None = zufällig)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Auch die Segmente der Start-Kette krümmen
    #[serde(default = "default_true")]
    pub curve_initial_segments: bool,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            lateral_range: CURVE_LATERAL_RANGE,
            min_angle: CURVE_MIN_ANGLE,
            max_angle: CURVE_MAX_ANGLE,
            response: ResponseCurve::default(),
            seed: None,
            curve_initial_segments: true,
        }
    }
}

/// Einstellungen des Nah-Fensters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearWindowOptions {
    /// Radius des Fensters
    pub max_distance: f32,
    /// Distanz, unterhalb der ein Punkt ohne Richtungstest im Fenster bleibt
    pub min_front_distance: f32,
    /// Aktualisierungsintervall in Sekunden
    pub refresh_interval_secs: f64,
}

impl Default for NearWindowOptions {
    fn default() -> Self {
        Self {
            max_distance: NEAR_WINDOW_MAX_DISTANCE,
            min_front_distance: NEAR_WINDOW_MIN_FRONT_DISTANCE,
            refresh_interval_secs: NEAR_WINDOW_REFRESH_INTERVAL,
        }
    }
}

/// Konfiguration einer Spur.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaneOptions {
    /// Eindeutige Spur-ID
    pub id: u32,
    /// Seitlicher Versatz (negativ = links). Fehlt er, wird er aus
    /// `initial_position.x` übernommen.
    #[serde(default)]
    pub offset: Option<f32>,
    /// Ausgangsposition der Spur in der Welt
    #[serde(default)]
    pub initial_position: Vec3,
}

/// Einstellungen der Floating-Origin-Korrektur.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloatingOriginOptions {
    /// Grenze auf der Fahrtachse
    pub limit: f32,
    /// Welteinheiten pro Zähler-Einheit
    pub distance_unit_scale: f32,
}

impl Default for FloatingOriginOptions {
    fn default() -> Self {
        Self {
            limit: FLOATING_ORIGIN_LIMIT,
            distance_unit_scale: DISTANCE_UNIT_SCALE,
        }
    }
}

/// Parameter der Headless-Simulation (nur Binary).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationOptions {
    /// Geschwindigkeit des Fahrers in Welteinheiten pro Sekunde
    pub speed: f32,
    /// Zeitschritt pro Frame in Sekunden
    pub frame_dt: f64,
    /// Anzahl simulierter Frames
    pub frames: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            speed: 30.0,
            frame_dt: 1.0 / 60.0,
            frames: 6000,
        }
    }
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle Optionen des Straßensystems.
/// Wird als `endless_road.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoadOptions {
    // ── Pool ────────────────────────────────────────────────────
    /// Segment-Vorlagen, aus denen der Pool einmalig instanziiert wird
    pub prefabs: Vec<SegmentPrefab>,
    /// Minimale Anzahl aktiver Segmente
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: usize,
    /// Mindestabstand zum Anker, bevor ein Segment recycelt wird
    pub recycle_distance: f32,

    // ── Kurven ──────────────────────────────────────────────────
    /// Kurvenprofil-Einstellungen
    #[serde(default)]
    pub curve: CurveOptions,

    // ── Pfad ────────────────────────────────────────────────────
    /// Nah-Fenster-Einstellungen
    #[serde(default)]
    pub near_window: NearWindowOptions,

    // ── Spuren ──────────────────────────────────────────────────
    /// Konfigurierte Spuren
    #[serde(default)]
    pub lanes: Vec<LaneOptions>,

    // ── Floating Origin ─────────────────────────────────────────
    /// Floating-Origin-Einstellungen
    #[serde(default)]
    pub floating_origin: FloatingOriginOptions,

    // ── Simulation ──────────────────────────────────────────────
    /// Headless-Simulation
    #[serde(default)]
    pub simulation: SimulationOptions,
}

impl Default for RoadOptions {
    fn default() -> Self {
        Self {
            prefabs: vec![
                SegmentPrefab::straight("gerade_kurz", 5, 10.0),
                SegmentPrefab::straight("gerade_lang", 8, 12.0),
            ],
            min_pool_size: MIN_POOL_SIZE,
            recycle_distance: RECYCLE_DISTANCE,
            curve: CurveOptions::default(),
            near_window: NearWindowOptions::default(),
            lanes: vec![
                LaneOptions {
                    id: 0,
                    offset: Some(-3.5),
                    initial_position: Vec3::ZERO,
                },
                LaneOptions {
                    id: 1,
                    offset: Some(3.5),
                    initial_position: Vec3::ZERO,
                },
            ],
            floating_origin: FloatingOriginOptions::default(),
            simulation: SimulationOptions::default(),
        }
    }
}

/// Serde-Default für `min_pool_size` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_min_pool_size() -> usize {
    MIN_POOL_SIZE
}

fn default_true() -> bool {
    true
}

impl RoadOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("endless_road"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("endless_road.toml")
    }

    /// Prüft die Konfiguration. Fehler sind fatal für die Initialisierung.
    pub fn validate(&self) -> Result<(), RoadError> {
        if self.prefabs.is_empty() {
            return Err(RoadError::EmptyPrefabSet);
        }
        if self.min_pool_size < MIN_POOL_SIZE {
            return Err(RoadError::MissingMinimumPoolSize {
                configured: self.min_pool_size,
                required: MIN_POOL_SIZE,
            });
        }
        for prefab in &self.prefabs {
            prefab.validate()?;
        }
        if !(self.recycle_distance >= 0.0) {
            return Err(invalid("recycle_distance", "muss >= 0 sein"));
        }
        if !(self.curve.min_angle >= 0.0 && self.curve.min_angle <= self.curve.max_angle) {
            return Err(invalid(
                "curve.min_angle",
                format!(
                    "erwartet 0 <= min ({}) <= max ({})",
                    self.curve.min_angle, self.curve.max_angle
                ),
            ));
        }
        if !(self.curve.lateral_range >= 0.0) {
            return Err(invalid("curve.lateral_range", "muss >= 0 sein"));
        }
        if !(self.near_window.max_distance > 0.0) {
            return Err(invalid("near_window.max_distance", "muss > 0 sein"));
        }
        if !(self.near_window.refresh_interval_secs >= 0.0) {
            return Err(invalid("near_window.refresh_interval_secs", "muss >= 0 sein"));
        }
        if !(self.floating_origin.limit > 0.0) {
            return Err(invalid("floating_origin.limit", "muss > 0 sein"));
        }
        if !(self.floating_origin.distance_unit_scale > 0.0) {
            return Err(invalid("floating_origin.distance_unit_scale", "muss > 0 sein"));
        }

        let mut seen = std::collections::HashSet::new();
        for lane in &self.lanes {
            if !seen.insert(lane.id) {
                return Err(RoadError::DuplicateLane(lane.id));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> RoadError {
    RoadError::InvalidOption {
        field,
        reason: reason.into(),
    }
}
