//! Fehlertypen für Konfiguration und Initialisierung.
//!
//! Laufzeitfehler (fehlende Referenzen, degenerierte Geometrie, leere Abfragen)
//! werden nicht als Fehler gemeldet, sondern übersprungen bzw. mit Sentinel-Werten
//! beantwortet.

use thiserror::Error;

/// Fataler Fehler beim Aufbau des Straßensystems.
#[derive(Debug, Error, PartialEq)]
pub enum RoadError {
    /// Keine Segment-Vorlagen konfiguriert
    #[error("keine Segment-Vorlagen konfiguriert")]
    EmptyPrefabSet,
    /// Minimale Pool-Größe fehlt oder liegt unter dem Minimum
    #[error("minimale Pool-Größe fehlt oder ist zu klein ({configured}, mindestens {required})")]
    MissingMinimumPoolSize { configured: usize, required: usize },
    /// Vorlage mit zu wenigen Kontroll-Knoten
    #[error("Segment-Vorlage '{name}' hat {node_count} Knoten, mindestens 2 erforderlich")]
    InvalidPrefab { name: String, node_count: usize },
    /// Ungültiger Konfigurationswert
    #[error("ungültiger Konfigurationswert '{field}': {reason}")]
    InvalidOption { field: &'static str, reason: String },
    /// Spur-ID mehrfach vergeben
    #[error("Spur-ID {0} ist mehrfach konfiguriert")]
    DuplicateLane(u32),
}
