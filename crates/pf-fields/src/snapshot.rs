//! The snapshot collaborator: where direct quantities come from.

use std::collections::HashMap;

use pf_core::Real;
use thiserror::Error;

/// Unit requested for direct quantities read as formula operands.
///
/// Snapshots return arrays in their native code units for this name.
pub const DEFAULT_UNIT: &str = "default";

/// Failure reported by a snapshot while extracting an array.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Snapshot has no array for '{quantity}'")]
    MissingArray { quantity: String },

    #[error("Snapshot cannot convert '{quantity}' to unit '{unit}'")]
    UnknownUnit { quantity: String, unit: String },

    #[error("Snapshot backend error: {message}")]
    Backend { message: String },
}

/// Read-only access to a particle snapshot.
///
/// Implemented by whatever owns the simulation data. The engine only ever
/// asks for whole per-particle arrays plus two pieces of metadata.
pub trait Snapshot {
    /// Per-particle values of a direct quantity, converted to `unit`.
    fn extract_array(&self, quantity: &str, unit: &str) -> Result<Vec<Real>, SnapshotError>;

    /// Number of spatial dimensions (1, 2 or 3).
    fn dimensionality(&self) -> u32;

    /// Whether the snapshot comes from a running simulation.
    ///
    /// Accelerations and `dudt` exist only on live snapshots.
    fn is_live(&self) -> bool;

    /// Number of particles.
    ///
    /// Used to broadcast formulas that evaluate to a constant. The default
    /// reads the mass array, which every snapshot carries.
    fn particle_count(&self) -> Result<usize, SnapshotError> {
        Ok(self.extract_array("m", DEFAULT_UNIT)?.len())
    }
}

/// In-memory snapshot holding arrays in native units.
///
/// Unit conversion is a per-quantity multiplicative factor registered with
/// [`MemorySnapshot::with_unit`]; [`DEFAULT_UNIT`] always means factor 1.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    ndim: u32,
    live: bool,
    arrays: HashMap<String, Vec<Real>>,
    units: HashMap<(String, String), Real>,
}

impl MemorySnapshot {
    /// Create an empty snapshot with the given dimensionality.
    pub fn new(ndim: u32) -> Self {
        Self {
            ndim,
            live: false,
            arrays: HashMap::new(),
            units: HashMap::new(),
        }
    }

    /// Mark the snapshot as live (or static).
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Add or replace the array for `quantity`.
    pub fn with_array(mut self, quantity: impl Into<String>, values: Vec<Real>) -> Self {
        self.arrays.insert(quantity.into(), values);
        self
    }

    /// Register a conversion: extracting `quantity` in `unit` multiplies by `factor`.
    pub fn with_unit(mut self, quantity: impl Into<String>, unit: impl Into<String>, factor: Real) -> Self {
        self.units.insert((quantity.into(), unit.into()), factor);
        self
    }

    /// Replace the array for `quantity` in place.
    pub fn set_array(&mut self, quantity: impl Into<String>, values: Vec<Real>) {
        self.arrays.insert(quantity.into(), values);
    }
}

impl Snapshot for MemorySnapshot {
    fn extract_array(&self, quantity: &str, unit: &str) -> Result<Vec<Real>, SnapshotError> {
        let values = self
            .arrays
            .get(quantity)
            .ok_or_else(|| SnapshotError::MissingArray {
                quantity: quantity.to_string(),
            })?;

        if unit == DEFAULT_UNIT {
            return Ok(values.clone());
        }

        let factor = self
            .units
            .get(&(quantity.to_string(), unit.to_string()))
            .copied()
            .ok_or_else(|| SnapshotError::UnknownUnit {
                quantity: quantity.to_string(),
                unit: unit.to_string(),
            })?;
        Ok(values.iter().map(|v| v * factor).collect())
    }

    fn dimensionality(&self) -> u32 {
        self.ndim
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn particle_count(&self) -> Result<usize, SnapshotError> {
        match self.arrays.get("m") {
            Some(m) => Ok(m.len()),
            None => self
                .arrays
                .values()
                .next()
                .map(Vec::len)
                .ok_or_else(|| SnapshotError::MissingArray {
                    quantity: "m".to_string(),
                }),
        }
    }
}
