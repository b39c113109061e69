//! Named field queries over particle snapshots.
//!
//! A caller asks for a quantity by name. Direct quantities (`x`, `vx`, `rho`,
//! ...) are extracted from the [`Snapshot`] as stored; derived quantities are
//! computed from a formula compiled once at registration and replayed by a
//! stack evaluator, which may recursively fetch other derived quantities.
//!
//! # Lifecycle
//!
//! A [`QuantityRegistry`] is built once at startup (seeded with the bootstrap
//! quantities `r`, `R`, `phi`, `theta`, `vr`, `ar`), extended with
//! [`QuantityRegistry::register`], then shared by reference with every fetch.
//! Registration needs `&mut`, evaluation only `&`, so the borrow checker keeps
//! the two phases apart.

pub mod availability;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod fetch;
pub mod quantity;
pub mod registry;
pub mod snapshot;
pub mod value;

pub use availability::{check_requested_quantity, validate};
pub use bootstrap::{BOOTSTRAP_QUANTITIES, install_bootstrap};
pub use config::{FieldsConfig, QuantityDef};
pub use error::{FieldError, FieldResult};
pub use evaluator::{Evaluator, evaluate};
pub use fetch::{DerivedFetch, Fetched, fetch};
pub use quantity::{DerivedQuantity, DirectQuantity, Quantity, QuantityKind};
pub use registry::{MAX_DEFINITION_DEPTH, QuantityRegistry};
pub use snapshot::{DEFAULT_UNIT, MemorySnapshot, Snapshot, SnapshotError};
pub use value::Value;

pub use pf_core::{Real, UnitInfo};
pub use pf_formula::{Program, compile};
