//! Product inventory on top of [`tally_store`].
//!
//! A [`Product`] carries an id, a name, a quantity and a unit price. Its
//! stock status ("Disponible" / "Agotado") is derived from the quantity and
//! recomputed whenever the quantity changes or the snapshot is loaded.

pub mod inventory;
pub mod product;

pub use inventory::{open, Inventory, StockSummary};
pub use product::{Product, ProductField, ProductPatch, StockStatus};
