//! The [`Product`] record and its partial update.

use std::fmt;

use serde::{Deserialize, Serialize};
use tally_store::{FieldChange, Record, RecordPatch};

/// Stock status derived from a product's quantity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "Disponible")]
    Available,
    #[default]
    #[serde(rename = "Agotado")]
    SoldOut,
}

impl StockStatus {
    /// `Available` when any units remain, else `SoldOut`.
    pub fn for_quantity(quantity: u32) -> Self {
        if quantity > 0 {
            Self::Available
        } else {
            Self::SoldOut
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Disponible",
            Self::SoldOut => "Agotado",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product held in the inventory, keyed by `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "estado", default)]
    status: StockStatus,
}

impl Product {
    pub fn new(id: u32, name: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            quantity,
            price,
            status: StockStatus::for_quantity(quantity),
        }
    }

    /// Current stock status, always consistent with `quantity`.
    pub fn status(&self) -> StockStatus {
        StockStatus::for_quantity(self.quantity)
    }

    /// Quantity times unit price.
    pub fn stock_value(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "NOMBRE: {}", self.name)?;
        writeln!(f, "CANTIDAD: {}", self.quantity)?;
        writeln!(f, "PRECIO: ${:.2}", self.price)?;
        write!(f, "ESTADO: {}", self.status())
    }
}

/// Partial update for a [`Product`]. `None` leaves the field as it is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductPatch {
    pub quantity: Option<u32>,
    pub price: Option<f64>,
}

impl RecordPatch for ProductPatch {
    fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.price.is_none()
    }
}

/// Searchable text fields of a [`Product`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductField {
    Name,
}

impl Record for Product {
    type Key = u32;
    type Patch = ProductPatch;
    type Field = ProductField;

    const KIND: &'static str = "Producto";

    fn key(&self) -> &u32 {
        &self.id
    }

    fn describe(&self) -> String {
        format!("Nombre={}", self.name)
    }

    fn text(&self, field: ProductField) -> &str {
        match field {
            ProductField::Name => &self.name,
        }
    }

    fn apply(&mut self, patch: &ProductPatch) -> Vec<FieldChange> {
        let mut changes = Vec::new();
        if let Some(quantity) = patch.quantity {
            if quantity != self.quantity {
                changes.push(FieldChange::new("Cantidad", self.quantity, quantity));
                self.quantity = quantity;
            }
        }
        if let Some(price) = patch.price {
            if price != self.price {
                changes.push(FieldChange::new(
                    "Precio",
                    format!("{:.2}", self.price),
                    format!("{price:.2}"),
                ));
                self.price = price;
            }
        }
        changes
    }

    fn refresh_derived(&mut self) {
        self.status = StockStatus::for_quantity(self.quantity);
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("product name must not be empty".into());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("invalid price {}", self.price));
        }
        Ok(())
    }
}
