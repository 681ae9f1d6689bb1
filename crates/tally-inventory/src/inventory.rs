use tally_store::{LoadReport, RecordStore, StoreConfig};
use tracing::info;

use crate::product::{Product, StockStatus};

/// A product inventory: a record store of [`Product`]s.
pub type Inventory = RecordStore<Product>;

/// Open the file-backed inventory described by `config`.
pub fn open(config: &StoreConfig) -> (Inventory, LoadReport) {
    let (inventory, report) = Inventory::open_files(config);
    info!(
        path = %config.snapshot_path.display(),
        products = inventory.len(),
        "inventory opened"
    );
    (inventory, report)
}

/// Totals over a set of products.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StockSummary {
    pub products: usize,
    pub units: u64,
    pub sold_out: usize,
    pub value: f64,
}

impl StockSummary {
    pub fn of(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut acc, p| {
            acc.products += 1;
            acc.units += u64::from(p.quantity);
            if p.status() == StockStatus::SoldOut {
                acc.sold_out += 1;
            }
            acc.value += p.stock_value();
            acc
        })
    }
}
