use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One recommended component from a building analysis. The `sku` is raw
/// analyst output and is only resolved against the catalog when the bill is
/// converted into quote additions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BomLineItem {
    pub sku: String,
    pub description: String,
    pub quantity: u32,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BillOfMaterials {
    pub line_items: Vec<BomLineItem>,
    pub estimated_total: Option<Decimal>,
}

impl BillOfMaterials {
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}
