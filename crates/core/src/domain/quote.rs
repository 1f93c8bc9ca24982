use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::inventory::{InventoryItem, Sku};

/// Quote mutation capabilities supplied by the caller per turn. Implementors
/// decide how additions merge and what a remove on an absent SKU means; the
/// engine only guarantees call order and at-most-once invocation per command.
pub trait QuoteSink {
    fn add_to_quote(&mut self, item: &InventoryItem, quantity: u32);
    fn remove_from_quote(&mut self, sku: &Sku);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub sku: Sku,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
}

impl Quote {
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.unit_price * Decimal::from(line.quantity))
            .sum()
    }
}

impl QuoteSink for Quote {
    fn add_to_quote(&mut self, item: &InventoryItem, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.sku == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.lines.push(QuoteLine {
            sku: item.id.clone(),
            name: item.name.clone(),
            quantity,
            unit_price: item.unit_price,
        });
    }

    fn remove_from_quote(&mut self, sku: &Sku) {
        self.lines.retain(|line| &line.sku != sku);
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::inventory::{InventoryItem, Sku};

    use super::{Quote, QuoteSink};

    fn item(id: &str, cents: i64) -> InventoryItem {
        InventoryItem {
            id: Sku::parse(id).expect("fixture sku"),
            name: format!("item {id}"),
            description: String::new(),
            unit_price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut quote = Quote::default();
        let hammer = item("ITEM-1", 12_50);

        quote.add_to_quote(&hammer, 2);
        quote.add_to_quote(&hammer, 3);

        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.lines[0].quantity, 5);
        assert_eq!(quote.total(), Decimal::new(62_50, 2));
    }

    #[test]
    fn remove_of_absent_sku_is_a_no_op() {
        let mut quote = Quote::default();
        quote.add_to_quote(&item("ITEM-1", 100), 1);

        quote.remove_from_quote(&Sku::parse("ITEM-9").expect("sku"));

        assert_eq!(quote.lines.len(), 1);
    }

    #[test]
    fn remove_drops_the_whole_line() {
        let mut quote = Quote::default();
        quote.add_to_quote(&item("ITEM-1", 100), 4);
        quote.add_to_quote(&item("ITEM-2", 200), 1);

        quote.remove_from_quote(&Sku::parse("ITEM-1").expect("sku"));

        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.lines[0].sku.as_str(), "ITEM-2");
    }
}
