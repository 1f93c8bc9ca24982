use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use quartermaster_core::domain::bom::{BillOfMaterials, BomLineItem};
use quartermaster_core::domain::inventory::{Catalog, InventoryLookup, Sku};

use crate::llm::LlmClient;

/// Turns a building-requirements request into a bill of materials. Any
/// transport or parse failure is a collaborator failure for the orchestrator
/// to absorb at the turn boundary.
#[async_trait]
pub trait BuildingAnalyst: Send + Sync {
    async fn analyze(&self, requirements: &str) -> Result<BillOfMaterials>;
}

pub struct LlmBuildingAnalyst<C> {
    client: C,
    catalog: Catalog,
}

impl<C> LlmBuildingAnalyst<C>
where
    C: LlmClient,
{
    pub fn new(client: C, catalog: Catalog) -> Self {
        Self { client, catalog }
    }
}

#[async_trait]
impl<C> BuildingAnalyst for LlmBuildingAnalyst<C>
where
    C: LlmClient,
{
    async fn analyze(&self, requirements: &str) -> Result<BillOfMaterials> {
        let prompt = render_analysis_prompt(requirements, &self.catalog);
        let raw = self.client.complete(&prompt).await?;
        parse_bom(&raw, &self.catalog)
    }
}

fn render_analysis_prompt(requirements: &str, catalog: &Catalog) -> String {
    let mut catalog_listing = String::new();
    for item in catalog.items() {
        catalog_listing.push_str(&format!(
            "- {} | {} | {} each\n",
            item.id, item.name, item.unit_price
        ));
    }

    format!(
        "You are a building materials estimator. Using ONLY the catalog below, \
         produce a bill of materials for the customer's project.\n\
         \n\
         Catalog (sku | name | unit price):\n{catalog_listing}\n\
         Customer project:\n{requirements}\n\
         \n\
         Respond with a single JSON object and nothing else:\n\
         {{\"line_items\": [{{\"sku\": \"...\", \"description\": \"...\", \
         \"quantity\": 1, \"confidence\": 0.0, \"reasoning\": \"...\"}}], \
         \"estimated_total\": \"0.00\"}}\n\
         Use only skus from the catalog. Omit items you cannot justify."
    )
}

#[derive(Debug, Deserialize)]
struct BomDraft {
    #[serde(default)]
    line_items: Vec<BomLineDraft>,
    estimated_total: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct BomLineDraft {
    sku: String,
    #[serde(default)]
    description: String,
    quantity: u32,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    reasoning: String,
}

fn parse_bom(raw: &str, catalog: &Catalog) -> Result<BillOfMaterials> {
    let json = extract_json_object(raw).unwrap_or(raw);
    let draft: BomDraft = serde_json::from_str(json)
        .context("analysis response was not a valid bill-of-materials JSON object")?;

    let line_items: Vec<BomLineItem> = draft
        .line_items
        .into_iter()
        .filter(|line| line.quantity > 0)
        .map(|line| BomLineItem {
            sku: line.sku,
            description: line.description,
            quantity: line.quantity,
            confidence: line.confidence.clamp(0.0, 1.0),
            reasoning: line.reasoning,
        })
        .collect();

    let estimated_total =
        draft.estimated_total.or_else(|| priced_total(&line_items, catalog));

    Ok(BillOfMaterials { line_items, estimated_total })
}

/// Sums catalog prices for the lines whose skus resolve; `None` when no line
/// resolves, so a wholly unpriceable bill carries no misleading total.
fn priced_total(line_items: &[BomLineItem], catalog: &Catalog) -> Option<Decimal> {
    let mut total = Decimal::ZERO;
    let mut priced_any = false;

    for line in line_items {
        let Ok(sku) = Sku::parse(&line.sku) else { continue };
        if let Some(item) = catalog.find(&sku) {
            total += item.unit_price * Decimal::from(line.quantity);
            priced_any = true;
        }
    }

    priced_any.then_some(total)
}

/// Models often wrap JSON in markdown fences or prose; take the outermost
/// object literal.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}
