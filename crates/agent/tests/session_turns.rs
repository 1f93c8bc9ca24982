use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;

use quartermaster_agent::analysis::BuildingAnalyst;
use quartermaster_agent::llm::LlmClient;
use quartermaster_agent::session::{AnalysisMode, SessionOrchestrator};
use quartermaster_core::diagnostics::{DropStage, InMemoryDiagnosticSink};
use quartermaster_core::domain::bom::{BillOfMaterials, BomLineItem};
use quartermaster_core::domain::inventory::{Catalog, InventoryItem, Sku};
use quartermaster_core::domain::message::MessageRole;
use quartermaster_core::domain::quote::Quote;

/// Replays canned model responses in order; panics if the conversation asks
/// for more turns than were scripted.
struct ScriptedLlm {
    responses: Mutex<Vec<&'static str>>,
}

impl ScriptedLlm {
    fn new(mut responses: Vec<&'static str>) -> Self {
        responses.reverse();
        Self { responses: Mutex::new(responses) }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        let mut responses = self.responses.lock().expect("script lock");
        responses.pop().map(|text| text.to_string()).ok_or_else(|| anyhow!("script exhausted"))
    }
}

struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("connection reset by peer"))
    }
}

struct FixedAnalyst(BillOfMaterials);

#[async_trait]
impl BuildingAnalyst for FixedAnalyst {
    async fn analyze(&self, _requirements: &str) -> Result<BillOfMaterials> {
        Ok(self.0.clone())
    }
}

struct FailingAnalyst;

#[async_trait]
impl BuildingAnalyst for FailingAnalyst {
    async fn analyze(&self, _requirements: &str) -> Result<BillOfMaterials> {
        Err(anyhow!("analysis endpoint returned 502"))
    }
}

fn catalog() -> Catalog {
    Catalog::new(
        [("ITEM-1", "Claw hammer", 12_50), ("ITEM-2", "Box of nails", 3_99)]
            .into_iter()
            .map(|(id, name, cents)| InventoryItem {
                id: Sku::parse(id).expect("fixture sku"),
                name: name.to_string(),
                description: String::new(),
                unit_price: Decimal::new(cents, 2),
            })
            .collect(),
    )
}

fn bom_line(sku: &str, quantity: u32) -> BomLineItem {
    BomLineItem {
        sku: sku.to_string(),
        description: String::new(),
        quantity,
        confidence: 0.9,
        reasoning: String::new(),
    }
}

#[tokio::test]
async fn chat_turn_executes_directives_and_appends_clean_text() {
    let mut orchestrator = SessionOrchestrator::new(
        ScriptedLlm::new(vec![
            "Add these: [ACTION:ADD_TO_QUOTE, SKU:ITEM-1, QUANTITY:1] and \
             [ACTION:ADD_TO_QUOTE, SKU:ITEM-2, QUANTITY:2]",
        ]),
        FixedAnalyst(BillOfMaterials::default()),
        catalog(),
    );
    let mut quote = Quote::default();

    let reply = orchestrator
        .handle_send_message("I need a hammer and some nails", &mut quote)
        .await
        .expect("turn completes");

    assert_eq!(reply.message.text, "Add these: and");
    assert_eq!(reply.executed_commands.len(), 2);
    assert_eq!(reply.executed_commands[0].sku().as_str(), "ITEM-1");
    assert_eq!(reply.executed_commands[1].sku().as_str(), "ITEM-2");

    assert_eq!(quote.lines.len(), 2);
    assert_eq!(quote.lines[0].quantity, 1);
    assert_eq!(quote.lines[1].quantity, 2);

    let history = &orchestrator.session().history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[1].role, MessageRole::Assistant);
    assert_eq!(history[1].text, "Add these: and");
}

#[tokio::test]
async fn hostile_directive_payload_is_neutralized_end_to_end() {
    let diagnostics = InMemoryDiagnosticSink::default();
    let mut orchestrator = SessionOrchestrator::with_diagnostics(
        ScriptedLlm::new(vec![
            "Done! [ACTION:ADD_TO_QUOTE, SKU:../../../etc/passwd, QUANTITY:1]",
        ]),
        FixedAnalyst(BillOfMaterials::default()),
        catalog(),
        diagnostics.clone(),
    );
    let mut quote = Quote::default();

    let reply =
        orchestrator.handle_send_message("add that thing", &mut quote).await.expect("turn");

    assert!(reply.executed_commands.is_empty());
    assert_eq!(reply.message.text, "Done!");
    assert!(quote.lines.is_empty());

    let drops = diagnostics.drops();
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].stage, DropStage::ValidationRejected);
}

#[tokio::test]
async fn failed_chat_collaborator_yields_one_apology_message() {
    let mut orchestrator = SessionOrchestrator::new(
        FailingLlm,
        FixedAnalyst(BillOfMaterials::default()),
        catalog(),
    );
    let mut quote = Quote::default();

    let reply = orchestrator.handle_send_message("hello", &mut quote).await.expect("turn");

    assert!(reply.message.text.starts_with("Sorry"));
    assert!(!reply.message.text.contains("connection reset"));
    assert!(reply.executed_commands.is_empty());
    assert_eq!(orchestrator.session().history.len(), 2);
}

#[tokio::test]
async fn failed_analysis_reverts_to_chat_with_a_single_apology() {
    let mut orchestrator = SessionOrchestrator::new(FailingLlm, FailingAnalyst, catalog());
    let mut quote = Quote::default();

    let reply = orchestrator
        .handle_send_message("I want to build a deck", &mut quote)
        .await
        .expect("turn completes despite collaborator failure");

    assert_eq!(orchestrator.session().analysis_mode, AnalysisMode::Chat);
    assert!(orchestrator.session().pending_bom.is_none());
    assert!(reply.message.text.starts_with("Sorry"));
    assert!(!reply.message.text.contains("502"));

    let assistant_messages = orchestrator
        .session()
        .history
        .iter()
        .filter(|message| message.role == MessageRole::Assistant)
        .count();
    assert_eq!(assistant_messages, 1);
}

#[tokio::test]
async fn bill_of_materials_journey_previews_then_bulk_adds() {
    let bill = BillOfMaterials {
        line_items: vec![
            bom_line("ITEM-1", 1),
            bom_line("ITEM-2", 4),
            bom_line("not-a-sku", 2),
            bom_line("ITEM-404", 1),
        ],
        estimated_total: None,
    };
    let diagnostics = InMemoryDiagnosticSink::default();
    let mut orchestrator = SessionOrchestrator::with_diagnostics(
        ScriptedLlm::new(vec![]),
        FixedAnalyst(bill),
        catalog(),
        diagnostics.clone(),
    );
    let mut quote = Quote::default();

    let preview = orchestrator
        .handle_send_message("what do I need to build a small shed?", &mut quote)
        .await
        .expect("analysis turn");

    assert_eq!(orchestrator.session().analysis_mode, AnalysisMode::BomPreview);
    assert!(orchestrator.session().pending_bom.is_some());
    assert!(preview.message.text.contains("ITEM-1 x1"));
    assert!(quote.lines.is_empty(), "preview must not touch the quote");

    let accepted = orchestrator
        .handle_send_message("yes, add them all", &mut quote)
        .await
        .expect("accept turn");

    assert_eq!(orchestrator.session().analysis_mode, AnalysisMode::Chat);
    assert!(orchestrator.session().pending_bom.is_none());
    assert_eq!(accepted.executed_commands.len(), 2);
    assert_eq!(accepted.message.text, "Added 2 of the 4 recommended items to your quote.");

    assert_eq!(quote.lines.len(), 2);
    assert_eq!(quote.lines[0].sku.as_str(), "ITEM-1");
    assert_eq!(quote.lines[1].sku.as_str(), "ITEM-2");
    assert_eq!(quote.lines[1].quantity, 4);

    // one malformed sku, one catalog miss
    let drops = diagnostics.drops();
    assert_eq!(drops.len(), 2);
    assert_eq!(drops[0].stage, DropStage::ValidationRejected);
    assert_eq!(drops[1].stage, DropStage::LookupMiss);
}

#[tokio::test]
async fn empty_analysis_result_returns_to_chat_without_a_preview() {
    let mut orchestrator = SessionOrchestrator::new(
        ScriptedLlm::new(vec![]),
        FixedAnalyst(BillOfMaterials::default()),
        catalog(),
    );
    let mut quote = Quote::default();

    let reply = orchestrator
        .handle_send_message("I'm building a spaceship", &mut quote)
        .await
        .expect("turn");

    assert_eq!(orchestrator.session().analysis_mode, AnalysisMode::Chat);
    assert!(orchestrator.session().pending_bom.is_none());
    assert!(reply.message.text.contains("couldn't match"));
}

#[tokio::test]
async fn directive_free_chat_replies_pass_through_trimmed() {
    let mut orchestrator = SessionOrchestrator::new(
        ScriptedLlm::new(vec!["  We open at 8am on weekdays.  "]),
        FixedAnalyst(BillOfMaterials::default()),
        catalog(),
    );
    let mut quote = Quote::default();

    let reply =
        orchestrator.handle_send_message("when do you open?", &mut quote).await.expect("turn");

    assert_eq!(reply.message.text, "We open at 8am on weekdays.");
    assert!(reply.executed_commands.is_empty());
    assert!(quote.lines.is_empty());
}
