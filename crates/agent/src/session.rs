use thiserror::Error;
use tracing::{info, warn};

use quartermaster_core::diagnostics::{DiagnosticSink, DroppedDirective, NullDiagnosticSink};
use quartermaster_core::directive::engine::process_response;
use quartermaster_core::directive::executor::ActionExecutor;
use quartermaster_core::directive::validate::Command;
use quartermaster_core::domain::bom::BillOfMaterials;
use quartermaster_core::domain::inventory::Catalog;
use quartermaster_core::domain::message::{Message, MessageRole};
use quartermaster_core::domain::quote::QuoteSink;

use crate::analysis::BuildingAnalyst;
use crate::classify::{classify_preview_reply, classify_turn, PreviewReply, TurnKind};
use crate::llm::LlmClient;

/// The only error surfaced to the user verbatim; collaborator causes go to
/// the log, never to chat.
const APOLOGY_TEXT: &str =
    "Sorry - something went wrong while handling that. Please try again.";

const EMPTY_BOM_TEXT: &str = "I couldn't match that project to anything in our catalog. \
     Could you describe it a bit differently?";

const BOM_DISMISSED_TEXT: &str =
    "No problem, I've set that list aside. Anything else I can help with?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalysisMode {
    Chat,
    BuildingAnalysis,
    BomPreview,
}

/// Per-conversation state, owned exclusively by the orchestrator. Mutation
/// happens only on the single serialized turn path; there is no module-level
/// or cross-session shared state.
#[derive(Clone, Debug)]
pub struct Session {
    pub analysis_mode: AnalysisMode,
    pub history: Vec<Message>,
    pub pending_bom: Option<BillOfMaterials>,
    turn_in_flight: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            analysis_mode: AnalysisMode::Chat,
            history: Vec::new(),
            pending_bom: None,
            turn_in_flight: false,
        }
    }

    fn try_begin_turn(&mut self) -> bool {
        if self.turn_in_flight {
            return false;
        }
        self.turn_in_flight = true;
        true
    }

    fn end_turn(&mut self) {
        self.turn_in_flight = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("a turn is already in flight for this session")]
    TurnInFlight,
}

/// What one completed turn handed back to the caller: the single assistant
/// message appended to history, plus the commands that actually ran.
#[derive(Clone, Debug)]
pub struct TurnReply {
    pub message: Message,
    pub executed_commands: Vec<Command>,
}

pub struct SessionOrchestrator<C, A, D = NullDiagnosticSink> {
    chat_client: C,
    analyst: A,
    catalog: Catalog,
    diagnostics: D,
    session: Session,
}

impl<C, A> SessionOrchestrator<C, A, NullDiagnosticSink>
where
    C: LlmClient,
    A: BuildingAnalyst,
{
    pub fn new(chat_client: C, analyst: A, catalog: Catalog) -> Self {
        Self::with_diagnostics(chat_client, analyst, catalog, NullDiagnosticSink)
    }
}

impl<C, A, D> SessionOrchestrator<C, A, D>
where
    C: LlmClient,
    A: BuildingAnalyst,
    D: DiagnosticSink,
{
    pub fn with_diagnostics(chat_client: C, analyst: A, catalog: Catalog, diagnostics: D) -> Self {
        Self { chat_client, analyst, catalog, diagnostics, session: Session::new() }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one complete turn: classify, call the collaborator, apply the
    /// directive pipeline, and append exactly one assistant message whether
    /// the turn succeeded or failed. Turns are serialized; a call while one
    /// is in flight is rejected rather than interleaved.
    pub async fn handle_send_message(
        &mut self,
        user_text: &str,
        quote: &mut dyn QuoteSink,
    ) -> Result<TurnReply, TurnError> {
        if !self.session.try_begin_turn() {
            return Err(TurnError::TurnInFlight);
        }

        self.session.history.push(Message::user(user_text));
        let reply = match self.session.analysis_mode {
            AnalysisMode::BomPreview => self.bom_preview_turn(user_text, quote).await,
            AnalysisMode::Chat | AnalysisMode::BuildingAnalysis => {
                match classify_turn(user_text) {
                    TurnKind::BuildingAnalysis => self.building_analysis_turn(user_text).await,
                    TurnKind::Chat => self.chat_turn(quote).await,
                }
            }
        };
        self.session.history.push(reply.message.clone());

        self.session.end_turn();
        Ok(reply)
    }

    async fn chat_turn(&mut self, quote: &mut dyn QuoteSink) -> TurnReply {
        let prompt = render_chat_prompt(&self.catalog, &self.session.history);
        let raw = match self.chat_client.complete(&prompt).await {
            Ok(raw) => raw,
            Err(error) => return self.apology_reply("chat", &error),
        };

        let result = process_response(&raw, &self.catalog, quote, &self.diagnostics);
        info!(
            event_name = "session.chat_turn_completed",
            executed_commands = result.executed_commands.len(),
            "chat turn completed"
        );
        TurnReply {
            message: Message::assistant(result.cleaned_text),
            executed_commands: result.executed_commands,
        }
    }

    /// Building-analysis turns bypass directive parsing entirely; the analyst
    /// output becomes a pending bill of materials instead.
    async fn building_analysis_turn(&mut self, user_text: &str) -> TurnReply {
        self.session.analysis_mode = AnalysisMode::BuildingAnalysis;

        let bom = match self.analyst.analyze(user_text).await {
            Ok(bom) => bom,
            Err(error) => return self.apology_reply("analysis", &error),
        };

        if bom.is_empty() {
            self.session.analysis_mode = AnalysisMode::Chat;
            return TurnReply {
                message: Message::assistant(EMPTY_BOM_TEXT),
                executed_commands: Vec::new(),
            };
        }

        info!(
            event_name = "session.analysis_turn_completed",
            line_items = bom.line_items.len(),
            "building analysis produced a bill of materials"
        );
        let summary = bom_summary(&bom);
        self.session.pending_bom = Some(bom);
        self.session.analysis_mode = AnalysisMode::BomPreview;
        TurnReply { message: Message::assistant(summary), executed_commands: Vec::new() }
    }

    async fn bom_preview_turn(&mut self, user_text: &str, quote: &mut dyn QuoteSink) -> TurnReply {
        match classify_preview_reply(user_text) {
            PreviewReply::DismissBom => {
                self.session.pending_bom = None;
                self.session.analysis_mode = AnalysisMode::Chat;
                TurnReply {
                    message: Message::assistant(BOM_DISMISSED_TEXT),
                    executed_commands: Vec::new(),
                }
            }
            PreviewReply::AcceptBom => {
                let bom = self.session.pending_bom.take().unwrap_or_default();
                let total_lines = bom.line_items.len();
                let commands = self.bom_commands(&bom);
                let executed = ActionExecutor::new(&self.catalog).execute(
                    commands,
                    quote,
                    &self.diagnostics,
                );
                self.session.analysis_mode = AnalysisMode::Chat;
                info!(
                    event_name = "session.bom_accepted",
                    added = executed.len(),
                    recommended = total_lines,
                    "bill of materials added to quote"
                );

                let text = format!(
                    "Added {} of the {} recommended items to your quote.",
                    executed.len(),
                    total_lines
                );
                TurnReply { message: Message::assistant(text), executed_commands: executed }
            }
            // anything else is served as a normal chat turn; the preview
            // stays pending
            PreviewReply::Other => self.chat_turn(quote).await,
        }
    }

    /// Bill line items go through the same SKU and quantity policy as scanned
    /// directives; lines that fail are dropped onto the diagnostics channel.
    fn bom_commands(&self, bom: &BillOfMaterials) -> Vec<Command> {
        let mut commands = Vec::with_capacity(bom.line_items.len());
        for line in &bom.line_items {
            match Command::add_to_quote(&line.sku, line.quantity) {
                Ok(command) => commands.push(command),
                Err(rejection) => {
                    self.diagnostics.report(DroppedDirective::validation_rejected(&rejection));
                }
            }
        }
        commands
    }

    fn apology_reply(&mut self, collaborator: &str, error: &anyhow::Error) -> TurnReply {
        warn!(
            event_name = "session.collaborator_failed",
            collaborator,
            error = %error,
            "turn failed; replying with a generic apology"
        );
        // a failed analysis must never strand the session mid-analysis; a
        // failed chat turn keeps whatever mode it ran under
        if self.session.analysis_mode == AnalysisMode::BuildingAnalysis {
            self.session.analysis_mode = AnalysisMode::Chat;
        }
        TurnReply { message: Message::assistant(APOLOGY_TEXT), executed_commands: Vec::new() }
    }
}

fn render_chat_prompt(catalog: &Catalog, history: &[Message]) -> String {
    let mut catalog_listing = String::new();
    for item in catalog.items() {
        catalog_listing
            .push_str(&format!("- {} | {} | {} each\n", item.id, item.name, item.unit_price));
    }

    let mut transcript = String::new();
    for message in history {
        let speaker = match message.role {
            MessageRole::User => "Customer",
            MessageRole::Assistant => "Assistant",
        };
        transcript.push_str(&format!("{speaker}: {}\n", message.text));
    }

    format!(
        "You are a helpful hardware store assistant. Recommend items from the \
         catalog and manage the customer's quote.\n\
         \n\
         Catalog (sku | name | unit price):\n{catalog_listing}\n\
         To add an item to the quote, include exactly:\n\
         [ACTION:ADD_TO_QUOTE, SKU:<sku>, QUANTITY:<integer>]\n\
         To remove an item, include exactly:\n\
         [ACTION:REMOVE_FROM_QUOTE, SKU:<sku>]\n\
         Quantities must be between 1 and 1000. Keep the rest of your reply \
         conversational; the bracketed directives are removed before display.\n\
         \n\
         Conversation so far:\n{transcript}\
         Assistant:"
    )
}

fn bom_summary(bom: &BillOfMaterials) -> String {
    let mut summary = String::from("Here's what I'd recommend for that project:\n");
    for line in &bom.line_items {
        summary.push_str(&format!("- {} x{}", line.sku, line.quantity));
        if !line.description.is_empty() {
            summary.push_str(&format!(" ({})", line.description));
        }
        summary.push('\n');
    }
    if let Some(total) = &bom.estimated_total {
        summary.push_str(&format!("Estimated total: {total}\n"));
    }
    summary.push_str("Want me to add these to your quote?");
    summary
}
