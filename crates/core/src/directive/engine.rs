use tracing::debug;

use crate::diagnostics::{DiagnosticSink, DroppedDirective};
use crate::domain::inventory::InventoryLookup;
use crate::domain::quote::QuoteSink;

use super::executor::ActionExecutor;
use super::sanitize::strip_spans;
use super::scanner::DirectiveScanner;
use super::validate::{validate, Command};

/// Outcome of one engine pass over a model response. Owned by the turn that
/// produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    pub executed_commands: Vec<Command>,
    pub cleaned_text: String,
}

/// Runs the full scan -> validate -> execute -> strip pipeline over one
/// model response. Recognized directive spans are stripped from the display
/// text whether or not their command validated or executed; a rejected or
/// skipped directive never aborts the rest of the message.
pub fn process_response(
    text: &str,
    inventory: &dyn InventoryLookup,
    quote: &mut dyn QuoteSink,
    diagnostics: &dyn DiagnosticSink,
) -> ExecutionResult {
    let mut spans = Vec::new();
    let mut commands = Vec::new();

    for raw in DirectiveScanner::new(text) {
        spans.push(raw.span.clone());
        match validate(&raw) {
            Ok(command) => commands.push(command),
            Err(rejection) => {
                debug!(
                    event_name = "directive.validation_rejected",
                    kind = raw.kind.keyword(),
                    reason = %rejection,
                    "directive dropped"
                );
                diagnostics.report(DroppedDirective::validation_rejected(&rejection));
            }
        }
    }

    let executed_commands = ActionExecutor::new(inventory).execute(commands, quote, diagnostics);
    let cleaned_text = strip_spans(text, &spans);

    ExecutionResult { executed_commands, cleaned_text }
}
