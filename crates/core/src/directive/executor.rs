use tracing::debug;

use crate::diagnostics::{DiagnosticSink, DroppedDirective};
use crate::domain::inventory::InventoryLookup;
use crate::domain::quote::QuoteSink;

use super::validate::Command;

/// Applies validated commands against a borrowed inventory lookup and the
/// caller's quote mutation capabilities. Holds no state of its own.
pub struct ActionExecutor<'a> {
    inventory: &'a dyn InventoryLookup,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(inventory: &'a dyn InventoryLookup) -> Self {
        Self { inventory }
    }

    /// Executes commands in the order given (discovery order) and returns
    /// the ones that actually ran. Each command is invoked at most once; a
    /// lookup miss skips silently and is only diagnosed.
    pub fn execute(
        &self,
        commands: Vec<Command>,
        quote: &mut dyn QuoteSink,
        diagnostics: &dyn DiagnosticSink,
    ) -> Vec<Command> {
        let mut executed = Vec::with_capacity(commands.len());
        for command in commands {
            match &command {
                Command::AddToQuote { sku, quantity } => match self.inventory.find(sku) {
                    Some(item) => {
                        quote.add_to_quote(item, *quantity);
                        executed.push(command);
                    }
                    None => {
                        debug!(
                            event_name = "directive.lookup_miss",
                            sku = %sku,
                            "add directive skipped: sku has no catalog match"
                        );
                        diagnostics.report(DroppedDirective::lookup_miss(sku));
                    }
                },
                Command::RemoveFromQuote { sku } => {
                    // a remove on a non-present sku is a safe no-op at the
                    // quote layer, so no existence check
                    quote.remove_from_quote(sku);
                    executed.push(command);
                }
            }
        }
        executed
    }
}
