pub mod config;
pub mod diagnostics;
pub mod directive;
pub mod domain;

pub use diagnostics::{
    DiagnosticSink, DropStage, DroppedDirective, InMemoryDiagnosticSink, NullDiagnosticSink,
};
pub use directive::engine::{process_response, ExecutionResult};
pub use directive::executor::ActionExecutor;
pub use directive::scanner::{DirectiveKind, DirectiveScanner, RawDirective};
pub use directive::validate::{validate, Command, DirectiveRejection, MAX_DIRECTIVE_QUANTITY};
pub use domain::bom::{BillOfMaterials, BomLineItem};
pub use domain::inventory::{Catalog, CatalogLoadError, InventoryItem, InventoryLookup, Sku};
pub use domain::message::{Message, MessageRole};
pub use domain::quote::{Quote, QuoteLine, QuoteSink};
