//! Agent layer - LLM collaborators and session orchestration
//!
//! This crate is the conversational "brain" of quartermaster:
//! - Classifies each user message (chat vs building-requirements request)
//! - Calls the LLM collaborators (chat completion, building analysis)
//! - Runs model responses through the directive engine in `quartermaster-core`
//! - Owns the per-session state machine (chat / building-analysis / bom-preview)
//!
//! # Architecture
//!
//! One turn is one serialized pass:
//! 1. **Classification** (`classify`) - keyword heuristics over the user text
//! 2. **Collaborator call** (`llm`, `analysis`) - the only suspension point
//! 3. **Directive pipeline** - scan, validate, execute, strip (core crate)
//! 4. **History append** - exactly one assistant message per turn
//!
//! # Key Types
//!
//! - `SessionOrchestrator` - turn sequencing and state transitions (`session`)
//! - `LlmClient` - pluggable chat-completion trait with an HTTP implementation
//! - `BuildingAnalyst` - turns requirements prose into a bill of materials
//!
//! # Safety Principle
//!
//! The LLM proposes; the engine disposes. Model text can request quote
//! mutations only through the strict directive grammar, and every directive
//! is revalidated and bounded before any side effect runs.

pub mod analysis;
pub mod classify;
pub mod llm;
pub mod session;
