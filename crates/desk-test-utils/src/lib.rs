//! Testing utilities for the desk workspace
//!
//! Shared schema fixture, structure factories, intent params and call
//! recorders for resolver functions and intent checks.

#![allow(missing_docs)]

use desk_schema::{Schema, TypeDef};
use desk_structure::{
    DocumentBuilder, DocumentNodeOptions, IntentChecker, IntentParams, StructureBuilder, StructureContext,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Schema with `book`, `movie`, `author` and `settings` document types
pub fn mock_schema() -> Arc<Schema> {
    let schema = Schema::compile([
        TypeDef::named("book", "document")
            .with_title("Book")
            .with_field(TypeDef::named("title", "string")),
        TypeDef::named("movie", "document")
            .with_title("Movie")
            .with_field(TypeDef::named("title", "string")),
        TypeDef::named("author", "document")
            .with_title("Author")
            .with_field(TypeDef::named("name", "string")),
        TypeDef::named("settings", "document")
            .with_title("Settings")
            .with_field(TypeDef::named("toggle", "boolean")),
    ])
    .unwrap();
    Arc::new(schema)
}

pub fn context() -> Arc<StructureContext> {
    Arc::new(StructureContext::new(mock_schema()))
}

/// Context whose default document nodes come from `hook`
pub fn context_with_document_node<F>(hook: F) -> Arc<StructureContext>
where
    F: Fn(&StructureBuilder, &DocumentNodeOptions) -> Option<DocumentBuilder> + Send + Sync + 'static,
{
    Arc::new(StructureContext::new(mock_schema()).with_default_document_node(hook))
}

pub fn structure() -> StructureBuilder {
    StructureBuilder::new(context())
}

pub fn structure_for(context: &Arc<StructureContext>) -> StructureBuilder {
    StructureBuilder::new(Arc::clone(context))
}

/// `{id, type}` params of an edit intent
pub fn edit_params(id: &str, type_name: &str) -> IntentParams {
    IntentParams::new().with("id", id).with("type", type_name)
}

/// Records calls made from inside resolver functions or intent checks
#[derive(Debug)]
pub struct CallRecorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for CallRecorder<T> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for CallRecorder<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> CallRecorder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: T) {
        self.calls.lock().push(call);
    }

    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().len()
    }
}

/// Arguments an intent check was called with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentCall {
    pub intent: String,
    pub params: IntentParams,
    pub index: usize,
}

/// Intent check answering `result`, recording every call
pub fn recording_checker(result: bool) -> (IntentChecker, CallRecorder<IntentCall>) {
    let recorder = CallRecorder::new();
    let calls = recorder.clone();
    let checker = IntentChecker::new(move |intent, params, ctx| {
        calls.record(IntentCall {
            intent: intent.to_string(),
            params: params.clone(),
            index: ctx.index,
        });
        result
    });
    (checker, recorder)
}
