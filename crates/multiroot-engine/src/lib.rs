//! multiroot-engine: the engine-side collaborators of the multi-root editor.
//!
//! This crate provides:
//! - `Emitter` / `Observable` - single-threaded change notification
//! - `Container` - caller-owned external content holders
//! - `Model` - document model with named roots and queued, exclusive writers
//! - `DataController` - HTML ⇄ model conversion scoped to a root context
//! - `EditingView` - DOM root attachment and placeholder bookkeeping

pub mod data;
pub mod editing;
pub mod element;
pub mod error;
pub mod model;
pub mod observable;

pub use data::{
    DataController, DataProcessor, HtmlDataProcessor, SchemaContext, ViewElement, ViewFragment,
    ViewNode,
};
pub use editing::{DomRoot, EditingView};
pub use element::{Container, ElementId};
pub use error::ModelError;
pub use model::{
    Document, Element, Fragment, Model, Node, Position, ROOT_ELEMENT_TYPE, RootElement, RootRange,
    Text, Writer,
};
pub use observable::{Emitter, Observable, SubscriptionId};
pub use smol_str::SmolStr;
