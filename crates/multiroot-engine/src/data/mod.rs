//! Data pipeline between external content and model roots.
//!
//! External data goes through a `DataProcessor` into a view tree, then is
//! upcast into model nodes for a given schema context. Serialization runs the
//! same steps in reverse.

mod conversion;
mod html;
mod view;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::ModelError;
use crate::model::{Fragment, Model, Node, Position};

pub use html::HtmlDataProcessor;
pub use view::{ViewElement, ViewFragment, ViewNode};

/// Converts raw data to a view tree and back.
pub trait DataProcessor {
    fn to_view(&self, data: &str) -> ViewFragment;

    fn to_data(&self, fragment: &ViewFragment) -> String;
}

/// Where converted content is going to be inserted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaContext {
    /// Directly inside a root: only blocks are allowed.
    #[default]
    Root,
    /// Inside a block: only inline content is allowed.
    Inline,
}

/// Entry point for moving data in and out of the model.
pub struct DataController {
    processor: Box<dyn DataProcessor>,
}

impl Default for DataController {
    fn default() -> Self {
        Self::new(HtmlDataProcessor)
    }
}

impl DataController {
    pub fn new(processor: impl DataProcessor + 'static) -> Self {
        Self {
            processor: Box::new(processor),
        }
    }

    pub fn processor(&self) -> &dyn DataProcessor {
        self.processor.as_ref()
    }

    /// Upcast a view fragment into model nodes.
    pub fn to_model(&self, view: &ViewFragment, context: SchemaContext) -> Fragment {
        Fragment::new(conversion::upcast(view, context))
    }

    /// Downcast model nodes into a view fragment.
    pub fn to_view(&self, nodes: &[Node]) -> ViewFragment {
        conversion::downcast(nodes)
    }

    /// Raw data to model nodes.
    pub fn parse(&self, data: &str, context: SchemaContext) -> Fragment {
        self.to_model(&self.processor.to_view(data), context)
    }

    /// Model nodes to raw data.
    pub fn stringify(&self, nodes: &[Node]) -> String {
        self.processor.to_data(&self.to_view(nodes))
    }

    /// Serialized content of one root.
    pub fn get(&self, model: &Model, root: &str) -> Result<String, ModelError> {
        model
            .read(|document| document.root(root).map(|r| self.stringify(r.children())))?
            .ok_or_else(|| ModelError::UnknownRoot {
                name: SmolStr::new(root),
            })
    }

    /// Load initial data into roots with one queued batch.
    ///
    /// Every root must exist; nothing is inserted otherwise.
    pub fn init(&self, model: &Model, data: &IndexMap<SmolStr, String>) -> Result<(), ModelError> {
        if let Some(missing) = data.keys().find(|name| !model.has_root(name)) {
            return Err(ModelError::UnknownRoot {
                name: missing.clone(),
            });
        }

        let parsed: Vec<(SmolStr, Fragment)> = data
            .iter()
            .map(|(name, raw)| (name.clone(), self.parse(raw, SchemaContext::Root)))
            .collect();
        debug!(roots = parsed.len(), "initializing root data");

        model.enqueue_change(move |writer| {
            for (root, fragment) in parsed {
                writer.insert(fragment, &root, Position::Offset(0))?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ROOT_ELEMENT_TYPE, Text};

    fn html(data: &str) -> String {
        let controller = DataController::default();
        controller.stringify(&controller.parse(data, SchemaContext::Root).nodes)
    }

    #[test]
    fn test_div_is_auto_paragraphed() {
        insta::assert_snapshot!(html("<div>H</div>"), @"<p>H</p>");
    }

    #[test]
    fn test_loose_text_and_blocks() {
        insta::assert_snapshot!(
            html("intro <b>bold</b><h2>Title</h2>\n  tail  "),
            @"<p>intro <strong>bold</strong></p><h2>Title</h2><p>tail</p>"
        );
    }

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        insta::assert_snapshot!(html("<p>a</p>\n\n   <p> b   c </p>"), @"<p>a</p><p>b c</p>");
    }

    #[test]
    fn test_empty_paragraph_keeps_nbsp() {
        insta::assert_snapshot!(html("<p></p>"), @"<p>&nbsp;</p>");
        insta::assert_snapshot!(html("<p>&nbsp;</p>"), @"<p>&nbsp;</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(html(""), "");
        assert_eq!(html("   \n "), "");
    }

    #[test]
    fn test_nested_styles_and_breaks() {
        insta::assert_snapshot!(
            html("<p><i><b>x</b></i> y <br> z</p>"),
            @"<p><strong><em>x</em></strong> y<br>z</p>"
        );
    }

    #[test]
    fn test_blockquote() {
        insta::assert_snapshot!(
            html("<blockquote>quoted<p>para</p></blockquote>"),
            @"<blockquote><p>quoted</p><p>para</p></blockquote>"
        );
    }

    #[test]
    fn test_inline_context() {
        let controller = DataController::default();
        let fragment = controller.parse("<p>a <em>b</em></p>", SchemaContext::Inline);
        assert_eq!(
            fragment.nodes,
            vec![
                Node::text("a "),
                Node::Text(Text::with_attributes("b", ["italic"])),
            ]
        );
    }

    #[test]
    fn test_get_and_init() {
        let model = Model::new();
        model.create_root(ROOT_ELEMENT_TYPE, "header").unwrap();
        model.create_root(ROOT_ELEMENT_TYPE, "body").unwrap();
        let controller = DataController::default();

        let mut data = IndexMap::new();
        data.insert(SmolStr::new("header"), "<h1>Head</h1>".to_owned());
        data.insert(SmolStr::new("body"), "text".to_owned());
        controller.init(&model, &data).unwrap();

        assert_eq!(controller.get(&model, "header").unwrap(), "<h1>Head</h1>");
        assert_eq!(controller.get(&model, "body").unwrap(), "<p>text</p>");
        assert_eq!(
            controller.get(&model, "footer"),
            Err(ModelError::UnknownRoot {
                name: "footer".into()
            })
        );
    }

    #[test]
    fn test_get_inside_a_block_reports_change_in_progress() {
        let model = Model::new();
        model.create_root(ROOT_ELEMENT_TYPE, "main").unwrap();
        let controller = DataController::default();

        let inside = model
            .change(|_writer| Ok(controller.get(&model, "main")))
            .unwrap();
        assert_eq!(inside, Err(ModelError::ChangeInProgress));
        assert_eq!(controller.get(&model, "main").unwrap(), "");
    }

    #[test]
    fn test_init_rejects_unknown_root() {
        let model = Model::new();
        let controller = DataController::default();
        let mut data = IndexMap::new();
        data.insert(SmolStr::new("nope"), "x".to_owned());

        assert!(controller.init(&model, &data).is_err());
        assert_eq!(model.version(), 0);
    }
}
