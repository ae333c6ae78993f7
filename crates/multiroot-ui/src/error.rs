//! Error types for the UI layer.

use miette::Diagnostic;
use multiroot_engine::ElementId;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UiError {
    /// The focus tracker already tracks this element.
    #[error("element {element} is already tracked by the focus tracker")]
    #[diagnostic(code(multiroot::ui::already_tracked))]
    AlreadyTracked { element: ElementId },

    /// A view can only be rendered once.
    #[error("view `{view}` has already been rendered")]
    #[diagnostic(
        code(multiroot::ui::already_rendered),
        help("register new children into the rendered hierarchy instead")
    )]
    AlreadyRendered { view: SmolStr },

    /// Binding requested before the model root exists.
    #[error("cannot bind root `{name}`: the model root does not exist")]
    #[diagnostic(code(multiroot::ui::missing_model_root))]
    MissingModelRoot { name: SmolStr },

    /// No binding for this root name.
    #[error("root `{name}` is not bound to the UI")]
    #[diagnostic(code(multiroot::ui::unknown_root))]
    UnknownRoot { name: SmolStr },

    /// The root is already registered.
    #[error("root `{name}` is already registered in the UI")]
    #[diagnostic(code(multiroot::ui::duplicate_root))]
    DuplicateRoot { name: SmolStr },

    /// The container already hosts another root.
    #[error("container of root `{name}` already hosts root `{holder}`")]
    #[diagnostic(
        code(multiroot::ui::container_in_use),
        help("give every root its own container")
    )]
    ContainerInUse { name: SmolStr, holder: SmolStr },

    /// A component with this name is already registered.
    #[error("component `{name}` is already registered")]
    #[diagnostic(code(multiroot::ui::component_exists))]
    ComponentExists { name: SmolStr },

    /// No component with this name is registered.
    #[error("component `{name}` is not available")]
    #[diagnostic(code(multiroot::ui::unknown_component))]
    UnknownComponent { name: SmolStr },

    /// The registries disagree about a root.
    #[error("root `{name}` is inconsistent: {reason}")]
    #[diagnostic(code(multiroot::ui::inconsistent))]
    Inconsistent { name: SmolStr, reason: &'static str },
}
