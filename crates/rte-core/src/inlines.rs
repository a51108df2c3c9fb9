use crate::plugin::EditorPlugin;
use crate::schema::ElementKind;

/// Declares the inline and void element types. Classification is fixed per
/// type and never changes at runtime.
pub struct InlinesPlugin;

impl EditorPlugin for InlinesPlugin {
    fn id(&self) -> &'static str {
        "inlines"
    }

    fn is_inline(&self, kind: &ElementKind) -> Option<bool> {
        Some(kind.element_type().is_inline())
    }

    fn is_void(&self, kind: &ElementKind) -> Option<bool> {
        Some(kind.element_type().is_void())
    }
}
