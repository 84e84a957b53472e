//! Template documents and the orchestration that renders them
//!
//! A template is a JSON document: a base image section plus an ordered
//! array of components, each carrying a conditional gate and a kind-opaque
//! properties object. Every property field is textual, which is what lets
//! the whole resolver protocol treat literals and `$variable$` references
//! uniformly.

mod builder;

use serde::Deserialize;

use crate::conditional::Conditional;

pub use builder::{BuildError, Builder, GatedComponent};

/// Top-level template document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateDoc {
    #[serde(rename = "baseImage")]
    pub base_image: BaseImageDoc,
    pub components: Vec<ComponentDoc>,
}

/// The base layer of the canvas: a file, inline data, or a flat colour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BaseImageDoc {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub data: String,
    #[serde(rename = "baseColour")]
    pub base_colour: BaseColourDoc,
    pub width: String,
    pub height: String,
    pub ppi: String,
}

/// Flat colour channels for a generated base layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BaseColourDoc {
    #[serde(rename = "R")]
    pub red: String,
    #[serde(rename = "G")]
    pub green: String,
    #[serde(rename = "B")]
    pub blue: String,
    #[serde(rename = "A")]
    pub alpha: String,
}

/// One template entry: a kind name, its render gate, and the raw
/// properties object the kind will decode itself.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ComponentDoc {
    #[serde(rename = "type")]
    pub kind: String,
    pub conditional: Conditional,
    pub properties: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_template_document_decodes() {
        let json = r#"{
            "baseImage": {
                "baseColour": {"R": "255", "G": "255", "B": "255", "A": "255"},
                "width": "100",
                "height": "50"
            },
            "components": [
                {
                    "type": "circle",
                    "conditional": {"name": "tier", "operator": "equals", "value": "gold"},
                    "properties": {"centreX": "10"}
                }
            ]
        }"#;
        let doc: TemplateDoc = serde_json::from_str(json).expect("Should decode");
        assert_eq!(doc.base_image.width, "100");
        assert_eq!(doc.components.len(), 1);
        assert_eq!(doc.components[0].kind, "circle");
        assert_eq!(doc.components[0].conditional.name, "tier");
        assert_eq!(doc.components[0].properties["centreX"], "10");
    }

    #[test]
    fn test_missing_conditional_defaults_to_wildcard() {
        let json = r#"{"components": [{"type": "rect", "properties": {}}]}"#;
        let doc: TemplateDoc = serde_json::from_str(json).expect("Should decode");
        assert_eq!(doc.components[0].conditional, Conditional::wildcard());
    }
}
