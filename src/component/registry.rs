//! Explicit component kind registry
//!
//! The registry maps template kind names to component factories. It is a
//! plain value constructed once at startup and handed to the builder, so
//! there is no global mutable state; embedders can register their own kinds
//! next to the built-in catalogue.

use std::collections::BTreeMap;

use super::{
    BarcodeComponent, CircleComponent, Component, ComponentError, DatetimeComponent,
    ImageComponent, LoadContext, RectangleComponent, TextComponent,
};

/// Constructor decoding one template entry into a component.
pub type ComponentFactory =
    fn(&LoadContext, &serde_json::Value) -> Result<Box<dyn Component>, ComponentError>;

/// Kind name to factory table. Lookup is case-insensitive over the
/// registered aliases.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// A registry with no kinds at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// The built-in catalogue: circle, rectangle, image, text, datetime and
    /// barcode, plus their common aliases.
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::empty();
        let builtin: [(&[&str], ComponentFactory); 6] = [
            (&["circle"], CircleComponent::from_document),
            (&["rectangle", "rect"], RectangleComponent::from_document),
            (&["image", "photo"], ImageComponent::from_document),
            (&["text", "words", "writing"], TextComponent::from_document),
            (&["datetime", "date"], DatetimeComponent::from_document),
            (&["barcode"], BarcodeComponent::from_document),
        ];
        for (names, factory) in builtin {
            for &name in names {
                registry
                    .register(name, factory)
                    .expect("built-in kinds are distinct");
            }
        }
        registry
    }

    /// Add a kind under a new name; duplicate names are an error.
    pub fn register(
        &mut self,
        name: &str,
        factory: ComponentFactory,
    ) -> Result<(), ComponentError> {
        let key = name.to_lowercase();
        if self.factories.contains_key(&key) {
            return Err(ComponentError::DuplicateKind {
                name: name.to_string(),
            });
        }
        self.factories.insert(key, factory);
        Ok(())
    }

    /// Look up the factory for a template kind name.
    pub fn decode(&self, name: &str) -> Result<ComponentFactory, ComponentError> {
        self.factories
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| ComponentError::UnknownKind {
                name: name.to_string(),
            })
    }

    /// All registered kind names, in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtin_kinds()
    }
}
