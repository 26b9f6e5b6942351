//! free-form `{name, value}` annotations carried by reports, pages and visuals

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    pub value: String,
}

impl Annotation {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Keyed access to a document's annotation list. Keys are case-sensitive.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn annotations_mut(&mut self) -> &mut Vec<Annotation>;

    fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations()
            .iter()
            .find(|a| a.name == key)
            .map(|a| a.value.as_str())
    }

    /// update the annotation in place, or append it if the key is new
    fn set_annotation(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        let annotations = self.annotations_mut();
        match annotations.iter().position(|a| a.name == key) {
            Some(index) => annotations[index].value = value,
            None => annotations.push(Annotation::new(key, value)),
        }
    }

    fn annotation_keys(&self) -> Vec<&str> {
        self.annotations().iter().map(|a| a.name.as_str()).collect()
    }

    /// remove an annotation, returning its value
    fn remove_annotation(&mut self, key: &str) -> Option<String> {
        let annotations = self.annotations_mut();
        let index = annotations.iter().position(|a| a.name == key)?;
        Some(annotations.remove(index).value)
    }
}

macro_rules! impl_annotated {
    ($($kind:ty),+ $(,)?) => {
        $(
            impl Annotated for $kind {
                fn annotations(&self) -> &[Annotation] {
                    &self.annotations
                }

                fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
                    &mut self.annotations
                }
            }
        )+
    };
}

impl_annotated!(
    crate::document::kinds::Report,
    crate::document::kinds::Page,
    crate::document::kinds::VisualContainer,
);
