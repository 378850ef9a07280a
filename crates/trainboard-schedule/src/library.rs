#![forbid(unsafe_code)]

//! The module template library.

use crate::error::LibraryError;
use crate::module::{ModuleTemplate, TemplateId};

/// Reusable module templates in insertion order, unique by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleLibrary {
    templates: Vec<ModuleTemplate>,
}

impl ModuleLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from an initial load, rejecting duplicate or
    /// malformed ids.
    pub fn from_templates(
        templates: impl IntoIterator<Item = ModuleTemplate>,
    ) -> Result<Self, LibraryError> {
        let mut library = Self::new();
        for template in templates {
            library.insert(template)?;
        }
        Ok(library)
    }

    pub fn insert(&mut self, template: ModuleTemplate) -> Result<(), LibraryError> {
        if !template.id.is_well_formed() {
            return Err(LibraryError::InvalidId(template.id));
        }
        if self.contains(&template.id) {
            return Err(LibraryError::Duplicate(template.id));
        }
        self.templates.push(template);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &TemplateId) -> Option<&ModuleTemplate> {
        self.templates.iter().find(|template| &template.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &TemplateId) -> bool {
        self.get(id).is_some()
    }

    /// Replace the template with the same id, returning the previous value.
    pub fn replace(&mut self, template: ModuleTemplate) -> Result<ModuleTemplate, LibraryError> {
        let slot = self
            .templates
            .iter_mut()
            .find(|existing| existing.id == template.id)
            .ok_or_else(|| LibraryError::Unknown(template.id.clone()))?;
        Ok(std::mem::replace(slot, template))
    }

    pub fn remove(&mut self, id: &TemplateId) -> Option<ModuleTemplate> {
        let pos = self.templates.iter().position(|template| &template.id == id)?;
        Some(self.templates.remove(pos))
    }

    /// Templates matching `query`, in library order.
    ///
    /// Matching is a case-insensitive substring test against title,
    /// description, category and subcategory. A blank query matches all.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&ModuleTemplate> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.templates.iter().collect();
        }
        self.templates
            .iter()
            .filter(|template| {
                let fields = &template.fields;
                [
                    Some(fields.title.as_str()),
                    Some(fields.description.as_str()),
                    Some(fields.category.as_str()),
                    fields.subcategory.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|text| text.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .templates
            .iter()
            .map(|template| template.fields.category.as_str())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleTemplate> {
        self.templates.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
