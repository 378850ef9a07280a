#![forbid(unsafe_code)]

//! Module templates, placed instances, and their identities.
//!
//! Templates and instances live in separate identity spaces. [`TemplateId`]
//! is whatever the template store assigned; [`InstanceId`] is the originating
//! template plus a factory sequence number. The two are distinct types, so an
//! instance id can never be looked up in the library by accident.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity of a library template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Separator reserved for instance ids.
    pub const RESERVED: char = '#';

    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is non-blank and does not contain the instance
    /// separator.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.trim().is_empty() && !self.0.contains(Self::RESERVED)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TemplateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identity of one placement in the schedule.
///
/// Renders as `<template>#<seq>`, e.g. `T1#3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId {
    template: TemplateId,
    seq: u64,
}

impl InstanceId {
    #[must_use]
    pub fn new(template: TemplateId, seq: u64) -> Self {
        Self { template, seq }
    }

    /// Template this instance was cloned from.
    #[must_use]
    pub fn template(&self) -> &TemplateId {
        &self.template
    }

    /// Factory sequence number.
    #[must_use]
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.template, TemplateId::RESERVED, self.seq)
    }
}

/// Error parsing an [`InstanceId`] from its string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed instance id: {0:?}")]
pub struct InstanceIdParseError(pub String);

impl FromStr for InstanceId {
    type Err = InstanceIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (template, seq) = s
            .rsplit_once(TemplateId::RESERVED)
            .ok_or_else(|| InstanceIdParseError(s.to_owned()))?;
        let template = TemplateId::new(template);
        if !template.is_well_formed() {
            return Err(InstanceIdParseError(s.to_owned()));
        }
        let seq = seq
            .parse::<u64>()
            .map_err(|_| InstanceIdParseError(s.to_owned()))?;
        Ok(Self { template, seq })
    }
}

impl TryFrom<String> for InstanceId {
    type Error = InstanceIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.to_string()
    }
}

/// Optional numeric training attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainingAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Display and training attributes shared by templates and instances.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleFields {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(flatten)]
    pub training: TrainingAttributes,
}

impl ModuleFields {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            subcategory: None,
            training: TrainingAttributes::default(),
        }
    }

    #[must_use]
    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    #[must_use]
    pub fn with_training(mut self, training: TrainingAttributes) -> Self {
        self.training = training;
        self
    }
}

/// A reusable module definition stored in the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleTemplate {
    pub id: TemplateId,
    #[serde(flatten)]
    pub fields: ModuleFields,
}

impl ModuleTemplate {
    #[must_use]
    pub fn new(id: impl Into<TemplateId>, fields: ModuleFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// A placement of a template in one day.
///
/// Holds its own copy of the fields; nothing links it back to the template
/// after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInstance {
    pub id: InstanceId,
    #[serde(flatten)]
    pub fields: ModuleFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_id_round_trips_through_string() {
        let id = InstanceId::new(TemplateId::new("T1"), 7);
        assert_eq!(id.to_string(), "T1#7");
        assert_eq!("T1#7".parse::<InstanceId>(), Ok(id));
    }

    #[test]
    fn instance_id_rejects_garbage() {
        assert!("T1".parse::<InstanceId>().is_err());
        assert!("#3".parse::<InstanceId>().is_err());
        assert!("T1#x".parse::<InstanceId>().is_err());
        assert!("A#B#3".parse::<InstanceId>().is_err());
    }

    #[test]
    fn template_id_well_formed() {
        assert!(TemplateId::new("threshold-run").is_well_formed());
        assert!(!TemplateId::new("  ").is_well_formed());
        assert!(!TemplateId::new("T1#2").is_well_formed());
    }

    #[test]
    fn template_serializes_flat() {
        let template = ModuleTemplate::new(
            "T1",
            ModuleFields::new("Threshold Run", "3x10min", "run").with_training(
                TrainingAttributes {
                    distance: Some(12.0),
                    ..TrainingAttributes::default()
                },
            ),
        );
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["id"], "T1");
        assert_eq!(json["title"], "Threshold Run");
        assert_eq!(json["distance"], 12.0);
        assert!(json.get("weight").is_none());
    }
}
