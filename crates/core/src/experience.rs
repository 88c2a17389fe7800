//! Repeated experience sub-form.
//!
//! [`ExperienceList`] always holds at least one entry: it starts with a
//! blank row and refuses to remove the last one.

use serde::Serialize;

use crate::error::{CoreError, FieldErrors};
use crate::submission::ExperiencePayload;
use crate::validation::{experience as rules, FieldRule};

/// The editable fields of one experience row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceField {
    Organization,
    PositionHeld,
    Years,
    Contributions,
}

impl ExperienceField {
    pub const ALL: [ExperienceField; 4] = [
        Self::Organization,
        Self::PositionHeld,
        Self::Years,
        Self::Contributions,
    ];

    /// JSON key of the field inside an experience entry.
    pub fn key(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::PositionHeld => "positionHeld",
            Self::Years => "years",
            Self::Contributions => "contributions",
        }
    }

    pub fn rule(self) -> FieldRule {
        match self {
            Self::Organization => rules::ORGANIZATION,
            Self::PositionHeld => rules::POSITION_HELD,
            Self::Years => rules::YEARS,
            Self::Contributions => rules::CONTRIBUTIONS,
        }
    }
}

/// One row of the experience editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceDraft {
    pub organization: String,
    pub position_held: String,
    pub years: String,
    pub contributions: String,
}

impl ExperienceDraft {
    pub fn get(&self, field: ExperienceField) -> &str {
        match field {
            ExperienceField::Organization => &self.organization,
            ExperienceField::PositionHeld => &self.position_held,
            ExperienceField::Years => &self.years,
            ExperienceField::Contributions => &self.contributions,
        }
    }

    fn slot(&mut self, field: ExperienceField) -> &mut String {
        match field {
            ExperienceField::Organization => &mut self.organization,
            ExperienceField::PositionHeld => &mut self.position_held,
            ExperienceField::Years => &mut self.years,
            ExperienceField::Contributions => &mut self.contributions,
        }
    }

    fn to_payload(&self) -> ExperiencePayload {
        fn opt(value: &str) -> Option<String> {
            (!value.is_empty()).then(|| value.to_string())
        }
        ExperiencePayload {
            organization: opt(&self.organization),
            years: opt(&self.years),
            position_held: opt(&self.position_held),
            contributions: opt(&self.contributions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExperienceList {
    entries: Vec<ExperienceDraft>,
}

impl Default for ExperienceList {
    fn default() -> Self {
        Self {
            entries: vec![ExperienceDraft::default()],
        }
    }
}

impl ExperienceList {
    /// A list holding one blank entry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ExperienceDraft] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ExperienceDraft> {
        self.entries.get(index)
    }

    /// Whether the remove control should be offered.
    pub fn can_remove(&self) -> bool {
        self.entries.len() > 1
    }

    /// Add a blank entry at the end and return its index.
    pub fn append_blank(&mut self) -> usize {
        self.entries.push(ExperienceDraft::default());
        self.entries.len() - 1
    }

    /// Delete the entry at `index`.
    ///
    /// Rejected when it is the only entry or the index is out of range.
    pub fn remove(&mut self, index: usize) -> Result<ExperienceDraft, CoreError> {
        if index >= self.entries.len() {
            return Err(CoreError::Validation(format!(
                "Experience entry {index} does not exist"
            )));
        }
        if !self.can_remove() {
            return Err(CoreError::Validation(
                "At least one experience entry is required".to_string(),
            ));
        }
        Ok(self.entries.remove(index))
    }

    /// Set one field of one entry.
    pub fn update(
        &mut self,
        index: usize,
        field: ExperienceField,
        value: impl Into<String>,
    ) -> Result<(), CoreError> {
        let entry = self.entries.get_mut(index).ok_or_else(|| {
            CoreError::Validation(format!("Experience entry {index} does not exist"))
        })?;
        *entry.slot(field) = value.into();
        Ok(())
    }

    /// Validate every entry independently. Keys look like
    /// `experienceList[1].years`.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (i, entry) in self.entries.iter().enumerate() {
            for field in ExperienceField::ALL {
                if let Err(violation) = field.rule().check(entry.get(field)) {
                    errors.insert(
                        format!("experienceList[{i}].{}", field.key()),
                        violation.to_string(),
                    );
                }
            }
        }
        errors
    }

    /// Presence check used for button enablement: organization and years
    /// filled in on every entry.
    pub fn is_filled(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .all(|e| !e.organization.is_empty() && !e.years.is_empty())
    }

    pub fn to_payload(&self) -> Vec<ExperiencePayload> {
        self.entries.iter().map(ExperienceDraft::to_payload).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn filled(list: &mut ExperienceList, index: usize, org: &str) {
        list.update(index, ExperienceField::Organization, org).unwrap();
        list.update(index, ExperienceField::PositionHeld, "Teacher").unwrap();
        list.update(index, ExperienceField::Years, "2020-2024").unwrap();
        list.update(index, ExperienceField::Contributions, "N/A").unwrap();
    }

    #[test]
    fn starts_with_one_blank_entry() {
        let list = ExperienceList::new();
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0), Some(&ExperienceDraft::default()));
        assert!(!list.can_remove());
    }

    #[test]
    fn append_adds_blank_entry_at_end() {
        let mut list = ExperienceList::new();
        filled(&mut list, 0, "ABC School");
        let idx = list.append_blank();
        assert_eq!(idx, 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].organization, "ABC School");
        assert_eq!(list.entries()[1], ExperienceDraft::default());
    }

    #[test]
    fn remove_last_remaining_entry_is_rejected() {
        let mut list = ExperienceList::new();
        assert_matches!(list.remove(0), Err(CoreError::Validation(_)));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_deletes_the_indexed_entry() {
        let mut list = ExperienceList::new();
        filled(&mut list, 0, "First");
        list.append_blank();
        filled(&mut list, 1, "Second");
        list.append_blank();
        filled(&mut list, 2, "Third");

        let removed = list.remove(1).unwrap();
        assert_eq!(removed.organization, "Second");
        let orgs: Vec<_> = list.entries().iter().map(|e| e.organization.as_str()).collect();
        assert_eq!(orgs, ["First", "Third"]);
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let mut list = ExperienceList::new();
        list.append_blank();
        assert!(list.remove(5).is_err());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn update_out_of_range_is_rejected() {
        let mut list = ExperienceList::new();
        assert!(list.update(3, ExperienceField::Years, "1–2 years").is_err());
    }

    #[test]
    fn blank_entry_reports_every_required_field() {
        let errors = ExperienceList::new().validate();
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get("experienceList[0].organization"),
            Some("Organization is required")
        );
        assert_eq!(errors.get("experienceList[0].years"), Some("Duration is required"));
    }

    #[test]
    fn entries_are_validated_independently() {
        let mut list = ExperienceList::new();
        filled(&mut list, 0, "ABC School");
        list.append_blank();
        list.update(1, ExperienceField::Organization, "X").unwrap();

        let errors = list.validate();
        assert!(errors.iter().all(|(k, _)| k.starts_with("experienceList[1].")));
        assert!(errors.contains("experienceList[1].organization"));
    }

    #[test]
    fn payload_omits_empty_optional_fields() {
        let mut list = ExperienceList::new();
        list.update(0, ExperienceField::Organization, "ABC School").unwrap();
        list.update(0, ExperienceField::Years, "3–4 years").unwrap();
        let payload = list.to_payload();
        assert_eq!(payload[0].organization.as_deref(), Some("ABC School"));
        assert_eq!(payload[0].position_held, None);
        assert!(list.is_filled());
    }
}
