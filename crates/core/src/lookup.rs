//! Department / section / school reference data and the dependent dropdown
//! resolver built on it.
//!
//! The table is a strongly typed three-level mapping loaded from JSON and
//! validated once at load time. All resolver functions are pure lookups;
//! resetting stale child selections is the draft's job (see
//! [`crate::draft::FormDraft::apply_field_change`]).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Stored name of the placeholder section used by departments without sections.
pub const NO_SECTION: &str = "(No Section)";

/// How [`NO_SECTION`] is shown in the section dropdown.
pub const NO_SECTION_DISPLAY: &str = "—";

/// Reference data bundled with the crate.
const BUNDLED_LOOKUP: &str = include_str!("../data/org_lookup.json");

/// Map a displayed section value back to its stored name.
pub fn normalize_section(display: &str) -> &str {
    if display.is_empty() || display == NO_SECTION_DISPLAY {
        NO_SECTION
    } else {
        display
    }
}

fn display_section(name: &str) -> String {
    if name == NO_SECTION {
        NO_SECTION_DISPLAY.to_string()
    } else {
        name.to_string()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Where a school or office is located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub school: String,
    pub location: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(default)]
    pub schools: Vec<String>,
    /// Department-specific placements. `None` defers to the shared,
    /// section-keyed placements of the table.
    #[serde(default)]
    pub placements: Option<Vec<Placement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    departments: Vec<Department>,
    /// Department-agnostic placements keyed by section name.
    #[serde(default)]
    shared_placements: BTreeMap<String, Vec<Placement>>,
}

/// Auto-filled, read-only fields derived from a school selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocationCountry {
    pub location: String,
    pub country: String,
}

/// Everything the Part A dropdowns need for the current selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependentOptions {
    pub departments: Vec<String>,
    pub sections: Vec<String>,
    pub section_enabled: bool,
    pub schools: Vec<String>,
    pub school_enabled: bool,
}

impl LookupTable {
    /// Parse and validate a table from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let table: LookupTable = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid lookup table: {e}")))?;
        table.validate()?;
        Ok(table)
    }

    /// The reference data shipped with the crate.
    pub fn bundled() -> Result<Self, CoreError> {
        Self::from_json(BUNDLED_LOOKUP)
    }

    /// Structural checks: names are non-empty and unique at each level,
    /// placements name a school.
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut departments = HashSet::new();
        for dept in &self.departments {
            if dept.name.trim().is_empty() {
                return Err(CoreError::Validation(
                    "Lookup table contains a department with an empty name".to_string(),
                ));
            }
            if !departments.insert(dept.name.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate department '{}' in lookup table",
                    dept.name
                )));
            }

            let mut sections = HashSet::new();
            for section in &dept.sections {
                if section.name.trim().is_empty() {
                    return Err(CoreError::Validation(format!(
                        "Department '{}' has a section with an empty name",
                        dept.name
                    )));
                }
                if !sections.insert(section.name.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "Duplicate section '{}' in department '{}'",
                        section.name, dept.name
                    )));
                }

                let mut schools = HashSet::new();
                for school in &section.schools {
                    if school.trim().is_empty() || !schools.insert(school.as_str()) {
                        return Err(CoreError::Validation(format!(
                            "Invalid or duplicate school '{school}' in {} / {}",
                            dept.name, section.name
                        )));
                    }
                }
                if let Some(placements) = &section.placements {
                    validate_placements(placements, &section.name)?;
                }
            }
        }

        for (section, placements) in &self.shared_placements {
            validate_placements(placements, section)?;
        }
        Ok(())
    }

    /// All department names, in table order.
    pub fn departments(&self) -> Vec<String> {
        self.departments.iter().map(|d| d.name.clone()).collect()
    }

    fn department(&self, name: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.name == name)
    }

    fn section(&self, department: &str, section: &str) -> Option<&Section> {
        let stored = normalize_section(section);
        self.department(department)?
            .sections
            .iter()
            .find(|s| s.name == stored)
    }

    pub fn has_department(&self, department: &str) -> bool {
        self.department(department).is_some()
    }

    /// Whether `section` (canonical or display form) belongs to `department`.
    pub fn has_section(&self, department: &str, section: &str) -> bool {
        self.section(department, section).is_some()
    }

    pub fn has_school(&self, department: &str, section: &str, school: &str) -> bool {
        self.section(department, section)
            .is_some_and(|s| s.schools.iter().any(|name| name == school))
    }

    /// Sections offered for `department`, with [`NO_SECTION`] shown as
    /// [`NO_SECTION_DISPLAY`]. Empty when the department is unset or unknown.
    pub fn sections_for(&self, department: &str) -> Vec<String> {
        if department.is_empty() {
            return Vec::new();
        }
        self.department(department)
            .map(|d| d.sections.iter().map(|s| display_section(&s.name)).collect())
            .unwrap_or_default()
    }

    /// Schools offered for a department/section pair. Empty when either is unset.
    pub fn schools_for(&self, department: &str, section: &str) -> Vec<String> {
        if department.is_empty() || section.is_empty() {
            return Vec::new();
        }
        self.section(department, section)
            .map(|s| s.schools.clone())
            .unwrap_or_default()
    }

    /// Location and country for a school.
    ///
    /// Department-specific placements are consulted first; when the
    /// department/section pair defines none, the shared placements for the
    /// section are used. Returns empty strings when nothing matches or any
    /// input is unset.
    pub fn location_country_for(
        &self,
        department: &str,
        section: &str,
        school: &str,
    ) -> LocationCountry {
        if department.is_empty() || section.is_empty() || school.is_empty() {
            return LocationCountry::default();
        }

        let stored = normalize_section(section);
        let placements = self
            .section(department, section)
            .and_then(|s| s.placements.as_deref())
            .or_else(|| self.shared_placements.get(stored).map(Vec::as_slice))
            .unwrap_or_default();

        placements
            .iter()
            .find(|p| p.school == school)
            .map(|p| LocationCountry {
                location: p.location.clone(),
                country: p.country.clone(),
            })
            .unwrap_or_default()
    }

    /// Resolve every dependent option list for the given selections.
    pub fn options_for(&self, department: &str, section: &str) -> DependentOptions {
        let sections = self.sections_for(department);
        let schools = self.schools_for(department, section);
        DependentOptions {
            departments: self.departments(),
            section_enabled: !sections.is_empty(),
            school_enabled: !department.is_empty() && !section.is_empty(),
            sections,
            schools,
        }
    }
}

fn validate_placements(placements: &[Placement], section: &str) -> Result<(), CoreError> {
    if placements.iter().any(|p| p.school.trim().is_empty()) {
        return Err(CoreError::Validation(format!(
            "Placement without a school in section '{section}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
