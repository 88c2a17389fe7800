//! Field validation rules for the submission form.
//!
//! Each rule is built from a human-readable label and produces a
//! [`RuleViolation`] describing exactly what failed, so callers can render
//! a specific message next to the offending field. Rules never touch the
//! draft; they only look at the value they are given.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::upload::FileMeta;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Minimum length of a required single-line text field.
pub const TEXT_MIN_LEN: usize = 2;

/// Maximum length of a required single-line text field.
pub const TEXT_MAX_LEN: usize = 100;

/// Uploaded CV files must be strictly smaller than this many bytes (5 MiB).
pub const MAX_CV_BYTES: u64 = 5 * 1024 * 1024;

/// File extensions offered by the CV picker, compared case-insensitively.
pub const ACCEPTED_CV_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// Literal values accepted by the "or N/A" rules regardless of length.
const NOT_APPLICABLE: &[&str] = &["n/a", "na"];

/// Whether `value` is one of the accepted "not applicable" spellings.
pub fn is_not_applicable(value: &str) -> bool {
    NOT_APPLICABLE
        .iter()
        .any(|na| value.eq_ignore_ascii_case(na))
}

// ---------------------------------------------------------------------------
// Rule kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    TextRequired,
    TextRequiredOrNa,
    SelectRequired,
    TextareaOptional { max: usize },
    TextareaRequired { min: usize, max: usize },
    TextareaRequiredOrNa { min: usize, max: usize },
}

/// A validation rule bound to a field label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub label: &'static str,
    pub kind: RuleKind,
}

impl FieldRule {
    /// Required text between [`TEXT_MIN_LEN`] and [`TEXT_MAX_LEN`] characters.
    pub const fn text_required(label: &'static str) -> Self {
        Self {
            label,
            kind: RuleKind::TextRequired,
        }
    }

    /// Like [`FieldRule::text_required`], but "N/A" / "NA" always pass the
    /// minimum length check.
    pub const fn text_required_or_na(label: &'static str) -> Self {
        Self {
            label,
            kind: RuleKind::TextRequiredOrNa,
        }
    }

    /// An option must be chosen.
    pub const fn select_required(label: &'static str) -> Self {
        Self {
            label,
            kind: RuleKind::SelectRequired,
        }
    }

    /// Free text that only fails when longer than `max`.
    pub const fn textarea_optional(label: &'static str, max: usize) -> Self {
        Self {
            label,
            kind: RuleKind::TextareaOptional { max },
        }
    }

    pub const fn textarea_required(label: &'static str, min: usize, max: usize) -> Self {
        Self {
            label,
            kind: RuleKind::TextareaRequired { min, max },
        }
    }

    pub const fn textarea_required_or_na(label: &'static str, min: usize, max: usize) -> Self {
        Self {
            label,
            kind: RuleKind::TextareaRequiredOrNa { min, max },
        }
    }

    /// Whether an empty value fails this rule.
    pub fn is_required(&self) -> bool {
        !matches!(self.kind, RuleKind::TextareaOptional { .. })
    }

    /// Check `value` against this rule.
    ///
    /// Lengths are counted in characters, not bytes.
    pub fn check(&self, value: &str) -> Result<(), RuleViolation> {
        let label = self.label;
        let len = value.chars().count();

        match self.kind {
            RuleKind::SelectRequired => {
                if value.is_empty() {
                    return Err(RuleViolation::NotSelected { label });
                }
                Ok(())
            }
            RuleKind::TextareaOptional { max } => check_max(label, len, max),
            RuleKind::TextRequired => check_bounded(label, value, TEXT_MIN_LEN, TEXT_MAX_LEN, false),
            RuleKind::TextRequiredOrNa => {
                check_bounded(label, value, TEXT_MIN_LEN, TEXT_MAX_LEN, true)
            }
            RuleKind::TextareaRequired { min, max } => check_bounded(label, value, min, max, false),
            RuleKind::TextareaRequiredOrNa { min, max } => {
                check_bounded(label, value, min, max, true)
            }
        }
    }
}

fn check_bounded(
    label: &'static str,
    value: &str,
    min: usize,
    max: usize,
    na_allowed: bool,
) -> Result<(), RuleViolation> {
    if value.is_empty() {
        return Err(RuleViolation::Required { label });
    }
    let len = value.chars().count();
    if len < min && !(na_allowed && is_not_applicable(value)) {
        return Err(RuleViolation::TooShort {
            label,
            min,
            na_allowed,
        });
    }
    check_max(label, len, max)
}

fn check_max(label: &'static str, len: usize, max: usize) -> Result<(), RuleViolation> {
    if len > max {
        return Err(RuleViolation::TooLong { label, max });
    }
    Ok(())
}

/// The CV file rule: a file must be chosen, carry one of
/// [`ACCEPTED_CV_EXTENSIONS`] and be smaller than [`MAX_CV_BYTES`].
pub fn check_file(file: Option<&FileMeta>) -> Result<(), RuleViolation> {
    match file {
        None => Err(RuleViolation::FileMissing),
        Some(f) if !has_accepted_extension(&f.name) => Err(RuleViolation::FileType),
        Some(f) if f.size >= MAX_CV_BYTES => Err(RuleViolation::FileTooLarge {
            size: f.size,
            limit: MAX_CV_BYTES,
        }),
        Some(_) => Ok(()),
    }
}

fn has_accepted_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_CV_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// Why a value failed its rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RuleViolation {
    Required {
        label: &'static str,
    },
    NotSelected {
        label: &'static str,
    },
    TooShort {
        label: &'static str,
        min: usize,
        na_allowed: bool,
    },
    TooLong {
        label: &'static str,
        max: usize,
    },
    FileMissing,
    FileType,
    FileTooLarge {
        size: u64,
        limit: u64,
    },
    UploadPending,
    ConsentRequired,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { label } => write!(f, "{label} is required"),
            Self::NotSelected { label } => write!(f, "Please select a {}", label.to_lowercase()),
            Self::TooShort {
                label,
                min,
                na_allowed: false,
            } => write!(f, "{label} must be at least {min} characters"),
            Self::TooShort {
                label,
                min,
                na_allowed: true,
            } => write!(f, "{label} must be at least {min} characters or \"N/A\""),
            Self::TooLong { label, max } => write!(f, "{label} must be less than {max} characters"),
            Self::FileMissing => f.write_str("Please upload your CV"),
            Self::FileType => f.write_str("Please upload a PDF or Word document"),
            Self::FileTooLarge { .. } => f.write_str("File must be under 5MB"),
            Self::UploadPending => f.write_str("Please wait for your CV to finish uploading"),
            Self::ConsentRequired => f.write_str("You must consent to the processing of your data"),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped schemas
// ---------------------------------------------------------------------------

/// Part A: job and personal data.
pub mod personal {
    use super::FieldRule;

    pub const NAME: FieldRule = FieldRule::text_required("Name");
    pub const JOB_TITLE: FieldRule = FieldRule::text_required("Job Title");
    pub const JOB_TYPE: FieldRule = FieldRule::select_required("Job Type");
    pub const SUPERVISOR: FieldRule = FieldRule::text_required("Supervisor");
    pub const DEPARTMENT: FieldRule = FieldRule::text_required("Department");
    pub const SECTION: FieldRule = FieldRule::text_required("Section");
}

/// Part B: education and skills.
pub mod education {
    use super::FieldRule;

    pub const EDUCATION_LEVEL: FieldRule = FieldRule::select_required("Education level");
    pub const QUALIFICATIONS: FieldRule = FieldRule::textarea_optional("Qualifications", 500);
    pub const OTHER_EDUCATION: FieldRule = FieldRule::textarea_optional("Other education", 300);
    pub const OTHER_SKILLS: FieldRule = FieldRule::textarea_optional("Other skills", 500);
}

/// Part C: one professional experience entry.
pub mod experience {
    use super::FieldRule;

    pub const ORGANIZATION: FieldRule = FieldRule::text_required_or_na("Organization");
    pub const POSITION_HELD: FieldRule = FieldRule::text_required_or_na("Position Held");
    pub const YEARS: FieldRule = FieldRule::text_required_or_na("Duration");
    pub const CONTRIBUTIONS: FieldRule = FieldRule::textarea_required_or_na("Contributions", 3, 500);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
