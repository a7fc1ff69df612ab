//! ID formatting helpers.
//!
//! Cohort and participant IDs are derived, not random: a cohort is addressed
//! by `(study, cohort_number)` and a participant by `(cohort, position)`.
//! Reusing a cohort number would collide on the primary key, which is what
//! keeps cohort numbering gap-free and unique per study.

/// Format a cohort ID. Returns e.g. `"s1-cohort-2"`.
#[must_use]
pub fn cohort_id(study_id: &str, cohort_number: u32) -> String {
    format!("{study_id}-cohort-{cohort_number}")
}

/// Format a participant ID within a cohort. Returns e.g. `"s1-cohort-2-p0"`.
#[must_use]
pub fn participant_id(cohort_id: &str, index: usize) -> String {
    format!("{cohort_id}-p{index}")
}

/// Initials for a display name: first letter of the first and last words.
///
/// `"Sarah M."` → `"SM"`, `"Prince"` → `"P"`.
#[must_use]
pub fn initials(display_name: &str) -> String {
    let mut words = display_name.split_whitespace();
    let first = words.next().and_then(|w| w.chars().next());
    let last = words.last().and_then(|w| w.chars().next());
    first
        .into_iter()
        .chain(last)
        .flat_map(char::to_uppercase)
        .collect()
}
