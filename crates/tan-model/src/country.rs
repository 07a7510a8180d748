//! Country display name → storage code lookup.
//!
//! The asset store keys sites by ISO 3166-1 alpha-2 codes while filter
//! specs carry display names. Resolution is case-insensitive; names not
//! in the table pass through unchanged so a query degrades to a literal
//! code comparison instead of failing outright.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Display names the filter UI is known to send, paired with their
/// storage codes. Extend here when a trial opens sites in a new country.
const COUNTRIES: &[(&str, &str)] = &[
    ("Australia", "AU"),
    ("Austria", "AT"),
    ("Belgium", "BE"),
    ("Brazil", "BR"),
    ("Canada", "CA"),
    ("China", "CN"),
    ("Czech Republic", "CZ"),
    ("Denmark", "DK"),
    ("Finland", "FI"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Hungary", "HU"),
    ("India", "IN"),
    ("Israel", "IL"),
    ("Italy", "IT"),
    ("Japan", "JP"),
    ("Mexico", "MX"),
    ("Netherlands", "NL"),
    ("New Zealand", "NZ"),
    ("Norway", "NO"),
    ("Poland", "PL"),
    ("Portugal", "PT"),
    ("South Africa", "ZA"),
    ("South Korea", "KR"),
    ("Spain", "ES"),
    ("Sweden", "SE"),
    ("Switzerland", "CH"),
    ("Taiwan", "TW"),
    ("United Kingdom", "GB"),
    ("United States", "US"),
];

static BY_NAME: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    COUNTRIES
        .iter()
        .map(|(name, code)| (name.to_ascii_uppercase(), *code))
        .collect()
});

/// Look up the storage code for a display name, case-insensitively.
pub fn code_for(name: &str) -> Option<&'static str> {
    BY_NAME.get(&name.trim().to_ascii_uppercase()).copied()
}

/// Resolve a display name to its storage code, passing unknown names
/// through unchanged (treated as literal codes).
pub fn resolve(name: &str) -> String {
    match code_for(name) {
        Some(code) => code.to_string(),
        None => name.trim().to_string(),
    }
}
