//! Category Mappings
//!
//! Bidirectional lookup tables between the integer codes used on the wire
//! and the labels shown to users.
//!
//! The tables are process-wide and read-only. A replacement table set is
//! built and validated off to the side, then swapped in as a whole, so
//! readers always observe a forward/reverse pair that agree.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use thiserror::Error;

/// Integer code for a categorical value
pub type Code = i64;

/// Categorical domains known to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    HomeOwnership,
    LoanIntent,
    LoanGrade,
    DefaultOnFile,
    LoanStatus,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::HomeOwnership,
        Domain::LoanIntent,
        Domain::LoanGrade,
        Domain::DefaultOnFile,
        Domain::LoanStatus,
    ];

    /// Config/CLI key for this domain
    pub fn key(&self) -> &'static str {
        match self {
            Domain::HomeOwnership => "home_ownership",
            Domain::LoanIntent => "loan_intent",
            Domain::LoanGrade => "loan_grade",
            Domain::DefaultOnFile => "default_on_file",
            Domain::LoanStatus => "loan_status",
        }
    }

    pub fn from_key(key: &str) -> Option<Domain> {
        Domain::ALL
            .into_iter()
            .find(|d| d.key() == key || d.key().replace('_', "-") == key)
    }

    fn builtin(&self) -> &'static [(Code, &'static str)] {
        match self {
            Domain::HomeOwnership => &[(0, "OWN"), (1, "MORTGAGE"), (2, "RENT"), (3, "OTHER")],
            Domain::LoanIntent => &[
                (0, "EDUCATION"),
                (1, "MEDICAL"),
                (2, "VENTURE"),
                (3, "PERSONAL"),
                (4, "HOMEIMPROVEMENT"),
                (5, "DEBTCONSOLIDATION"),
            ],
            Domain::LoanGrade => &[
                (0, "A"),
                (1, "B"),
                (2, "C"),
                (3, "D"),
                (4, "E"),
                (5, "F"),
                (6, "G"),
            ],
            Domain::DefaultOnFile => &[(0, "N"), (1, "Y")],
            Domain::LoanStatus => &[(0, "Non-Default"), (1, "Default")],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors raised while building mapping tables
#[derive(Error, Debug, PartialEq)]
pub enum MappingError {
    #[error("duplicate code {code} in {domain} table")]
    DuplicateCode { domain: Domain, code: Code },

    #[error("label {label:?} is used by more than one code in {domain} table")]
    DuplicateLabel { domain: Domain, label: String },

    #[error("invalid code {code:?} in {domain} table")]
    InvalidCode { domain: Domain, code: String },

    #[error("unknown mapping domain: {0}")]
    UnknownDomain(String),
}

/// One code ↔ label table
#[derive(Debug, Clone)]
pub struct CategoryTable {
    domain: Domain,
    // Code order is kept for select options and listings
    entries: Vec<(Code, String)>,
    forward: HashMap<Code, String>,
    reverse: HashMap<String, Code>,
}

impl CategoryTable {
    /// Build a table, rejecting duplicate codes and labels.
    pub fn new<I, S>(domain: Domain, entries: I) -> Result<Self, MappingError>
    where
        I: IntoIterator<Item = (Code, S)>,
        S: Into<String>,
    {
        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();
        let mut ordered = Vec::new();

        for (code, label) in entries {
            let label = label.into();
            if forward.contains_key(&code) {
                return Err(MappingError::DuplicateCode { domain, code });
            }
            if reverse.contains_key(&label) {
                return Err(MappingError::DuplicateLabel { domain, label });
            }
            forward.insert(code, label.clone());
            reverse.insert(label.clone(), code);
            ordered.push((code, label));
        }

        ordered.sort_by_key(|(code, _)| *code);

        Ok(Self {
            domain,
            entries: ordered,
            forward,
            reverse,
        })
    }

    fn builtin(domain: Domain) -> Self {
        let entries = domain.builtin().iter().map(|(c, l)| (*c, *l));
        // Built-in tables are injective
        match Self::new(domain, entries) {
            Ok(table) => table,
            Err(e) => unreachable!("built-in {} table is invalid: {}", domain, e),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn label(&self, code: Code) -> Option<&str> {
        self.forward.get(&code).map(String::as_str)
    }

    pub fn code(&self, label: &str) -> Option<Code> {
        self.reverse.get(label).copied()
    }

    pub fn contains(&self, code: Code) -> bool {
        self.forward.contains_key(&code)
    }

    /// Entries in ascending code order
    pub fn entries(&self) -> impl Iterator<Item = (Code, &str)> {
        self.entries.iter().map(|(c, l)| (*c, l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full set of category tables
#[derive(Debug, Clone)]
pub struct Mappings {
    home_ownership: CategoryTable,
    loan_intent: CategoryTable,
    loan_grade: CategoryTable,
    default_on_file: CategoryTable,
    loan_status: CategoryTable,
}

impl Default for Mappings {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Mappings {
    /// The tables the scoring API was trained with
    pub fn builtin() -> Self {
        Self {
            home_ownership: CategoryTable::builtin(Domain::HomeOwnership),
            loan_intent: CategoryTable::builtin(Domain::LoanIntent),
            loan_grade: CategoryTable::builtin(Domain::LoanGrade),
            default_on_file: CategoryTable::builtin(Domain::DefaultOnFile),
            loan_status: CategoryTable::builtin(Domain::LoanStatus),
        }
    }

    pub fn table(&self, domain: Domain) -> &CategoryTable {
        match domain {
            Domain::HomeOwnership => &self.home_ownership,
            Domain::LoanIntent => &self.loan_intent,
            Domain::LoanGrade => &self.loan_grade,
            Domain::DefaultOnFile => &self.default_on_file,
            Domain::LoanStatus => &self.loan_status,
        }
    }

    pub fn label(&self, domain: Domain, code: Code) -> Option<&str> {
        self.table(domain).label(code)
    }

    pub fn code(&self, domain: Domain, label: &str) -> Option<Code> {
        self.table(domain).code(label)
    }

    /// Label for display, falling back to the raw code when unmapped
    pub fn display(&self, domain: Domain, code: Code) -> String {
        self.label(domain, code)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string())
    }

    /// Return a copy with one table replaced
    pub fn with_table(mut self, table: CategoryTable) -> Self {
        match table.domain() {
            Domain::HomeOwnership => self.home_ownership = table,
            Domain::LoanIntent => self.loan_intent = table,
            Domain::LoanGrade => self.loan_grade = table,
            Domain::DefaultOnFile => self.default_on_file = table,
            Domain::LoanStatus => self.loan_status = table,
        }
        self
    }

    /// Build a table set from config overrides (`domain -> code -> label`).
    ///
    /// Domains not mentioned keep their built-in table.
    pub fn with_overrides(
        overrides: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<Self, MappingError> {
        let mut mappings = Self::builtin();

        for (key, entries) in overrides {
            let domain =
                Domain::from_key(key).ok_or_else(|| MappingError::UnknownDomain(key.clone()))?;

            let mut parsed = Vec::with_capacity(entries.len());
            for (code, label) in entries {
                let code = code
                    .trim()
                    .parse::<Code>()
                    .map_err(|_| MappingError::InvalidCode {
                        domain,
                        code: code.clone(),
                    })?;
                parsed.push((code, label.clone()));
            }

            mappings = mappings.with_table(CategoryTable::new(domain, parsed)?);
        }

        Ok(mappings)
    }
}

fn registry() -> &'static RwLock<Arc<Mappings>> {
    static REGISTRY: OnceLock<RwLock<Arc<Mappings>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Arc::new(Mappings::builtin())))
}

/// Current process-wide tables
pub fn mappings() -> Arc<Mappings> {
    let guard = match registry().read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    Arc::clone(&guard)
}

/// Swap in a new table set, returning the previous one.
pub fn replace_mappings(next: Mappings) -> Arc<Mappings> {
    let mut guard = match registry().write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    tracing::info!("Installing replacement category mappings");
    std::mem::replace(&mut *guard, Arc::new(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_of_forward_is_identity() {
        let mappings = Mappings::builtin();
        for domain in Domain::ALL {
            let table = mappings.table(domain);
            assert!(!table.is_empty());
            for (code, label) in table.entries() {
                assert_eq!(table.code(label), Some(code), "{} {}", domain, label);
            }
        }
    }

    #[test]
    fn test_builtin_labels() {
        let mappings = Mappings::builtin();
        assert_eq!(mappings.label(Domain::HomeOwnership, 1), Some("MORTGAGE"));
        assert_eq!(mappings.label(Domain::LoanIntent, 5), Some("DEBTCONSOLIDATION"));
        assert_eq!(mappings.label(Domain::LoanGrade, 6), Some("G"));
        assert_eq!(mappings.label(Domain::DefaultOnFile, 1), Some("Y"));
        assert_eq!(mappings.label(Domain::LoanStatus, 0), Some("Non-Default"));
        assert_eq!(mappings.code(Domain::LoanGrade, "C"), Some(2));
    }

    #[test]
    fn test_unknown_lookups_return_none() {
        let mappings = Mappings::builtin();
        assert_eq!(mappings.label(Domain::LoanGrade, 42), None);
        assert_eq!(mappings.code(Domain::LoanGrade, "Z"), None);
        assert_eq!(mappings.display(Domain::LoanGrade, 42), "42");
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let err = CategoryTable::new(Domain::LoanStatus, vec![(0, "Paid"), (1, "Paid")])
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::DuplicateLabel {
                domain: Domain::LoanStatus,
                label: "Paid".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let err = CategoryTable::new(Domain::LoanStatus, vec![(0, "Paid"), (0, "Late")])
            .unwrap_err();
        assert!(matches!(err, MappingError::DuplicateCode { code: 0, .. }));
    }

    #[test]
    fn test_overrides_replace_whole_table() {
        let mut overrides = BTreeMap::new();
        let mut status = BTreeMap::new();
        status.insert("0".to_string(), "Repaid".to_string());
        status.insert("1".to_string(), "Charged Off".to_string());
        overrides.insert("loan_status".to_string(), status);

        let mappings = Mappings::with_overrides(&overrides).unwrap();
        assert_eq!(mappings.label(Domain::LoanStatus, 1), Some("Charged Off"));
        assert_eq!(mappings.code(Domain::LoanStatus, "Default"), None);
        // Untouched domains keep their built-in tables
        assert_eq!(mappings.label(Domain::LoanGrade, 0), Some("A"));
    }

    #[test]
    fn test_overrides_reject_bad_input() {
        let mut overrides = BTreeMap::new();
        overrides.insert("colour".to_string(), BTreeMap::new());
        assert_eq!(
            Mappings::with_overrides(&overrides).unwrap_err(),
            MappingError::UnknownDomain("colour".to_string())
        );

        let mut overrides = BTreeMap::new();
        let mut grades = BTreeMap::new();
        grades.insert("first".to_string(), "A".to_string());
        overrides.insert("loan-grade".to_string(), grades);
        assert!(matches!(
            Mappings::with_overrides(&overrides).unwrap_err(),
            MappingError::InvalidCode { .. }
        ));
    }

    #[test]
    fn test_entries_sorted_by_code() {
        let table = CategoryTable::new(Domain::DefaultOnFile, vec![(1, "Y"), (0, "N")]).unwrap();
        let codes: Vec<Code> = table.entries().map(|(c, _)| c).collect();
        assert_eq!(codes, vec![0, 1]);
    }

    #[test]
    fn test_replace_swaps_whole_set() {
        let before = mappings();
        let previous = replace_mappings(Mappings::builtin());
        assert_eq!(
            previous.label(Domain::LoanGrade, 0),
            before.label(Domain::LoanGrade, 0)
        );
        // Handles taken before the swap stay internally consistent
        assert_eq!(before.code(Domain::LoanGrade, "A"), Some(0));
        assert_eq!(mappings().label(Domain::LoanGrade, 0), Some("A"));
    }
}
