//! Process name patterns and the matcher that applies them.

use serde::{Deserialize, Serialize};

use super::{ProcessRecord, SelfIdentity};
use crate::error::{Error, Result};

/// Wildcard marker accepted at either end of a pattern.
const WILDCARD: char = '*';

// ============================================================================
// MatchMode
// ============================================================================

/// How a pattern's fixed text is compared against a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    /// `name`: the whole candidate must equal the text.
    Exact,
    /// `name*`: the candidate must start with the text.
    PrefixOf,
    /// `*name`: the candidate must end with the text.
    SuffixOf,
    /// `*name*`: the candidate must contain the text.
    Contains,
}

// ============================================================================
// MatchPattern
// ============================================================================

/// A compiled, case-insensitive name pattern.
///
/// Serializes as its source form (`cursor helper*`) and is re-parsed on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchPattern {
    mode: MatchMode,
    /// Lower-cased text with the wildcard markers stripped.
    text: String,
}

impl MatchPattern {
    /// Compile a pattern such as `cursor`, `cursor*`, `*helper` or `*cursor*`.
    ///
    /// A lone `*` compiles to `Contains("")` and matches everything.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::Config("pattern must not be empty".to_string()));
        }

        let leading = raw.starts_with(WILDCARD);
        let trailing = raw.len() > 1 && raw.ends_with(WILDCARD);
        let text = raw.trim_matches(WILDCARD);

        if text.contains(WILDCARD) {
            return Err(Error::Config(format!(
                "pattern '{}' may only use '*' at its start or end",
                raw
            )));
        }

        let mode = match (leading, trailing) {
            (true, true) => MatchMode::Contains,
            (false, true) => MatchMode::PrefixOf,
            (true, false) if text.is_empty() => MatchMode::Contains,
            (true, false) => MatchMode::SuffixOf,
            (false, false) => MatchMode::Exact,
        };

        Ok(Self {
            mode,
            text: text.to_lowercase(),
        })
    }

    /// The compiled match mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The lower-cased fixed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check a candidate string against this pattern, ignoring case.
    pub fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.to_lowercase();
        match self.mode {
            MatchMode::Exact => candidate == self.text,
            MatchMode::PrefixOf => candidate.starts_with(&self.text),
            MatchMode::SuffixOf => candidate.ends_with(&self.text),
            MatchMode::Contains => candidate.contains(&self.text),
        }
    }
}

impl std::str::FromStr for MatchPattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MatchPattern {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<MatchPattern> for String {
    fn from(pattern: MatchPattern) -> Self {
        pattern.to_string()
    }
}

impl std::fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            MatchMode::Exact => write!(f, "{}", self.text),
            MatchMode::PrefixOf => write!(f, "{}*", self.text),
            MatchMode::SuffixOf => write!(f, "*{}", self.text),
            MatchMode::Contains => write!(f, "*{}*", self.text),
        }
    }
}

// ============================================================================
// PatternSet
// ============================================================================

/// The rules that recognize the target application's processes.
///
/// Always holds at least one target pattern; an empty set would report the
/// application as stopped no matter what is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    targets: Vec<MatchPattern>,
    exclusions: Vec<MatchPattern>,
    match_command_line: bool,
}

impl PatternSet {
    /// Compile target and self-exclusion patterns.
    pub fn new<T, E>(targets: T, exclusions: E) -> Result<Self>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let targets = targets
            .into_iter()
            .map(|p| MatchPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if targets.is_empty() {
            return Err(Error::Config(
                "at least one process pattern is required".to_string(),
            ));
        }

        let exclusions = exclusions
            .into_iter()
            .map(|p| MatchPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            targets,
            exclusions,
            match_command_line: false,
        })
    }

    /// Also test patterns against the full command line, not just the image name.
    pub fn with_command_line(mut self, enabled: bool) -> Self {
        self.match_command_line = enabled;
        self
    }

    /// Target patterns.
    pub fn targets(&self) -> &[MatchPattern] {
        &self.targets
    }

    /// Self-exclusion patterns.
    pub fn exclusions(&self) -> &[MatchPattern] {
        &self.exclusions
    }

    fn candidates<'a>(&self, record: &'a ProcessRecord) -> impl Iterator<Item = &'a str> {
        let command = self
            .match_command_line
            .then_some(record.command.as_str())
            .filter(|c| !c.is_empty());
        std::iter::once(record.name.as_str()).chain(command)
    }

    fn any_matches(&self, patterns: &[MatchPattern], record: &ProcessRecord) -> bool {
        self.candidates(record)
            .any(|candidate| patterns.iter().any(|p| p.matches(candidate)))
    }

    /// Whether `record` belongs to the target application.
    ///
    /// The controller's own process, and anything matching a self-exclusion
    /// pattern, is rejected before the target patterns are consulted.
    pub fn matches(&self, record: &ProcessRecord, me: &SelfIdentity) -> bool {
        if record.pid == me.pid {
            return false;
        }
        // Other instances of this binary, whatever it was renamed to
        if me
            .name
            .as_deref()
            .is_some_and(|own| same_image(&record.name, own))
        {
            return false;
        }
        if self.any_matches(&self.exclusions, record) {
            return false;
        }
        self.any_matches(&self.targets, record)
    }
}

fn same_image(name: &str, own: &str) -> bool {
    let name = name.to_lowercase();
    let name = name.strip_suffix(".exe").unwrap_or(&name);
    !own.is_empty() && name == own.to_lowercase()
}

/// Keep only the records that belong to the target application.
pub fn filter_matches(
    records: Vec<ProcessRecord>,
    patterns: &PatternSet,
    me: &SelfIdentity,
) -> Vec<ProcessRecord> {
    records
        .into_iter()
        .filter(|r| patterns.matches(r, me))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pid: u32, name: &str) -> ProcessRecord {
        ProcessRecord::new(pid, name, name)
    }

    fn me() -> SelfIdentity {
        SelfIdentity::with_pid(1)
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(MatchPattern::parse("cursor").unwrap().mode(), MatchMode::Exact);
        assert_eq!(MatchPattern::parse("cursor*").unwrap().mode(), MatchMode::PrefixOf);
        assert_eq!(MatchPattern::parse("*cursor").unwrap().mode(), MatchMode::SuffixOf);
        assert_eq!(MatchPattern::parse("*cursor*").unwrap().mode(), MatchMode::Contains);
        assert_eq!(MatchPattern::parse("*").unwrap().mode(), MatchMode::Contains);
        assert_eq!(MatchPattern::parse("**").unwrap().mode(), MatchMode::Contains);
    }

    #[test]
    fn test_parse_rejects_bad_patterns() {
        assert!(MatchPattern::parse("").is_err());
        assert!(MatchPattern::parse("   ").is_err());
        assert!(MatchPattern::parse("cur*sor").is_err());
    }

    #[test]
    fn test_display_round_trips_mode() {
        assert_eq!(MatchPattern::parse("Cursor Helper*").unwrap().to_string(), "cursor helper*");
        assert_eq!(MatchPattern::parse("*.EXE").unwrap().to_string(), "*.exe");
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let set = PatternSet::new(["cursor"], Vec::<&str>::new()).unwrap();
        assert!(set.matches(&record(10, "Cursor"), &me()));
        assert!(set.matches(&record(11, "CURSOR"), &me()));
        assert!(!set.matches(&record(12, "CursorHelper"), &me()));
        assert!(!set.matches(&record(13, "mycursor"), &me()));
    }

    #[test]
    fn test_wildcards() {
        let prefix = PatternSet::new(["cursor*"], Vec::<&str>::new()).unwrap();
        assert!(prefix.matches(&record(10, "CursorHelper"), &me()));
        assert!(!prefix.matches(&record(11, "mycursor"), &me()));

        let suffix = PatternSet::new(["*cursor"], Vec::<&str>::new()).unwrap();
        assert!(suffix.matches(&record(12, "mycursor"), &me()));
        assert!(!suffix.matches(&record(13, "CursorHelper"), &me()));

        let contains = PatternSet::new(["*cursor*"], Vec::<&str>::new()).unwrap();
        assert!(contains.matches(&record(14, "mycursorhelper"), &me()));
        assert!(!contains.matches(&record(15, "code"), &me()));
    }

    #[test]
    fn test_any_pattern_matches() {
        let set = PatternSet::new(["cursor", "cursor.exe"], Vec::<&str>::new()).unwrap();
        assert!(set.matches(&record(10, "Cursor.exe"), &me()));
        assert!(set.matches(&record(11, "cursor"), &me()));
        assert!(!set.matches(&record(12, "code.exe"), &me()));
    }

    #[test]
    fn test_self_is_never_matched() {
        let set = PatternSet::new(["*"], Vec::<&str>::new()).unwrap();
        let me = SelfIdentity::with_pid(4242);
        assert!(!set.matches(&record(4242, "appkiller"), &me));
        assert!(set.matches(&record(4243, "anything"), &me));
    }

    #[test]
    fn test_deserialize_validates() {
        let pattern: MatchPattern = serde_json::from_str("\"Cursor Helper*\"").unwrap();
        assert_eq!(pattern.mode(), MatchMode::PrefixOf);
        assert_eq!(pattern.text(), "cursor helper");
        assert_eq!(serde_json::to_string(&pattern).unwrap(), "\"cursor helper*\"");

        assert!(serde_json::from_str::<MatchPattern>("\"\"").is_err());
        assert!(serde_json::from_str::<MatchPattern>("\"cur*sor\"").is_err());
        assert!(serde_json::from_str::<MatchPattern>(r#"{"mode":"exact","text":""}"#).is_err());
    }

    #[test]
    fn test_renamed_self_binary_is_never_matched() {
        let set = PatternSet::new(["cursor*"], Vec::<&str>::new()).unwrap();
        let me = SelfIdentity {
            pid: 4242,
            name: Some("cursor-closer".to_string()),
        };

        assert!(!set.matches(&record(4300, "cursor-closer"), &me));
        assert!(!set.matches(&record(4301, "Cursor-Closer.exe"), &me));
        assert!(set.matches(&record(4302, "cursor"), &me));
    }

    #[test]
    fn test_self_exclusion_patterns() {
        let set = PatternSet::new(["*cursor*"], ["cursor_id_modifier*"]).unwrap();
        assert!(!set.matches(&record(10, "cursor_id_modifier.py"), &me()));
        assert!(set.matches(&record(11, "cursor"), &me()));
    }

    #[test]
    fn test_command_line_matching() {
        let rec = ProcessRecord::new(20, "electron", "/opt/Cursor/cursor --type=renderer");

        let names_only = PatternSet::new(["*cursor*"], Vec::<&str>::new()).unwrap();
        assert!(!names_only.matches(&rec, &me()));

        let with_cmd = names_only.clone().with_command_line(true);
        assert!(with_cmd.matches(&rec, &me()));

        let excluded = PatternSet::new(["*cursor*"], ["*--type=renderer"])
            .unwrap()
            .with_command_line(true);
        assert!(!excluded.matches(&rec, &me()));
    }

    #[test]
    fn test_empty_pattern_set_rejected() {
        let result = PatternSet::new(Vec::<&str>::new(), Vec::<&str>::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_filter_matches() {
        let set = PatternSet::new(["cursor"], Vec::<&str>::new()).unwrap();
        let records = vec![record(1, "cursor"), record(2, "Cursor"), record(3, "bash")];
        let result = filter_matches(records, &set, &me());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].pid, 2);
    }
}
