//! Warnings and errors collected while inspecting a network.
//!
//! Some conditions are worth reporting without aborting the operation that found
//! them: a seed voltage level that fails the inclusion predicate, a dangling line
//! left unpaired, a voltage level with no buses. They are gathered here so the
//! caller can log them, return them to a client, or both.
//!
//! ```
//! use gat_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity("reachability", "seed excluded by predicate", "VL1");
//! assert_eq!(diag.warning_count(), 1);
//! assert!(!diag.has_errors());
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the operation continued.
    Warning,
    /// The element could not be handled.
    Error,
}

/// A single diagnostic issue.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping key, e.g. `"reachability"` or `"structure"`.
    pub category: String,
    pub message: String,
    /// Id of the network element the issue is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;
        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        Ok(())
    }
}

/// Collection of diagnostic issues for one operation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.add(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_display_includes_entity() {
        let issue = DiagnosticIssue::new(Severity::Warning, "structure", "no buses")
            .with_entity("VL3");
        assert_eq!(issue.to_string(), "[warning:structure] no buses (VL3)");
    }

    #[test]
    fn test_counts() {
        let mut diag = Diagnostics::new();
        assert!(diag.is_empty());
        diag.add_warning_with_entity("structure", "dangling line is unpaired", "DL9");
        diag.add(DiagnosticIssue::new(Severity::Error, "structure", "bus missing").with_entity("B1"));
        assert_eq!(diag.warning_count(), 1);
        assert!(diag.has_errors());
        assert_eq!(diag.errors().count(), 1);
    }
}
