//! Artifact descriptors and per-artifact generation outcomes.
//!
//! A backend skeleton is two artifacts: the declaration (`<name>_backend.hpp`) and
//! the definition (`<name>_backend.cpp`). Each [`ArtifactDescriptor`] carries the
//! name templates the orchestrator renders against the caller's mapping and the
//! terminal body that fills the artifact.

use std::fmt;
use std::path::PathBuf;

use crate::dispatcher::TemplateBody;
use crate::params::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Declaration,
    Definition,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declaration => "declaration",
            Self::Definition => "definition",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one generated file.
#[derive(Debug, Clone, Copy)]
pub struct ArtifactDescriptor {
    pub kind: ArtifactKind,
    /// Name template for the output path, relative to the output directory.
    pub file_name: &'static str,
    /// `(parameter, template)` pairs rendered into the derived mapping.
    pub overrides: &'static [(&'static str, &'static str)],
    /// Parameters copied from the caller's mapping.
    pub inherits: &'static [&'static str],
    pub body: TemplateBody,
}

const INHERITED: &[&str] = &[keys::NAME, keys::AST_VISITOR, keys::NODES];

/// Artifacts of a backend skeleton, in generation order.
pub const BACKEND_ARTIFACTS: &[ArtifactDescriptor] = &[
    ArtifactDescriptor {
        kind: ArtifactKind::Declaration,
        file_name: "{{name}}_backend.{{declaration_ext}}",
        overrides: &[(keys::GUARD, "__{{upper name}}_BACKEND_H__")],
        inherits: INHERITED,
        body: TemplateBody::EmitDeclaration,
    },
    ArtifactDescriptor {
        kind: ArtifactKind::Definition,
        file_name: "{{name}}_backend.{{definition_ext}}",
        overrides: &[(keys::HEADER, "{{lower name}}_backend.{{declaration_ext}}")],
        inherits: INHERITED,
        body: TemplateBody::EmitDefinition,
    },
];

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Written { bytes: u64 },
    /// Overwrite was declined; nothing was touched.
    Skipped,
    /// Opening, writing or closing failed; the message is the error chain.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactOutcome {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub status: ArtifactStatus,
}

/// Outcomes of one root invocation, in generation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub artifacts: Vec<ArtifactOutcome>,
}

impl GenerationReport {
    pub fn push(&mut self, kind: ArtifactKind, path: PathBuf, status: ArtifactStatus) {
        self.artifacts.push(ArtifactOutcome { kind, path, status });
    }

    pub fn written(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts
            .iter()
            .filter(|a| matches!(a.status, ArtifactStatus::Written { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts
            .iter()
            .filter(|a| a.status == ArtifactStatus::Skipped)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.artifacts
            .iter()
            .filter(|a| matches!(a.status, ArtifactStatus::Failed(_)))
    }

    /// At least one artifact was recorded and every one was written.
    pub fn is_complete(&self) -> bool {
        !self.artifacts.is_empty() && self.written().count() == self.artifacts.len()
    }

    /// Some artifacts were written and some were not.
    pub fn is_partial(&self) -> bool {
        let written = self.written().count();
        written > 0 && written < self.artifacts.len()
    }

    /// Nothing was written.
    pub fn is_total_failure(&self) -> bool {
        self.written().count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(statuses: &[ArtifactStatus]) -> GenerationReport {
        let mut report = GenerationReport::default();
        for (i, status) in statuses.iter().enumerate() {
            report.push(
                ArtifactKind::Declaration,
                PathBuf::from(format!("{i}.hpp")),
                status.clone(),
            );
        }
        report
    }

    #[test]
    fn test_complete() {
        let r = report(&[
            ArtifactStatus::Written { bytes: 10 },
            ArtifactStatus::Written { bytes: 20 },
        ]);
        assert!(r.is_complete());
        assert!(!r.is_partial());
        assert!(!r.is_total_failure());
    }

    #[test]
    fn test_partial() {
        let r = report(&[ArtifactStatus::Skipped, ArtifactStatus::Written { bytes: 5 }]);
        assert!(r.is_partial());
        assert!(!r.is_complete());
        assert_eq!(r.skipped().count(), 1);
        assert_eq!(r.written().count(), 1);
    }

    #[test]
    fn test_total_failure() {
        let r = report(&[
            ArtifactStatus::Failed("disk full".into()),
            ArtifactStatus::Skipped,
        ]);
        assert!(r.is_total_failure());
        assert!(!r.is_partial());
        assert_eq!(r.failed().count(), 1);
    }

    #[test]
    fn test_empty_report_is_not_complete() {
        let r = GenerationReport::default();
        assert!(!r.is_complete());
        assert!(!r.is_partial());
        assert!(r.is_total_failure());
    }

    #[test]
    fn test_backend_artifacts_order() {
        let kinds: Vec<_> = BACKEND_ARTIFACTS.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![ArtifactKind::Declaration, ArtifactKind::Definition]);
        assert!(BACKEND_ARTIFACTS
            .iter()
            .all(|a| a.body != TemplateBody::Orchestrate));
    }
}
