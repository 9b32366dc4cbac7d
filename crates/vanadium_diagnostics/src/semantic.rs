//! Semantic errors reported while binding a single file.

use crate::{messages, Diagnostic, DiagnosticMessage};
use vanadium_core::text::TextRange;

/// The kinds of semantic error the binder can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticErrorKind {
    /// A name was declared twice in the same table; the later one wins.
    Redefinition,
    /// `runs on` names something that is not a component.
    RunsOnRequiresComponent,
    ClassCanBeExtendedByClassOnly,
    ComponentCanBeExtendedByComponentOnly,
    CannotHaveAbstractFunctionInNonAbstractClass,
    /// A second `module` in the same file. It is not bound.
    MultipleModulesInFile,
}

impl SemanticErrorKind {
    pub fn message(self) -> &'static DiagnosticMessage {
        match self {
            SemanticErrorKind::Redefinition => &messages::REDEFINITION_OF_0,
            SemanticErrorKind::RunsOnRequiresComponent => &messages::RUNS_ON_REQUIRES_COMPONENT,
            SemanticErrorKind::ClassCanBeExtendedByClassOnly => {
                &messages::CLASS_CAN_BE_EXTENDED_BY_CLASS_ONLY
            }
            SemanticErrorKind::ComponentCanBeExtendedByComponentOnly => {
                &messages::COMPONENT_CAN_BE_EXTENDED_BY_COMPONENT_ONLY
            }
            SemanticErrorKind::CannotHaveAbstractFunctionInNonAbstractClass => {
                &messages::ABSTRACT_FUNCTION_IN_NON_ABSTRACT_CLASS
            }
            SemanticErrorKind::MultipleModulesInFile => &messages::ONLY_ONE_MODULE_PER_FILE,
        }
    }
}

/// A semantic error with its location and, for redefinitions, the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub range: TextRange,
    pub name: Option<String>,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, range: TextRange) -> Self {
        Self { kind, range, name: None }
    }

    pub fn redefinition(range: TextRange, name: &str) -> Self {
        Self {
            kind: SemanticErrorKind::Redefinition,
            range,
            name: Some(name.to_string()),
        }
    }

    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let name = self.name.as_deref().unwrap_or_default();
        Diagnostic::with_location(file, self.range, self.kind.message(), &[name])
    }
}
