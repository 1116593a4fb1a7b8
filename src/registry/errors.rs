//! Configuration errors and their diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::TargetKind;
use crate::util::diagnostic::Diagnostic;

/// Error while composing a package descriptor graph.
///
/// Every variant is a misconfiguration at the call site; composition never
/// returns a partial graph.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("`{package}` depends on `{dependency}`, which could not be resolved")]
    #[diagnostic(code(pkgraph::unresolved_dependency))]
    UnresolvedDependency { package: String, dependency: String },

    #[error("package `{package}` has no main library")]
    #[diagnostic(code(pkgraph::missing_main_library))]
    MissingMainLibrary { package: String },

    #[error("cycle detected in package graph: {}", .cycle.join(" -> "))]
    #[diagnostic(code(pkgraph::cyclic_dependency))]
    CyclicDependency { cycle: Vec<String> },

    #[error("package not found: `{package}`")]
    #[diagnostic(code(pkgraph::unknown_package))]
    UnknownPackage {
        package: String,
        suggestions: Vec<String>,
    },

    #[error("package `{package}` is declared more than once")]
    #[diagnostic(code(pkgraph::duplicate_package))]
    DuplicatePackage { package: String },

    #[error("package `{package}` already has a target named `{target}`")]
    #[diagnostic(code(pkgraph::duplicate_target))]
    DuplicateTarget { package: String, target: String },

    #[error("package `{package}` already has main library `{existing}`, cannot add `{new}`")]
    #[diagnostic(code(pkgraph::duplicate_main_library))]
    DuplicateMainLibrary {
        package: String,
        existing: String,
        new: String,
    },

    #[error("`{target}` is a {found}, expected a {expected}")]
    #[diagnostic(code(pkgraph::unexpected_target_kind))]
    UnexpectedTargetKind {
        target: String,
        expected: TargetKind,
        found: TargetKind,
    },

    #[error("dangling reference: {reference}")]
    #[diagnostic(code(pkgraph::dangling_reference))]
    DanglingReference { reference: String },

    #[error("invalid name `{name}`: {reason}")]
    #[diagnostic(code(pkgraph::invalid_name))]
    InvalidName { name: String, reason: String },

    #[error("invalid namespace `{namespace}`: {reason}")]
    #[diagnostic(code(pkgraph::invalid_namespace))]
    InvalidNamespace { namespace: String, reason: String },
}

impl ConfigError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());

        match self {
            ConfigError::UnresolvedDependency { dependency, .. } => diag
                .with_suggestion(format!("Declare `{}` in the manifest", dependency))
                .with_suggestion("Check the spelling of the dependency name"),

            ConfigError::MissingMainLibrary { package } => diag
                .with_context(format!("`{}` is used as a dependency", package))
                .with_suggestion(format!("Register a main library on `{}`", package)),

            ConfigError::CyclicDependency { .. } => diag.with_suggestion(
                "Break the cycle by removing or restructuring dependencies",
            ),

            ConfigError::UnknownPackage { suggestions, .. } => {
                let diag = if suggestions.is_empty() {
                    diag
                } else {
                    diag.with_context(format!("did you mean: {}?", suggestions.join(", ")))
                };
                diag.with_suggestion("Run `pkgraph list` to see declared packages")
            }

            ConfigError::DuplicatePackage { package } => diag
                .with_suggestion(format!("Remove one of the `{}` declarations", package)),

            ConfigError::DuplicateMainLibrary { .. } => {
                diag.with_context("a package has at most one main library")
            }

            ConfigError::UnexpectedTargetKind { .. } => {
                diag.with_context("only libraries can be linked against")
            }

            ConfigError::InvalidName { .. } => diag.with_suggestion(
                "Use a name without whitespace, `/`, `\\` or `:`",
            ),

            ConfigError::InvalidNamespace { .. } => diag.with_suggestion(
                "Use a path such as `github.com\\user\\package`",
            ),

            ConfigError::DuplicateTarget { .. } | ConfigError::DanglingReference { .. } => diag,
        }
    }
}
