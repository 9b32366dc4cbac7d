//! Rendering a file's problems as diagnostics.

use crate::program::Program;
use crate::source_file::SourceFile;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use vanadium_diagnostics::{messages, Diagnostic, DiagnosticCollection};

impl Program {
    /// Every diagnostic of the file at `path`, sorted by position. Empty for
    /// unknown paths.
    pub fn diagnostics(&self, path: &str) -> DiagnosticCollection {
        let mut diagnostics = DiagnosticCollection::new();
        let Some(file) = self.get_file(path) else {
            return diagnostics;
        };
        let path = file.path();

        for error in &file.tree().errors {
            diagnostics.add(error.to_diagnostic(path));
        }
        if let Some(error) = file.transform_error() {
            let message = error.to_string();
            let args = [path, message.as_str()];
            let diagnostic = match error.range() {
                Some(range) => {
                    Diagnostic::with_location(path, range, &messages::FAILED_TO_TRANSFORM_0_1, &args)
                }
                None => Diagnostic {
                    file: Some(path.to_string()),
                    ..Diagnostic::new(&messages::FAILED_TO_TRANSFORM_0_1, &args)
                },
            };
            diagnostics.add(diagnostic);
        }
        for error in file.semantic_errors() {
            diagnostics.add(error.to_diagnostic(path));
        }
        self.module_diagnostics(&file, &mut diagnostics);
        for error in file.type_errors() {
            diagnostics.add(Diagnostic::with_location(
                path,
                error.range,
                &messages::TYPE_ERROR_0,
                &[&error.message],
            ));
        }

        diagnostics.sort();
        diagnostics
    }

    fn module_diagnostics(&self, file: &Arc<SourceFile>, diagnostics: &mut DiagnosticCollection) {
        let Some(module) = file.module() else {
            return;
        };
        let path = file.path();
        let interner = self.interner();
        let tree = file.tree();

        if let Some(active) = self.get_module(module.name()) {
            if active.id() != file.id() {
                diagnostics.add(Diagnostic::with_location(
                    path,
                    module.name_range(),
                    &messages::DUPLICATE_MODULE_0,
                    &[interner.resolve(module.name())],
                ));
            }
        }

        let missing = module.missing_imports();
        for import in &missing {
            diagnostics.add(Diagnostic::with_location(
                path,
                tree.range(import.declaration),
                &messages::CANNOT_FIND_MODULE_0,
                &[interner.resolve(import.module)],
            ));
        }

        // Modules missing behind a transit import are reported at that import.
        for missing in module.missing_through_transit() {
            let Some(via) = missing.via else {
                continue;
            };
            let through = module
                .imports()
                .find(|import| import.transit && import.module == via);
            if let Some(import) = through {
                diagnostics.add(Diagnostic::with_location(
                    path,
                    tree.range(import.declaration),
                    &messages::CANNOT_FIND_MODULE_0_THROUGH_1,
                    &[interner.resolve(missing.name), interner.resolve(via)],
                ));
            }
        }

        for ident in module.unresolved() {
            diagnostics.add(Diagnostic::with_location(
                path,
                tree.range(ident.node),
                &messages::CANNOT_FIND_NAME_0,
                &[interner.resolve(ident.name)],
            ));
        }

        // An import is used when crossbinding took something from the module
        // or a reference qualified a name with it.
        let used: FxHashSet<_> = module.dependency_files().into_iter().collect();
        let mut reported = FxHashSet::default();
        for import in module.imports() {
            if import.transit
                || missing.iter().any(|m| m.module == import.module)
                || module.required_imports().contains(&import.module)
                || !reported.insert(import.module)
            {
                continue;
            }
            let imported = self.get_module(import.module);
            if imported.is_some_and(|imported| !used.contains(&imported.id())) {
                diagnostics.add(Diagnostic::with_location(
                    path,
                    import.range,
                    &messages::IMPORT_OF_0_IS_UNUSED,
                    &[interner.resolve(import.module)],
                ));
            }
        }
    }
}
