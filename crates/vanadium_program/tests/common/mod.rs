//! Shared fixtures for program tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use vanadium_core::intern::{InternedString, StringInterner};
use vanadium_program::{Program, ProgramBuilder, ScopeRef, SourceFile, SymbolRef};

static TRACING_INIT: Once = Once::new();

/// Log to the test output when `VANADIUM_LOG` is set, e.g.
/// `VANADIUM_LOG=vanadium_program=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("VANADIUM_LOG").is_ok() {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_test_writer().with_target(true))
                .with(EnvFilter::from_env("VANADIUM_LOG"))
                .try_init();
        }
    });
}

pub struct Fixture {
    pub program: Arc<Program>,
    pub interner: StringInterner,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    pub fn with(configure: impl FnOnce(ProgramBuilder) -> ProgramBuilder) -> Self {
        init_tracing();
        let interner = StringInterner::new();
        let program = configure(Program::builder("test", interner.clone())).build();
        Self { program, interner }
    }

    /// Add or replace files and analyze.
    pub fn commit(&self, files: &[(&str, &str)]) {
        let errors = self.program.commit(|m| {
            for &(path, text) in files {
                m.update_text(path, text);
            }
        });
        assert!(errors.is_empty(), "commit failed: {errors:?}");
    }

    pub fn update(&self, files: &[(&str, &str)]) {
        let errors = self.program.update(|m| {
            for &(path, text) in files {
                m.update_text(path, text);
            }
        });
        assert!(errors.is_empty(), "update failed: {errors:?}");
    }

    pub fn name(&self, name: &str) -> InternedString {
        self.interner.intern(name)
    }

    pub fn module(&self, name: &str) -> Arc<SourceFile> {
        self.program
            .module_by_name(name)
            .unwrap_or_else(|| panic!("module {name} should exist"))
    }

    pub fn unresolved(&self, module: &str) -> Vec<String> {
        let file = self.module(module);
        file.module()
            .unwrap()
            .unresolved()
            .iter()
            .map(|ident| self.interner.resolve(ident.name).to_string())
            .collect()
    }

    /// Resolve `name` in the innermost scope around the first `needle`.
    pub fn resolve_at(&self, module: &str, needle: &str, name: &str) -> Option<SymbolRef> {
        let file = self.module(module);
        let pos = file.text().find(needle).expect("needle should exist") as u32;
        let scope = ScopeRef::at(&file, pos).expect("position should be inside the module");
        scope.resolve(self.name(name))
    }

    pub fn resolve_in_module(&self, module: &str, name: &str) -> Option<SymbolRef> {
        let file = self.module(module);
        ScopeRef::module_scope(&file).unwrap().resolve(self.name(name))
    }

    pub fn declared_in(&self, symbol: &SymbolRef) -> String {
        let file = symbol.file();
        self.interner
            .resolve(file.module().unwrap().name())
            .to_string()
    }
}
