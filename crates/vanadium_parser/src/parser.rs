//! The TTCN-3 parser implementation.
//!
//! A recursive descent parser over the subset of TTCN-3 that the binder
//! understands. Errors never abort the parse: a diagnostic is recorded and
//! the parser resynchronises at the next definition or statement keyword.

use bumpalo::collections::Vec as BumpVec;
use vanadium_ast::node::*;
use vanadium_ast::syntax_kind::SyntaxKind;
use vanadium_ast::types::*;
use vanadium_core::arena::{freeze, ScratchArena};
use vanadium_core::text::TextRange;
use vanadium_diagnostics::{messages, DiagnosticMessage};
use vanadium_scanner::Scanner;

use crate::precedence::binary_precedence;

/// Maximum recursion depth to prevent stack overflow on deeply nested input.
const MAX_RECURSION_DEPTH: u32 = 200;

/// The parser produces a [`SyntaxTree`] from TTCN-3 source text.
pub struct Parser<'t, 's> {
    scratch: &'s ScratchArena,
    scanner: Scanner<'t>,
    text: &'t str,
    tree: SyntaxTree,
    errors: Vec<SyntaxError>,
    /// End of the most recently consumed token.
    last_end: usize,
    /// Tracks recursion depth to prevent stack overflow on deeply nested input.
    recursion_depth: u32,
}

impl<'t, 's> Parser<'t, 's> {
    pub fn new(scratch: &'s ScratchArena, text: &'t str) -> Self {
        Self {
            scratch,
            scanner: Scanner::new(text),
            text,
            tree: SyntaxTree::new(),
            errors: Vec::new(),
            last_end: 0,
            recursion_depth: 0,
        }
    }

    /// Parse the whole text. The root holds every top-level module.
    pub fn parse_source_file(mut self) -> SyntaxTree {
        self.next_token();
        let scratch = self.scratch;
        let mut nodes = scratch.list();
        while self.token() != SyntaxKind::EndOfFileToken {
            if self.token() == SyntaxKind::ModuleKeyword {
                nodes.push(self.parse_module());
            } else {
                self.error_here(&messages::DEFINITION_EXPECTED);
                self.skip_until(|k| k == SyntaxKind::ModuleKeyword);
            }
        }
        let root = self.tree.alloc(
            NodeKind::Root(Root {
                nodes: freeze(nodes),
            }),
            TextRange::new(0, self.text.len() as u32),
        );
        self.tree.finish(root);
        let mut errors = self.scanner.take_errors();
        errors.append(&mut self.errors);
        errors.sort_by_key(|e| e.range.pos);
        self.tree.errors = errors;
        self.tree
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    #[inline]
    fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    fn next_token(&mut self) -> SyntaxKind {
        self.last_end = self.scanner.token_end();
        self.scanner.scan()
    }

    #[inline]
    fn token_start(&self) -> u32 {
        self.scanner.token_start() as u32
    }

    fn optional(&mut self, kind: SyntaxKind) -> bool {
        if self.token() == kind {
            self.next_token();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.optional(kind) {
            return true;
        }
        let range = self.scanner.token_range();
        self.errors.push(SyntaxError::with_arg(
            range,
            &messages::_0_EXPECTED,
            kind.to_string(),
        ));
        false
    }

    fn error_here(&mut self, message: &'static DiagnosticMessage) {
        let range = self.scanner.token_range();
        self.errors.push(SyntaxError::new(range, message));
    }

    fn error_unexpected_token(&mut self) {
        let range = self.scanner.token_range();
        let text = self.scanner.token_value();
        self.errors.push(SyntaxError::with_arg(
            range,
            &messages::UNEXPECTED_TOKEN_0,
            text,
        ));
    }

    /// Skip at least one token, then until `stop` matches, a closing brace or EOF.
    fn skip_until(&mut self, stop: impl Fn(SyntaxKind) -> bool) {
        self.next_token();
        while !matches!(
            self.token(),
            SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken
        ) && !stop(self.token())
        {
            self.next_token();
        }
    }

    fn finish_node(&mut self, start: u32, kind: NodeKind) -> NodeId {
        let end = (self.last_end as u32).max(start);
        self.tree.alloc(kind, TextRange::new(start, end))
    }

    fn is_identifier_like(&self) -> bool {
        self.token() == SyntaxKind::Identifier
    }

    fn parse_identifier(&mut self) -> Option<NodeId> {
        if self.is_identifier_like() {
            let range = self.scanner.token_range();
            self.next_token();
            Some(self.tree.alloc(NodeKind::Ident, range))
        } else {
            self.error_here(&messages::IDENTIFIER_EXPECTED);
            None
        }
    }

    /// After a `.`, keywords such as `create` are valid member names.
    fn parse_member_name(&mut self) -> Option<NodeId> {
        if self.is_identifier_like() || self.token().is_keyword() {
            let range = self.scanner.token_range();
            self.next_token();
            Some(self.tree.alloc(NodeKind::Ident, range))
        } else {
            self.error_here(&messages::IDENTIFIER_EXPECTED);
            None
        }
    }

    fn parse_modifiers(&mut self) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        while self.token() == SyntaxKind::ModifierToken {
            if let Some(flag) = ModifierFlags::from_text(self.scanner.token_value()) {
                flags |= flag;
            }
            self.next_token();
        }
        flags
    }

    // ========================================================================
    // Module and definitions
    // ========================================================================

    fn parse_module(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        let name = self.parse_identifier();
        let scratch = self.scratch;
        let mut defs = scratch.list();
        if self.expect(SyntaxKind::OpenBraceToken) {
            self.parse_definition_list(&mut defs);
            self.expect(SyntaxKind::CloseBraceToken);
        }
        self.optional(SyntaxKind::SemicolonToken);
        self.finish_node(
            start,
            NodeKind::Module(Module {
                name,
                defs: freeze(defs),
            }),
        )
    }

    fn parse_definition_list(&mut self, defs: &mut BumpVec<'_, NodeId>) {
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            if self.optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            match self.parse_definition() {
                Some(def) => defs.push(def),
                None => {
                    self.error_here(&messages::DEFINITION_EXPECTED);
                    self.skip_until(SyntaxKind::starts_definition);
                }
            }
        }
    }

    fn parse_definition(&mut self) -> Option<NodeId> {
        let start = self.token_start();
        let visibility = match self.token() {
            SyntaxKind::PublicKeyword => Some(Visibility::Public),
            SyntaxKind::PrivateKeyword => Some(Visibility::Private),
            SyntaxKind::FriendKeyword => Some(Visibility::Friend),
            _ => None,
        };
        if visibility.is_some() {
            self.next_token();
        }
        let def = match self.token() {
            SyntaxKind::ImportKeyword => self.parse_import(),
            SyntaxKind::ConstKeyword | SyntaxKind::VarKeyword | SyntaxKind::ModuleparKeyword => {
                self.parse_value_decl()
            }
            SyntaxKind::TemplateKeyword => self.parse_template_decl(),
            SyntaxKind::TypeKeyword => self.parse_type_def(),
            SyntaxKind::FunctionKeyword | SyntaxKind::TestcaseKeyword | SyntaxKind::AltstepKeyword => {
                self.parse_func_decl()
            }
            SyntaxKind::ControlKeyword => self.parse_control_part(),
            _ => return None,
        };
        self.optional(SyntaxKind::SemicolonToken);
        Some(self.finish_node(start, NodeKind::Definition(Definition { visibility, def })))
    }

    fn parse_import(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        self.expect(SyntaxKind::FromKeyword);
        let module = self.parse_identifier();
        let spec = if self.optional(SyntaxKind::AllKeyword) {
            ImportSpec::All
        } else if self.expect(SyntaxKind::OpenBraceToken) {
            let items = self.parse_import_items();
            self.expect(SyntaxKind::CloseBraceToken);
            ImportSpec::List(items)
        } else {
            ImportSpec::All
        };
        self.finish_node(start, NodeKind::ImportDecl(ImportDecl { module, spec }))
    }

    fn parse_import_items(&mut self) -> Vec<ImportItem> {
        let mut items = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            if self.optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let kind = match self.token() {
                SyntaxKind::ImportKeyword => ImportKind::Import,
                SyntaxKind::TypeKeyword => ImportKind::Type,
                SyntaxKind::ConstKeyword => ImportKind::Const,
                SyntaxKind::TemplateKeyword => ImportKind::Template,
                SyntaxKind::FunctionKeyword => ImportKind::Function,
                SyntaxKind::TestcaseKeyword => ImportKind::Testcase,
                SyntaxKind::AltstepKeyword => ImportKind::Altstep,
                SyntaxKind::ModuleparKeyword => ImportKind::ModulePar,
                SyntaxKind::SignatureKeyword => ImportKind::Signature,
                SyntaxKind::AllKeyword => ImportKind::All,
                _ => {
                    self.error_unexpected_token();
                    self.skip_until(|k| k == SyntaxKind::SemicolonToken);
                    continue;
                }
            };
            let item_start = self.token_start();
            self.next_token();
            let mut names = Vec::new();
            if kind != ImportKind::All && !self.optional(SyntaxKind::AllKeyword) {
                loop {
                    match self.parse_identifier() {
                        Some(name) => names.push(name),
                        None => break,
                    }
                    if !self.optional(SyntaxKind::CommaToken) {
                        break;
                    }
                }
            }
            items.push(ImportItem {
                kind,
                range: TextRange::new(item_start, self.last_end as u32),
                names,
            });
        }
        items
    }

    fn parse_value_decl(&mut self) -> NodeId {
        let start = self.token_start();
        let mut kind = match self.token() {
            SyntaxKind::ConstKeyword => ValueKind::Const,
            SyntaxKind::ModuleparKeyword => ValueKind::ModulePar,
            SyntaxKind::TimerKeyword => ValueKind::Timer,
            SyntaxKind::PortKeyword => ValueKind::Port,
            _ => ValueKind::Var,
        };
        self.next_token();
        if kind == ValueKind::Var && self.optional(SyntaxKind::TemplateKeyword) {
            kind = ValueKind::VarTemplate;
        }
        let ty = if kind == ValueKind::Timer {
            None
        } else {
            self.parse_type_ref()
        };
        let scratch = self.scratch;
        let mut declarators = scratch.list();
        loop {
            declarators.push(self.parse_declarator());
            if !self.optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.finish_node(
            start,
            NodeKind::ValueDecl(ValueDecl {
                kind,
                ty,
                declarators: freeze(declarators),
            }),
        )
    }

    fn parse_declarator(&mut self) -> NodeId {
        let start = self.token_start();
        let name = self.parse_identifier();
        let dims = self.parse_array_dims();
        let value = if self.optional(SyntaxKind::AssignToken) {
            self.parse_expression()
        } else {
            None
        };
        self.finish_node(start, NodeKind::Declarator(Declarator { name, dims, value }))
    }

    fn parse_array_dims(&mut self) -> Vec<NodeId> {
        let mut dims = Vec::new();
        while self.optional(SyntaxKind::OpenBracketToken) {
            if let Some(dim) = self.parse_expression() {
                dims.push(dim);
            }
            self.expect(SyntaxKind::CloseBracketToken);
        }
        dims
    }

    fn parse_template_decl(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        self.parse_modifiers();
        let ty = self.parse_type_ref();
        let name = self.parse_identifier();
        let params = if self.token() == SyntaxKind::OpenParenToken {
            Some(self.parse_formal_pars())
        } else {
            None
        };
        let base = if self.optional(SyntaxKind::ModifiesKeyword) {
            self.parse_identifier()
        } else {
            None
        };
        let value = if self.expect(SyntaxKind::AssignToken) {
            self.parse_expression()
        } else {
            None
        };
        self.finish_node(
            start,
            NodeKind::TemplateDecl(TemplateDecl {
                ty,
                name,
                params,
                base,
                value,
            }),
        )
    }

    // ========================================================================
    // Types
    // ========================================================================

    /// A type reference: `T`, `M.T` or `T.field`.
    fn parse_type_ref(&mut self) -> Option<NodeId> {
        if !self.is_identifier_like() {
            self.error_here(&messages::TYPE_EXPECTED);
            return None;
        }
        let start = self.token_start();
        let mut x = self.parse_identifier()?;
        while self.token() == SyntaxKind::DotToken {
            self.next_token();
            let sel = self.parse_member_name();
            x = self.finish_node(start, NodeKind::SelectorExpr(SelectorExpr { x, sel }));
        }
        Some(x)
    }

    fn parse_type_list(&mut self) -> Vec<NodeId> {
        let mut list = Vec::new();
        loop {
            match self.parse_type_ref() {
                Some(ty) => list.push(ty),
                None => break,
            }
            if !self.optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        list
    }

    fn parse_type_def(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        let kind = match self.token() {
            SyntaxKind::ComponentKeyword => self.parse_component_type(),
            SyntaxKind::RecordKeyword | SyntaxKind::SetKeyword | SyntaxKind::UnionKeyword => {
                self.parse_struct_or_list_type()
            }
            SyntaxKind::EnumeratedKeyword => self.parse_enum_type(),
            SyntaxKind::PortKeyword => self.parse_port_type(),
            SyntaxKind::ClassKeyword => self.parse_class_type(),
            _ => self.parse_sub_type(),
        };
        self.finish_node(start, kind)
    }

    fn parse_component_type(&mut self) -> NodeKind {
        self.next_token();
        let name = self.parse_identifier();
        let extends = if self.optional(SyntaxKind::ExtendsKeyword) {
            self.parse_type_list()
        } else {
            Vec::new()
        };
        let scratch = self.scratch;
        let mut defs = scratch.list();
        if self.expect(SyntaxKind::OpenBraceToken) {
            while !matches!(
                self.token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                if self.optional(SyntaxKind::SemicolonToken) {
                    continue;
                }
                match self.token() {
                    SyntaxKind::VarKeyword
                    | SyntaxKind::ConstKeyword
                    | SyntaxKind::TimerKeyword
                    | SyntaxKind::PortKeyword => defs.push(self.parse_value_decl()),
                    SyntaxKind::TemplateKeyword => defs.push(self.parse_template_decl()),
                    _ => {
                        self.error_here(&messages::DEFINITION_EXPECTED);
                        self.skip_until(|k| k == SyntaxKind::SemicolonToken);
                    }
                }
            }
            self.expect(SyntaxKind::CloseBraceToken);
        }
        NodeKind::ComponentTypeDecl(ComponentTypeDecl {
            name,
            extends,
            defs: freeze(defs),
        })
    }

    fn parse_struct_or_list_type(&mut self) -> NodeKind {
        let head = self.token();
        self.next_token();
        if head != SyntaxKind::UnionKeyword && self.optional(SyntaxKind::OfKeyword) {
            let kind = if head == SyntaxKind::RecordKeyword {
                ListKind::RecordOf
            } else {
                ListKind::SetOf
            };
            let element = self.parse_type_ref();
            let name = self.parse_identifier();
            return NodeKind::ListTypeDecl(ListTypeDecl {
                kind,
                element,
                name,
            });
        }
        let kind = match head {
            SyntaxKind::RecordKeyword => StructKind::Record,
            SyntaxKind::SetKeyword => StructKind::Set,
            _ => StructKind::Union,
        };
        let name = self.parse_identifier();
        let scratch = self.scratch;
        let mut fields = scratch.list();
        if self.expect(SyntaxKind::OpenBraceToken) {
            while !matches!(
                self.token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                let start = self.token_start();
                let ty = self.parse_type_ref();
                if ty.is_none() {
                    self.skip_until(|k| k == SyntaxKind::CommaToken);
                    self.optional(SyntaxKind::CommaToken);
                    continue;
                }
                let name = self.parse_identifier();
                let optional = self.optional(SyntaxKind::OptionalKeyword);
                fields.push(self.finish_node(start, NodeKind::Field(Field { ty, name, optional })));
                if !self.optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.expect(SyntaxKind::CloseBraceToken);
        }
        NodeKind::StructTypeDecl(StructTypeDecl {
            kind,
            name,
            fields: freeze(fields),
        })
    }

    fn parse_enum_type(&mut self) -> NodeKind {
        self.next_token();
        let name = self.parse_identifier();
        let scratch = self.scratch;
        let mut values = scratch.list();
        if self.expect(SyntaxKind::OpenBraceToken) {
            while self.is_identifier_like() {
                let start = self.token_start();
                let value_name = self.parse_identifier();
                let value = if self.optional(SyntaxKind::OpenParenToken) {
                    let value = self.parse_expression();
                    self.expect(SyntaxKind::CloseParenToken);
                    value
                } else {
                    None
                };
                values.push(self.finish_node(
                    start,
                    NodeKind::EnumValue(EnumValue {
                        name: value_name,
                        value,
                    }),
                ));
                if !self.optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.expect(SyntaxKind::CloseBraceToken);
        }
        NodeKind::EnumTypeDecl(EnumTypeDecl {
            name,
            values: freeze(values),
        })
    }

    fn parse_port_type(&mut self) -> NodeKind {
        self.next_token();
        let name = self.parse_identifier();
        let kind = match self.token() {
            SyntaxKind::ProcedureKeyword => PortKind::Procedure,
            SyntaxKind::MixedKeyword => PortKind::Mixed,
            _ => PortKind::Message,
        };
        if !self.optional(SyntaxKind::MessageKeyword)
            && !self.optional(SyntaxKind::ProcedureKeyword)
            && !self.optional(SyntaxKind::MixedKeyword)
        {
            self.expect(SyntaxKind::MessageKeyword);
        }
        let mut messages = Vec::new();
        if self.expect(SyntaxKind::OpenBraceToken) {
            while matches!(
                self.token(),
                SyntaxKind::InKeyword | SyntaxKind::OutKeyword | SyntaxKind::InoutKeyword
            ) {
                self.next_token();
                messages.extend(self.parse_type_list());
                self.optional(SyntaxKind::SemicolonToken);
            }
            self.expect(SyntaxKind::CloseBraceToken);
        }
        NodeKind::PortTypeDecl(PortTypeDecl {
            kind,
            name,
            messages,
        })
    }

    fn parse_class_type(&mut self) -> NodeKind {
        self.next_token();
        let modifiers = self.parse_modifiers();
        let name = self.parse_identifier();
        let mut extends = Vec::new();
        let (mut runs_on, mut mtc, mut system) = (None, None, None);
        loop {
            match self.token() {
                SyntaxKind::ExtendsKeyword => {
                    self.next_token();
                    extends = self.parse_type_list();
                }
                SyntaxKind::RunsKeyword => {
                    self.next_token();
                    self.expect(SyntaxKind::OnKeyword);
                    runs_on = self.parse_type_ref();
                }
                SyntaxKind::MtcKeyword => {
                    self.next_token();
                    mtc = self.parse_type_ref();
                }
                SyntaxKind::SystemKeyword => {
                    self.next_token();
                    system = self.parse_type_ref();
                }
                _ => break,
            }
        }
        let scratch = self.scratch;
        let mut defs = scratch.list();
        if self.expect(SyntaxKind::OpenBraceToken) {
            while !matches!(
                self.token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                if self.optional(SyntaxKind::SemicolonToken) {
                    continue;
                }
                match self.parse_class_member() {
                    Some(def) => defs.push(def),
                    None => {
                        self.error_here(&messages::DEFINITION_EXPECTED);
                        self.skip_until(|k| k == SyntaxKind::SemicolonToken);
                    }
                }
            }
            self.expect(SyntaxKind::CloseBraceToken);
        }
        NodeKind::ClassTypeDecl(ClassTypeDecl {
            modifiers,
            name,
            extends,
            runs_on,
            mtc,
            system,
            defs: freeze(defs),
        })
    }

    fn parse_class_member(&mut self) -> Option<NodeId> {
        while matches!(
            self.token(),
            SyntaxKind::PublicKeyword | SyntaxKind::PrivateKeyword
        ) {
            self.next_token();
        }
        Some(match self.token() {
            SyntaxKind::VarKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::TimerKeyword
            | SyntaxKind::PortKeyword => self.parse_value_decl(),
            SyntaxKind::TemplateKeyword => self.parse_template_decl(),
            SyntaxKind::FunctionKeyword => self.parse_func_decl(),
            SyntaxKind::CreateKeyword => self.parse_constructor(),
            SyntaxKind::TypeKeyword => self.parse_type_def(),
            _ => return None,
        })
    }

    fn parse_constructor(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        let params = Some(self.parse_formal_pars());
        let body = self.parse_optional_block();
        self.finish_node(start, NodeKind::ConstructorDecl(ConstructorDecl { params, body }))
    }

    /// `type T Name [(constraint, ...)]` or `type T Name[dims]`.
    fn parse_sub_type(&mut self) -> NodeKind {
        let ty = self.parse_type_ref();
        let name = self.parse_identifier();
        let mut constraint = self.parse_array_dims();
        if self.optional(SyntaxKind::OpenParenToken) {
            while !matches!(
                self.token(),
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
            ) {
                match self.parse_expression() {
                    Some(expr) => constraint.push(expr),
                    None => break,
                }
                if !self.optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.expect(SyntaxKind::CloseParenToken);
        }
        NodeKind::SubTypeDecl(SubTypeDecl {
            ty,
            name,
            constraint,
        })
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn parse_func_decl(&mut self) -> NodeId {
        let start = self.token_start();
        let kind = match self.token() {
            SyntaxKind::TestcaseKeyword => FuncKind::Testcase,
            SyntaxKind::AltstepKeyword => FuncKind::Altstep,
            _ => FuncKind::Function,
        };
        self.next_token();
        let modifiers = self.parse_modifiers();
        let name = self.parse_identifier();
        let params = Some(self.parse_formal_pars());
        let (mut runs_on, mut mtc, mut system, mut ret) = (None, None, None, None);
        loop {
            match self.token() {
                SyntaxKind::RunsKeyword => {
                    self.next_token();
                    self.expect(SyntaxKind::OnKeyword);
                    runs_on = self.parse_type_ref();
                }
                SyntaxKind::MtcKeyword => {
                    self.next_token();
                    mtc = self.parse_type_ref();
                }
                SyntaxKind::SystemKeyword => {
                    self.next_token();
                    system = self.parse_type_ref();
                }
                SyntaxKind::ReturnKeyword => {
                    self.next_token();
                    self.optional(SyntaxKind::TemplateKeyword);
                    ret = self.parse_type_ref();
                }
                _ => break,
            }
        }
        // Abstract functions are declared without a body.
        let body = if modifiers.contains(ModifierFlags::ABSTRACT)
            && self.token() != SyntaxKind::OpenBraceToken
        {
            None
        } else {
            self.parse_optional_block()
        };
        self.finish_node(
            start,
            NodeKind::FuncDecl(FuncDecl {
                kind,
                modifiers,
                name,
                params,
                runs_on,
                mtc,
                system,
                ret,
                body,
            }),
        )
    }

    fn parse_formal_pars(&mut self) -> NodeId {
        let start = self.token_start();
        let scratch = self.scratch;
        let mut list = scratch.list();
        if self.expect(SyntaxKind::OpenParenToken) {
            while !matches!(
                self.token(),
                SyntaxKind::CloseParenToken | SyntaxKind::EndOfFileToken
            ) {
                list.push(self.parse_formal_par());
                if !self.optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.expect(SyntaxKind::CloseParenToken);
        }
        self.finish_node(start, NodeKind::FormalPars(FormalPars { list: freeze(list) }))
    }

    fn parse_formal_par(&mut self) -> NodeId {
        let start = self.token_start();
        let direction = match self.token() {
            SyntaxKind::InKeyword => Some(ParDirection::In),
            SyntaxKind::OutKeyword => Some(ParDirection::Out),
            SyntaxKind::InoutKeyword => Some(ParDirection::InOut),
            _ => None,
        };
        if direction.is_some() {
            self.next_token();
        }
        let is_template = self.optional(SyntaxKind::TemplateKeyword);
        let ty = self.parse_type_ref();
        let name = self.parse_identifier();
        let value = if self.optional(SyntaxKind::AssignToken) {
            self.parse_expression()
        } else {
            None
        };
        self.finish_node(
            start,
            NodeKind::FormalPar(FormalPar {
                direction,
                is_template,
                ty,
                name,
                value,
            }),
        )
    }

    fn parse_control_part(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        let body = self.parse_optional_block();
        self.finish_node(start, NodeKind::ControlPart(ControlPart { body }))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_optional_block(&mut self) -> Option<NodeId> {
        if self.token() == SyntaxKind::OpenBraceToken {
            Some(self.parse_block())
        } else {
            self.expect(SyntaxKind::OpenBraceToken);
            None
        }
    }

    fn parse_block(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        let scratch = self.scratch;
        let mut stmts = scratch.list();
        while !matches!(
            self.token(),
            SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) {
            if self.optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    self.error_here(&messages::STATEMENT_EXPECTED);
                    self.skip_until(|k| k == SyntaxKind::SemicolonToken);
                }
            }
        }
        self.expect(SyntaxKind::CloseBraceToken);
        self.finish_node(start, NodeKind::BlockStmt(BlockStmt { stmts: freeze(stmts) }))
    }

    fn parse_statement(&mut self) -> Option<NodeId> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error_here(&messages::STATEMENT_EXPECTED);
            return None;
        }
        self.recursion_depth += 1;
        let stmt = self.parse_statement_inner();
        self.recursion_depth -= 1;
        self.optional(SyntaxKind::SemicolonToken);
        stmt
    }

    fn parse_statement_inner(&mut self) -> Option<NodeId> {
        let start = self.token_start();
        Some(match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::VarKeyword
            | SyntaxKind::ConstKeyword
            | SyntaxKind::TimerKeyword
            | SyntaxKind::PortKeyword => self.parse_value_decl(),
            SyntaxKind::TemplateKeyword => self.parse_template_decl(),
            SyntaxKind::IfKeyword => {
                self.next_token();
                let cond = self.parse_paren_condition();
                let then = self.parse_optional_block();
                let else_ = if self.optional(SyntaxKind::ElseKeyword) {
                    if self.token() == SyntaxKind::IfKeyword {
                        self.parse_statement_inner()
                    } else {
                        self.parse_optional_block()
                    }
                } else {
                    None
                };
                self.finish_node(start, NodeKind::IfStmt(IfStmt { cond, then, else_ }))
            }
            SyntaxKind::ForKeyword => {
                self.next_token();
                self.expect(SyntaxKind::OpenParenToken);
                let init = if self.token() == SyntaxKind::VarKeyword {
                    Some(self.parse_value_decl())
                } else {
                    self.parse_expression()
                };
                self.expect(SyntaxKind::SemicolonToken);
                let cond = self.parse_expression();
                self.expect(SyntaxKind::SemicolonToken);
                let post = self.parse_expression();
                self.expect(SyntaxKind::CloseParenToken);
                let body = self.parse_optional_block();
                self.finish_node(
                    start,
                    NodeKind::ForStmt(ForStmt {
                        init,
                        cond,
                        post,
                        body,
                    }),
                )
            }
            SyntaxKind::WhileKeyword => {
                self.next_token();
                let cond = self.parse_paren_condition();
                let body = self.parse_optional_block();
                self.finish_node(start, NodeKind::WhileStmt(WhileStmt { cond, body }))
            }
            SyntaxKind::DoKeyword => {
                self.next_token();
                let body = self.parse_optional_block();
                self.expect(SyntaxKind::WhileKeyword);
                let cond = self.parse_paren_condition();
                self.finish_node(start, NodeKind::DoWhileStmt(WhileStmt { cond, body }))
            }
            SyntaxKind::ReturnKeyword => {
                self.next_token();
                let result = if matches!(
                    self.token(),
                    SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken
                ) {
                    None
                } else {
                    self.parse_expression()
                };
                self.finish_node(start, NodeKind::ReturnStmt(result))
            }
            SyntaxKind::BreakKeyword => {
                self.next_token();
                self.finish_node(start, NodeKind::BreakStmt)
            }
            SyntaxKind::ContinueKeyword => {
                self.next_token();
                self.finish_node(start, NodeKind::ContinueStmt)
            }
            _ => {
                let expr = self.parse_expression()?;
                self.finish_node(start, NodeKind::ExprStmt(expr))
            }
        })
    }

    fn parse_paren_condition(&mut self) -> Option<NodeId> {
        self.expect(SyntaxKind::OpenParenToken);
        let cond = self.parse_expression();
        self.expect(SyntaxKind::CloseParenToken);
        cond
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// An expression, optionally followed by `:= value`.
    fn parse_expression(&mut self) -> Option<NodeId> {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error_here(&messages::EXPRESSION_EXPECTED);
            return None;
        }
        self.recursion_depth += 1;
        let start = self.token_start();
        let result = self.parse_binary(0).map(|target| {
            if self.optional(SyntaxKind::AssignToken) {
                let value = self.parse_expression();
                self.finish_node(
                    start,
                    NodeKind::AssignmentExpr(AssignmentExpr { target, value }),
                )
            } else {
                target
            }
        });
        self.recursion_depth -= 1;
        result
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Option<NodeId> {
        let start = self.token_start();
        let mut x = self.parse_unary()?;
        while let Some(precedence) = binary_precedence(self.token()) {
            if precedence < min_precedence {
                break;
            }
            let op = self.token();
            self.next_token();
            let y = self.parse_binary(precedence + 1);
            x = self.finish_node(start, NodeKind::BinaryExpr(BinaryExpr { op, x, y }));
        }
        Some(x)
    }

    fn parse_unary(&mut self) -> Option<NodeId> {
        match self.token() {
            SyntaxKind::MinusToken | SyntaxKind::PlusToken | SyntaxKind::NotKeyword => {
                let start = self.token_start();
                let op = self.token();
                self.next_token();
                let x = self.parse_unary();
                Some(self.finish_node(start, NodeKind::UnaryExpr(UnaryExpr { op, x })))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Option<NodeId> {
        let start = self.token_start();
        let mut x = self.parse_primary()?;
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let sel = self.parse_member_name();
                    x = self.finish_node(start, NodeKind::SelectorExpr(SelectorExpr { x, sel }));
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let index = self.parse_expression();
                    self.expect(SyntaxKind::CloseBracketToken);
                    x = self.finish_node(start, NodeKind::IndexExpr(IndexExpr { x, index }));
                }
                SyntaxKind::OpenParenToken => {
                    let args = self.parse_paren_expr();
                    x = self.finish_node(start, NodeKind::CallExpr(CallExpr { fun: x, args }));
                }
                _ => return Some(x),
            }
        }
    }

    fn parse_paren_expr(&mut self) -> NodeId {
        let start = self.token_start();
        self.next_token();
        let list = self.parse_expression_list(SyntaxKind::CloseParenToken);
        self.expect(SyntaxKind::CloseParenToken);
        self.finish_node(start, NodeKind::ParenExpr(list))
    }

    fn parse_expression_list(&mut self, close: SyntaxKind) -> Vec<NodeId> {
        let scratch = self.scratch;
        let mut list = scratch.list();
        while self.token() != close && self.token() != SyntaxKind::EndOfFileToken {
            match self.parse_expression() {
                Some(expr) => list.push(expr),
                None => break,
            }
            if !self.optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        freeze(list)
    }

    fn parse_primary(&mut self) -> Option<NodeId> {
        let start = self.token_start();
        let literal = match self.token() {
            SyntaxKind::Identifier => return self.parse_identifier(),
            SyntaxKind::NumericLiteral => LiteralKind::Integer,
            SyntaxKind::FloatLiteral => LiteralKind::Float,
            SyntaxKind::StringLiteral => LiteralKind::String,
            SyntaxKind::BitStringLiteral => LiteralKind::BitString,
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => LiteralKind::Boolean,
            SyntaxKind::OmitKeyword => LiteralKind::Omit,
            SyntaxKind::QuestionToken | SyntaxKind::AsteriskToken => LiteralKind::Wildcard,
            SyntaxKind::OpenParenToken => return Some(self.parse_paren_expr()),
            SyntaxKind::OpenBraceToken => {
                self.next_token();
                let list = self.parse_expression_list(SyntaxKind::CloseBraceToken);
                self.expect(SyntaxKind::CloseBraceToken);
                return Some(self.finish_node(start, NodeKind::CompositeLiteral(list)));
            }
            _ => {
                self.error_unexpected_token();
                return None;
            }
        };
        self.next_token();
        Some(self.finish_node(start, NodeKind::ValueLiteral(literal)))
    }
}
