//! Identifiers the binder could not resolve inside their own file.
//!
//! Each group is a worklist for crossbinding. The resolution progress of a
//! group (which identifiers have been explained, whether providers were
//! injected) belongs to the program and is tracked there, so a bound file
//! stays immutable.

use crate::symbol::{ScopeId, SymbolFlags};
use vanadium_ast::NodeId;
use vanadium_core::intern::InternedString;

/// One identifier reference waiting for crossbinding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ExternalIdent {
    pub node: NodeId,
    pub name: InternedString,
    /// The scope the reference appears in.
    pub scope: ScopeId,
}

/// An `extends` / `runs on` target that must be found in another module.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AugmentationProvider {
    pub name: InternedString,
    pub node: NodeId,
    /// Flags the provider symbol must carry to be injected.
    pub required: SymbolFlags,
}

#[derive(Debug, Clone, Default)]
pub struct ExternallyResolvedGroup {
    pub idents: Vec<ExternalIdent>,
    /// Scopes that receive the provider member tables.
    pub scopes: Vec<ScopeId>,
    /// Empty for the primary and secondary groups.
    pub providers: Vec<AugmentationProvider>,
}

impl ExternallyResolvedGroup {
    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    pub fn is_augmented(&self) -> bool {
        !self.providers.is_empty()
    }

    pub fn push(&mut self, ident: ExternalIdent) {
        self.idents.push(ident);
    }

    /// Provider names joined with `,`, used as the group's key in logs.
    pub fn provider_key(&self, resolve: impl Fn(InternedString) -> String) -> String {
        self.providers
            .iter()
            .map(|p| resolve(p.name))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum GroupId {
    /// Type-position references.
    Primary,
    /// Every other reference outside an augmented body.
    Secondary,
    Augmented(usize),
}

/// The three kinds of externally resolved groups of one module.
#[derive(Debug, Clone, Default)]
pub struct ModuleExternals {
    pub primary: ExternallyResolvedGroup,
    pub secondary: ExternallyResolvedGroup,
    pub augmented: Vec<ExternallyResolvedGroup>,
}

impl ModuleExternals {
    pub fn group(&self, id: GroupId) -> &ExternallyResolvedGroup {
        match id {
            GroupId::Primary => &self.primary,
            GroupId::Secondary => &self.secondary,
            GroupId::Augmented(i) => &self.augmented[i],
        }
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut ExternallyResolvedGroup {
        match id {
            GroupId::Primary => &mut self.primary,
            GroupId::Secondary => &mut self.secondary,
            GroupId::Augmented(i) => &mut self.augmented[i],
        }
    }

    /// Every group id, primary first.
    pub fn ids(&self) -> impl Iterator<Item = GroupId> {
        [GroupId::Primary, GroupId::Secondary]
            .into_iter()
            .chain((0..self.augmented.len()).map(GroupId::Augmented))
    }

    /// The secondary and augmented groups, bound in the full crossbind phase.
    pub fn body_ids(&self) -> impl Iterator<Item = GroupId> {
        self.ids().skip(1)
    }

    pub fn total_len(&self) -> usize {
        self.ids().map(|id| self.group(id).len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_ids_order() {
        let externals = ModuleExternals {
            augmented: vec![ExternallyResolvedGroup::default(); 2],
            ..Default::default()
        };
        let ids: Vec<_> = externals.ids().collect();
        assert_eq!(
            ids,
            vec![
                GroupId::Primary,
                GroupId::Secondary,
                GroupId::Augmented(0),
                GroupId::Augmented(1)
            ]
        );
        assert_eq!(externals.body_ids().count(), 3);
    }
}
