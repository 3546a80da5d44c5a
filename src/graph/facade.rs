use super::types::{Declaration, TypeId, TypeRef};
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// Read-only queries the pipeline needs from the host's type graph.
///
/// Implementations must answer from the symbols visible *now*; the pipeline
/// never holds on to anything it receives between passes.
pub trait TypeGraph {
    /// Declarations carrying `marker`, in discovery order.
    fn marked(&self, marker: &str) -> Vec<&Declaration>;

    /// Whether `decl` can be safely resolved during the current pass.
    fn validate(&self, decl: &Declaration) -> bool;

    /// Look up a declaration by qualified name.
    fn declaration(&self, name: &str) -> Option<&Declaration>;

    /// Every supertype reachable from `decl`, type arguments substituted
    /// through the chain, depth-first in declaration order.
    fn supertype_closure(&self, decl: &Declaration) -> Vec<TypeRef> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(decl.id.as_str().to_string());
        for sup in &decl.supertypes {
            walk_supertype(self, sup, &mut seen, &mut out);
        }
        out
    }

    /// Read the type argument bound to the contract slot named `param`.
    ///
    /// The slot index is looked up by name on the contract's declaration; if
    /// the contract is not part of the graph, `fallback_position` is used.
    fn slot_argument(
        &self,
        binding: &TypeRef,
        param: &str,
        fallback_position: usize,
    ) -> Option<TypeRef> {
        let position = self
            .declaration(&binding.name)
            .and_then(|contract| contract.type_parameters.iter().position(|p| p == param))
            .unwrap_or(fallback_position);
        binding.args.get(position).cloned()
    }
}

fn walk_supertype<G: TypeGraph + ?Sized>(
    graph: &G,
    sup: &TypeRef,
    seen: &mut HashSet<String>,
    out: &mut Vec<TypeRef>,
) {
    if !seen.insert(sup.name.clone()) {
        return;
    }
    out.push(sup.clone());
    let Some(decl) = graph.declaration(&sup.name) else {
        trace!(supertype = %sup, "supertype not in graph; chain ends here");
        return;
    };
    let bindings: Vec<(String, TypeRef)> = decl
        .type_parameters
        .iter()
        .cloned()
        .zip(sup.args.iter().cloned())
        .collect();
    for parent in &decl.supertypes {
        walk_supertype(graph, &parent.substitute(&bindings), seen, out);
    }
}

/// In-memory type graph loaded from a manifest.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    order: Vec<TypeId>,
    declarations: BTreeMap<TypeId, Declaration>,
}

impl ModelGraph {
    /// Insert a declaration, returning `false` if the name is already taken.
    pub fn insert(&mut self, decl: Declaration) -> bool {
        if self.declarations.contains_key(&decl.id) {
            return false;
        }
        self.order.push(decl.id.clone());
        self.declarations.insert(decl.id.clone(), decl);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `ty` and every type argument inside it can be resolved now.
    ///
    /// Names outside the graph count as resolved; type parameters are skipped.
    fn is_resolvable(&self, ty: &TypeRef) -> bool {
        let named_ok = ty.param
            || self
                .declaration(&ty.name)
                .map(|d| d.resolvable)
                .unwrap_or(true);
        if !named_ok {
            trace!(ty = %ty, "type not resolvable this pass");
            return false;
        }
        ty.args.iter().all(|arg| self.is_resolvable(arg))
    }

    /// Mutable access, used to flip `resolvable` between passes.
    pub fn declaration_mut(&mut self, name: &str) -> Option<&mut Declaration> {
        self.declarations.get_mut(&TypeId::new(name))
    }
}

impl TypeGraph for ModelGraph {
    fn marked(&self, marker: &str) -> Vec<&Declaration> {
        self.order
            .iter()
            .filter_map(|id| self.declarations.get(id))
            .filter(|d| d.has_annotation(marker))
            .collect()
    }

    fn validate(&self, decl: &Declaration) -> bool {
        decl.resolvable && decl.supertypes.iter().all(|sup| self.is_resolvable(sup))
    }

    fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(&TypeId::new(name))
    }
}
