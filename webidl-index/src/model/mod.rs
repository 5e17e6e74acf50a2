//! The cross-library type graph.
//!
//! All nodes live in arenas owned by [`Model`] and refer to each other through [`TypeId`],
//! [`MemberId`] and [`LibraryId`]. Reverse edges (`implemented_by`, `referenced_by`) are id lists
//! on the arena entries, so the graph may be cyclic without any shared ownership.

pub mod ids;
pub mod kind;
pub mod library;
pub mod member;
pub mod types;


use crate::docs::ArtifactPath;
use crate::docs::Documentation;
use crate::docs::DocumentationProvider;
use crate::docs::NoDocumentation;
use crate::error::ModelError;
pub use ids::ArtifactId;
pub use ids::LibraryId;
pub use ids::MemberId;
pub use ids::TypeId;
pub use kind::Kind;
pub use kind::Modifiers;
pub use kind::Specials;
pub use library::Library;
pub use library::GLOBAL_TYPE_NAME;
pub use member::merge_parameters;
pub use member::Member;
pub use member::MemberKind;
pub use member::Operation;
pub use member::Parameter;
pub use member::Property;
use std::collections::BTreeSet;
use std::fmt::Write;
use tracing::debug;
use tracing::trace;
pub use types::Iterable;
pub use types::Type;

/// Bound on alias, partial and mixin chains. Malformed input can make these cyclic.
pub const MAX_DEPTH: usize = 64;

const PRIMITIVE_NAMES: &[&str] = &[
  "number",
  "boolean",
  "string",
  "object",
  "function",
  "any",
  "octet",
  "byte",
  "short",
  "int",
  "long",
  "long long",
  "unsigned byte",
  "unsigned short",
  "unsigned int",
  "unsigned long",
  "unsigned long long",
  "unrestricted double",
];

/// Registry of primitives, hidden placeholders and named libraries.
///
/// Libraries are ingested one after another by passing the model to the parser by `&mut`;
/// nothing here is shared between threads.
pub struct Model {
  types: Vec<Type>,
  members: Vec<Member>,
  libraries: Vec<Library>,
  // Named libraries in resolution order. Excludes primitives and hidden.
  registered: Vec<LibraryId>,
  any: TypeId,
}

impl Model {
  pub const PRIMITIVES: LibraryId = LibraryId(0);
  pub const HIDDEN: LibraryId = LibraryId(1);

  pub fn new() -> Model {
    let mut model = Model {
      types: Vec::new(),
      members: Vec::new(),
      libraries: Vec::new(),
      registered: Vec::new(),
      any: TypeId(0),
    };
    let primitives = model.push_library("primitives", true, Box::new(NoDocumentation));
    let hidden = model.push_library("hidden", true, Box::new(NoDocumentation));
    debug_assert_eq!((primitives, hidden), (Self::PRIMITIVES, Self::HIDDEN));
    for &name in PRIMITIVE_NAMES {
      let id = model.alloc_type(Type::new(name, Kind::Primitive));
      model.types[id.index()].library = Some(primitives);
      model.libraries[primitives.index()]
        .types
        .insert(name.to_string(), id);
      if name == "any" {
        model.any = id;
      }
    }
    model
  }

  fn alloc_type(&mut self, ty: Type) -> TypeId {
    let id = TypeId(self.types.len() as u32);
    self.types.push(ty);
    id
  }

  fn push_library(
    &mut self,
    name: &str,
    read_only: bool,
    docs: Box<dyn DocumentationProvider>,
  ) -> LibraryId {
    let id = LibraryId(self.libraries.len() as u32);
    let mut globals = Type::new(GLOBAL_TYPE_NAME, Kind::NoInterfaceObject);
    globals.library = Some(id);
    let globals = self.alloc_type(globals);
    self.libraries.push(Library {
      name: name.to_string(),
      read_only,
      types: Default::default(),
      globals,
      docs,
    });
    id
  }

  /// Registers a named library. Registration order is resolution order for [`Model::get_type`].
  pub fn add_library(
    &mut self,
    name: &str,
    read_only: bool,
    docs: Box<dyn DocumentationProvider>,
  ) -> LibraryId {
    let id = self.push_library(name, read_only, docs);
    self.registered.push(id);
    debug!(library = name, "added library");
    id
  }

  /// Unregisters a library so it no longer takes part in resolution. Its arena entries remain.
  /// Types it owned that another tier still names are handed back to the latest such library,
  /// or to the hidden one.
  pub fn remove_library(&mut self, lib: LibraryId) -> bool {
    let before = self.registered.len();
    self.registered.retain(|&l| l != lib);
    if before == self.registered.len() {
      return false;
    }
    let owned: Vec<(String, TypeId)> = self.libraries[lib.index()]
      .types
      .iter()
      .filter(|&(_, &t)| self.ty(t).library == Some(lib))
      .map(|(name, &t)| (name.clone(), t))
      .collect();
    for (name, t) in owned {
      let heir = self
        .registered
        .iter()
        .rev()
        .copied()
        .chain([Self::HIDDEN])
        .find(|&l| self.library(l).types.get(&name) == Some(&t));
      if let Some(heir) = heir {
        trace!(name = name.as_str(), to = self.library(heir).name.as_str(), "restored type owner");
        self.types[t.index()].library = Some(heir);
      }
    }
    true
  }

  pub fn ty(&self, id: TypeId) -> &Type {
    &self.types[id.index()]
  }

  pub fn member(&self, id: MemberId) -> &Member {
    &self.members[id.index()]
  }

  pub fn library(&self, id: LibraryId) -> &Library {
    &self.libraries[id.index()]
  }

  /// Registered libraries in resolution order.
  pub fn libraries(&self) -> impl Iterator<Item = LibraryId> + '_ {
    self.registered.iter().copied()
  }

  pub fn library_by_name(&self, name: &str) -> Option<LibraryId> {
    [Self::PRIMITIVES, Self::HIDDEN]
      .into_iter()
      .chain(self.registered.iter().copied())
      .find(|&lib| self.library(lib).name == name)
  }

  pub fn type_name(&self, id: TypeId) -> &str {
    &self.ty(id).name
  }

  /// The primitive `any`, used when merged overloads disagree on a parameter type.
  pub fn any(&self) -> TypeId {
    self.any
  }

  /// Resolves a name across tiers: primitives, then hidden placeholders, then each registered
  /// library in order. Partial shims never satisfy a lookup.
  pub fn get_type(&self, name: &str) -> Option<TypeId> {
    if let Some(&t) = self.library(Self::PRIMITIVES).types.get(name) {
      return Some(t);
    }
    if let Some(&t) = self.library(Self::HIDDEN).types.get(name) {
      if self.ty(t).kind != Kind::Partial {
        return Some(t);
      }
    }
    self
      .registered
      .iter()
      .filter_map(|&lib| self.library(lib).types.get(name).copied())
      .find(|&t| self.ty(t).kind != Kind::Partial)
  }

  /// Every name registered in any tier, sorted. Composite types are not registered by name.
  pub fn all_type_names(&self) -> BTreeSet<String> {
    [Self::PRIMITIVES, Self::HIDDEN]
      .into_iter()
      .chain(self.registered.iter().copied())
      .flat_map(|lib| self.library(lib).type_names())
      .map(str::to_string)
      .collect()
  }

  /// Allocates a detached type. It belongs to no library until [`Model::add_type`].
  pub fn new_type(&mut self, name: impl Into<String>, kind: Kind) -> TypeId {
    let ty = Type::new(name, kind);
    trace!(name = ty.name.as_str(), kind = kind.as_str(), "created type");
    self.alloc_type(ty)
  }

  /// Allocates a composite type (array, nullable, sequence, union, generic) in the hidden
  /// library without registering its name. The wrapped type is set directly, so no
  /// `implemented_by` edge is recorded.
  pub fn new_synthesized(
    &mut self,
    name: impl Into<String>,
    kind: Kind,
    super_type: Option<TypeId>,
  ) -> TypeId {
    let mut ty = Type::new(name, kind);
    ty.library = Some(Self::HIDDEN);
    ty.super_type = super_type;
    self.alloc_type(ty)
  }

  /// Creates the placeholder for a name no tier resolves, so that later references converge on
  /// the same type.
  pub fn add_hidden_type(&mut self, name: &str) -> TypeId {
    if let Some(&existing) = self.library(Self::HIDDEN).types.get(name) {
      return existing;
    }
    debug!(name, "synthesized placeholder type");
    let mut ty = Type::new(name, Kind::NoInterfaceObject);
    ty.library = Some(Self::HIDDEN);
    let id = self.alloc_type(ty);
    self.libraries[Self::HIDDEN.index()]
      .types
      .insert(name.to_string(), id);
    id
  }

  /// Registers `t` under its name in `lib` and makes `lib` its owner. Libraries that
  /// registered `t` earlier, the hidden one included, keep their entry, so unregistering `lib`
  /// later never orphans a type another tier still names.
  pub fn add_type(&mut self, lib: LibraryId, t: TypeId) -> Result<(), ModelError> {
    let name = self.ty(t).name.clone();
    self.libraries[lib.index()].add_type(&name, t)?;
    if let Some(prev) = self.ty(t).library {
      if prev != lib {
        trace!(
          name = name.as_str(),
          from = self.library(prev).name.as_str(),
          to = self.library(lib).name.as_str(),
          "changed type owner"
        );
      }
    }
    self.types[t.index()].library = Some(lib);
    Ok(())
  }

  /// Unregisters `t` from its library and clears the owner. The arena entry stays valid.
  pub fn delete_type(&mut self, t: TypeId) {
    if let Some(lib) = self.types[t.index()].library.take() {
      let name = self.ty(t).name.clone();
      self.libraries[lib.index()].remove_type(&name, t);
    }
  }

  pub fn set_kind(&mut self, t: TypeId, kind: Kind) {
    self.types[t.index()].kind = kind;
  }

  pub fn add_modifiers(&mut self, t: TypeId, modifiers: Modifiers) {
    self.types[t.index()].modifiers |= modifiers;
  }

  /// Sets the super type and records the reverse edge unless `t` is a union, sequence or
  /// nullable.
  pub fn set_super_type(&mut self, t: TypeId, super_type: TypeId) {
    self.types[t.index()].super_type = Some(super_type);
    if self.ty(t).kind.registers_implemented_by() {
      self.types[super_type.index()].implemented_by.push(t);
    }
  }

  /// Records `t implements base`: a non-hereditary mixin edge in both directions.
  pub fn add_implements(&mut self, t: TypeId, base: TypeId) {
    self.types[t.index()].types.push(base);
    self.types[base.index()].implemented_by.push(t);
  }

  /// Appends a union branch or generic argument. No reverse edge.
  pub fn push_type_argument(&mut self, t: TypeId, arg: TypeId) {
    self.types[t.index()].types.push(arg);
  }

  pub fn add_enum_literal(&mut self, t: TypeId, literal: impl Into<String>) {
    self.types[t.index()].enum_literals.push(literal.into());
  }

  pub fn set_iterable(&mut self, t: TypeId, iterable: Iterable) {
    self.types[t.index()].iterable = Some(iterable);
  }

  /// Follows partial shims to the type that actually stores members.
  pub fn partial_target(&self, t: TypeId) -> TypeId {
    let mut cur = t;
    for _ in 0..MAX_DEPTH {
      let ty = self.ty(cur);
      match (ty.kind, ty.super_type) {
        (Kind::Partial, Some(next)) => cur = next,
        _ => break,
      }
    }
    cur
  }

  fn alloc_member(&mut self, mut member: Member, owner: TypeId) -> MemberId {
    member.owner = Some(owner);
    let referenced = member.referenced_types();
    let id = MemberId(self.members.len() as u32);
    self.members.push(member);
    for ty in referenced {
      self.add_reference(ty, id);
    }
    id
  }

  /// Attaches a property. On a partial shim it lands on the first non-partial super type. A
  /// same-named property already there is detached.
  pub fn add_property(&mut self, owner: TypeId, member: Member) -> MemberId {
    let target = self.partial_target(owner);
    let name = member.name.clone();
    let id = self.alloc_member(member, target);
    if let Some(old) = self.types[target.index()].properties.insert(name, id) {
      self.members[old.index()].owner = None;
    }
    id
  }

  /// Attaches an operation, redirecting through partial shims like [`Model::add_property`].
  /// Callers wanting overload unification check [`Model::operation`] first and use
  /// [`Model::merge_operation`].
  pub fn add_operation(&mut self, owner: TypeId, member: Member) -> MemberId {
    let target = self.partial_target(owner);
    let name = member.name.clone();
    let id = self.alloc_member(member, target);
    if let Some(old) = self.types[target.index()].operations.insert(name, id) {
      self.members[old.index()].owner = None;
    }
    id
  }

  /// Attaches a constructor to `t` itself. A type without an interface object gains one.
  pub fn add_constructor(&mut self, t: TypeId, mut member: Member) -> MemberId {
    member.modifiers |= Modifiers::CONSTRUCTOR;
    let id = self.alloc_member(member, t);
    let ty = &mut self.types[t.index()];
    ty.constructors.push(id);
    if ty.kind == Kind::NoInterfaceObject {
      ty.kind = Kind::Interface;
    }
    id
  }

  pub fn property(&self, t: TypeId, name: &str) -> Option<MemberId> {
    let target = self.partial_target(t);
    self.ty(target).properties.get(name).copied()
  }

  pub fn operation(&self, t: TypeId, name: &str) -> Option<MemberId> {
    let target = self.partial_target(t);
    self.ty(target).operations.get(name).copied()
  }

  /// Folds `incoming` into the existing operation, keeping one signature for both. Only the
  /// parameter lists are unified; return type and modifiers of `existing` are kept.
  pub fn merge_operation(&mut self, existing: MemberId, incoming: Member) {
    let merged = merge_parameters(
      self.member(existing).parameters(),
      incoming.parameters(),
      self.any,
    );
    trace!(
      name = self.member(existing).name.as_str(),
      parameters = merged.len(),
      "merged overload"
    );
    let referenced: Vec<TypeId> = merged.iter().map(|p| p.ty).collect();
    if let Some(op) = self.members[existing.index()].as_operation_mut() {
      op.parameters = merged;
    }
    for ty in referenced {
      self.add_reference(ty, existing);
    }
  }

  /// Records that `member` mentions `t`, unwrapping composites down to the named types they
  /// contain. Aliases are recorded themselves and also forward to their target.
  pub fn add_reference(&mut self, t: TypeId, member: MemberId) {
    self.add_reference_at(t, member, 0);
  }

  fn add_reference_at(&mut self, t: TypeId, member: MemberId, depth: usize) {
    if depth > MAX_DEPTH {
      return;
    }
    let kind = self.ty(t).kind;
    match kind {
      Kind::Array | Kind::Sequence | Kind::Nullable => {
        if let Some(element) = self.ty(t).super_type {
          self.add_reference_at(element, member, depth + 1);
        }
      }
      Kind::Union => {
        for branch in self.ty(t).types.clone() {
          self.add_reference_at(branch, member, depth + 1);
        }
      }
      Kind::Alias => {
        self.types[t.index()].referenced_by.insert(member);
        if let Some(target) = self.ty(t).super_type {
          self.add_reference_at(target, member, depth + 1);
        }
      }
      Kind::Interface
      | Kind::Global
      | Kind::NoInterfaceObject
      | Kind::Primitive
      | Kind::Exception
      | Kind::Dictionary
      | Kind::Enum
      | Kind::Partial
      | Kind::CallbackFunction
      | Kind::CallbackInterface
      | Kind::Generic => {
        self.types[t.index()].referenced_by.insert(member);
      }
    }
  }

  fn collect_members(&self, t: TypeId, operations: bool, depth: usize, out: &mut BTreeSet<MemberId>) {
    if depth > MAX_DEPTH {
      return;
    }
    let ty = self.ty(t);
    let own = if operations {
      &ty.operations
    } else {
      &ty.properties
    };
    out.extend(own.values().copied());
    for &base in &ty.types {
      self.collect_members(base, operations, depth + 1, out);
    }
  }

  fn sorted_by_name(&self, ids: BTreeSet<MemberId>) -> Vec<MemberId> {
    let mut ids: Vec<MemberId> = ids.into_iter().collect();
    ids.sort_by_cached_key(|&m| (self.member(m).name.to_lowercase(), m));
    ids
  }

  /// Own operations plus those reachable through implemented mixins, sorted case-insensitively.
  pub fn own_and_interface_operations(&self, t: TypeId) -> Vec<MemberId> {
    let mut out = BTreeSet::new();
    self.collect_members(t, true, 0, &mut out);
    self.sorted_by_name(out)
  }

  pub fn own_and_interface_properties(&self, t: TypeId) -> Vec<MemberId> {
    let mut out = BTreeSet::new();
    self.collect_members(t, false, 0, &mut out);
    self.sorted_by_name(out)
  }

  /// `Library/Type`, with spaces in the library name replaced by `+`.
  pub fn qualified_name(&self, t: TypeId) -> String {
    let ty = self.ty(t);
    match ty.library {
      Some(lib) => format!("{}/{}", self.library(lib).name.replace(' ', "+"), ty.name),
      None => ty.name.clone(),
    }
  }

  /// `Library/Type.member`.
  pub fn qualified_member_name(&self, m: MemberId) -> String {
    let member = self.member(m);
    match member.owner {
      Some(owner) => format!("{}.{}", self.qualified_name(owner), member.name),
      None => member.name.clone(),
    }
  }

  /// Short label: the name for properties; `name()`, `name(T)` or `name(…)` for operations.
  pub fn display_member(&self, m: MemberId) -> String {
    let member = self.member(m);
    match &member.kind {
      MemberKind::Property(_) => member.name.clone(),
      MemberKind::Operation(op) => match op.parameters.as_slice() {
        [] => format!("{}()", member.name),
        [only] => format!("{}({})", member.name, self.type_name(only.ty)),
        _ => format!("{}(\u{2026})", member.name),
      },
    }
  }

  /// Full declaration-like rendering, e.g. `static Node? item(unsigned long index)`.
  pub fn signature(&self, m: MemberId) -> String {
    let member = self.member(m);
    let mut out = String::new();
    if member.modifiers.contains(Modifiers::UNFORGEABLE) {
      out.push_str("[Unforgeable] ");
    }
    if member.modifiers.contains(Modifiers::STATIC) {
      out.push_str("static ");
    }
    match &member.kind {
      MemberKind::Property(prop) => {
        if member.modifiers.contains(Modifiers::CONSTANT) {
          out.push_str("const ");
        } else if member.modifiers.contains(Modifiers::READ_ONLY) {
          out.push_str("readonly ");
        }
        if let Some(ty) = member.ty {
          let _ = write!(out, "{} ", self.type_name(ty));
        }
        out.push_str(&member.name);
        if let Some(value) = &prop.initial_value {
          let _ = write!(out, " = {value}");
        }
      }
      MemberKind::Operation(op) => {
        if !member.is_constructor() {
          match member.ty {
            Some(ty) => {
              let _ = write!(out, "{} ", self.type_name(ty));
            }
            None => out.push_str("void "),
          }
        }
        out.push_str(&member.name);
        out.push('(');
        for (i, p) in op.parameters.iter().enumerate() {
          if i > 0 {
            out.push_str(", ");
          }
          if p.is_optional() {
            out.push_str("optional ");
          }
          out.push_str(self.type_name(p.ty));
          if p.is_variadic() {
            out.push_str("...");
          }
          let _ = write!(out, " {}", p.name);
        }
        out.push(')');
      }
    }
    out
  }

  /// Asks the documentation provider of `lib` about `artifact` and stores the answer on it.
  pub fn document(&mut self, lib: LibraryId, artifact: impl Into<ArtifactId>) {
    let artifact = artifact.into();
    let path = self.artifact_path(artifact);
    let doc = Documentation::lookup(self.library(lib).docs.as_ref(), &path);
    match artifact {
      ArtifactId::Type(t) => self.types[t.index()].documentation = doc,
      ArtifactId::Member(m) => self.members[m.index()].documentation = doc,
      ArtifactId::Library(_) => {}
    }
  }

  pub fn artifact_path(&self, artifact: ArtifactId) -> ArtifactPath {
    let library_of = |t: TypeId| {
      self
        .ty(t)
        .library
        .map_or(String::new(), |lib| self.library(lib).name.clone())
    };
    match artifact {
      ArtifactId::Library(lib) => ArtifactPath::of_type(self.library(lib).name.clone(), ""),
      ArtifactId::Type(t) => ArtifactPath::of_type(library_of(t), self.ty(t).name.clone()),
      ArtifactId::Member(m) => {
        let member = self.member(m);
        match member.owner {
          Some(owner) => ArtifactPath::of_member(
            library_of(owner),
            self.ty(owner).name.clone(),
            member.name.clone(),
          ),
          None => ArtifactPath::of_type(String::new(), member.name.clone()),
        }
      }
    }
  }
}

impl Default for Model {
  fn default() -> Self {
    Self::new()
  }
}
