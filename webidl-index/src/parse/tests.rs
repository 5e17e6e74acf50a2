use super::IdlParser;
use crate::docs::NoDocumentation;
use crate::error::IdlError;
use crate::error::SyntaxErrorType;
use crate::model::Kind;
use crate::model::LibraryId;
use crate::model::Model;
use crate::model::Modifiers;
use crate::model::Specials;
use crate::model::TypeId;
use crate::token::TT;

fn setup() -> (Model, LibraryId) {
  let mut model = Model::new();
  let lib = model.add_library("test", true, Box::new(NoDocumentation));
  (model, lib)
}

fn parse_ok(model: &mut Model, lib: LibraryId, src: &str) {
  if let Err(err) = IdlParser::new(model, lib, src).parse() {
    panic!("failed to parse {src:?}: {err}");
  }
}

fn syntax_error(src: &str) -> SyntaxErrorType {
  let (mut model, lib) = setup();
  match IdlParser::new(&mut model, lib, src).parse() {
    Err(IdlError::Syntax(err)) => err.typ,
    other => panic!("expected syntax error for {src:?}, got {other:?}"),
  }
}

fn parse_type(model: &mut Model, lib: LibraryId, src: &str) -> TypeId {
  let mut p = IdlParser::new(model, lib, src);
  let t = p.parse_type().unwrap();
  assert_eq!(p.peek_typ(), TT::EOF, "trailing input in {src:?}");
  t
}

fn chain(model: &Model, mut t: TypeId) -> Vec<(Kind, String)> {
  let mut out = vec![(model.ty(t).kind(), model.type_name(t).to_string())];
  while let (Kind::Array | Kind::Nullable | Kind::Sequence, Some(next)) =
    (model.ty(t).kind(), model.ty(t).super_type())
  {
    t = next;
    out.push((model.ty(t).kind(), model.type_name(t).to_string()));
  }
  out
}

#[test]
fn test_parser_lookahead() {
  let (mut model, lib) = setup();
  let mut p = IdlParser::new(&mut model, lib, "readonly attribute long x;");
  assert!(p.is_keyword("readonly"));
  assert!(!p.consume_if_keyword("attribute"));
  assert!(p.consume_if_keyword("readonly"));
  assert!(p.is_any_keyword(&["const", "attribute"]));
  p.require_keyword("attribute").unwrap();
  assert_eq!(p.require_identifier().unwrap(), "long");
  assert!(!p.consume_if(TT::Semicolon));
  assert_eq!(p.sval(), "x");
  p.consume();
  p.require(TT::Semicolon).unwrap();
  assert_eq!(p.peek_typ(), TT::EOF);
}

#[test]
fn test_compound_primitive_names() {
  let (mut model, lib) = setup();
  for (src, name) in [
    ("unsigned long long", "unsigned long long"),
    ("long long", "long long"),
    ("unsigned short", "unsigned short"),
    ("unrestricted double", "unrestricted double"),
    ("dom::core::Node", "Node"),
  ] {
    let t = parse_type(&mut model, lib, src);
    assert_eq!(model.type_name(t), name);
  }
  let t = parse_type(&mut model, lib, "long long");
  assert_eq!(Some(t), model.get_type("long long"));
}

#[test]
fn test_unsigned_before_question_is_unsigned_int() {
  let (mut model, lib) = setup();
  let t = parse_type(&mut model, lib, "unsigned ?");
  assert_eq!(chain(&model, t), vec![
    (Kind::Nullable, "unsigned int?".to_string()),
    (Kind::Primitive, "unsigned int".to_string()),
  ]);
}

#[test]
fn test_suffixes() {
  let (mut model, lib) = setup();
  let t = parse_type(&mut model, lib, "long?[]");
  assert_eq!(chain(&model, t), vec![
    (Kind::Array, "long?[]".to_string()),
    (Kind::Nullable, "long?".to_string()),
    (Kind::Primitive, "long".to_string()),
  ]);

  let t = parse_type(&mut model, lib, "long?[]?");
  let kinds: Vec<Kind> = chain(&model, t).into_iter().map(|(k, _)| k).collect();
  assert_eq!(kinds, vec![
    Kind::Nullable,
    Kind::Array,
    Kind::Nullable,
    Kind::Primitive,
  ]);

  let t = parse_type(&mut model, lib, "sequence<Node?>?");
  assert_eq!(chain(&model, t), vec![
    (Kind::Nullable, "sequence<Node?>?".to_string()),
    (Kind::Sequence, "sequence<Node?>".to_string()),
    (Kind::Nullable, "Node?".to_string()),
    (Kind::NoInterfaceObject, "Node".to_string()),
  ]);
}

#[test]
fn test_composites_are_not_shared() {
  let (mut model, lib) = setup();
  let a = parse_type(&mut model, lib, "long[]");
  let b = parse_type(&mut model, lib, "long[]");
  assert_ne!(a, b);
  assert_eq!(model.ty(a).super_type(), model.ty(b).super_type());
  assert_eq!(model.ty(a).library(), Some(Model::HIDDEN));
  assert_eq!(model.library(Model::HIDDEN).get_type("long[]"), None);
}

#[test]
fn test_union_drops_trailing_question() {
  let (mut model, lib) = setup();
  let t = parse_type(&mut model, lib, "(Node or DOMString or sequence<long>)?");
  let union = model.ty(t);
  assert_eq!(union.kind(), Kind::Union);
  assert_eq!(union.name(), "(Node or DOMString or sequence<long>)");
  assert_eq!(union.types().len(), 3);
  assert_eq!(Some(union.types()[0]), model.get_type("Node"));
}

#[test]
fn test_generics_and_iterable() {
  let (mut model, lib) = setup();
  let t = parse_type(&mut model, lib, "Promise<sequence<DOMString>>");
  let generic = model.ty(t);
  assert_eq!(generic.kind(), Kind::Generic);
  assert_eq!(generic.name(), "Promise<sequence<DOMString>>");
  assert_eq!(generic.types().len(), 1);
  assert_eq!(generic.super_type(), Some(generic.types()[0]));
  assert!(generic.iterable().is_none());

  let t = parse_type(&mut model, lib, "iterable<DOMString, long>");
  let it = model.ty(t).iterable().unwrap();
  assert_eq!(model.type_name(it.key), "DOMString");
  assert_eq!(it.value, model.get_type("long"));
  assert_eq!(model.ty(t).super_type(), model.get_type("long"));

  let t = parse_type(&mut model, lib, "iterable<Node>");
  assert_eq!(model.ty(t).iterable().unwrap().value, None);
}

#[test]
fn test_extended_attributes_shape_the_type() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      [Global=(Window,Worker), PrimaryGlobal, Exposed=Window, ArrayClass]
      interface Window {};
      [NoInterfaceObject, Global] interface Both {};
      [Global, NoInterfaceObject] interface GlobalFirst {};
      [Exposed=(Window,Worker), LegacyWindowAlias=webkitURL&URL2, Conditional=A|B,
       CustomConstructor(long x), Callback=FunctionOnly]
      interface URL {};
      [Conditional="A&B"] interface Odd {};
    "#,
  );
  let window = model.get_type("Window").unwrap();
  assert_eq!(model.ty(window).kind(), Kind::Global);
  assert!(model
    .ty(window)
    .modifiers()
    .contains(Modifiers::PRIMARY_GLOBAL | Modifiers::ARRAY_CLASS));
  let both = model.get_type("Both").unwrap();
  assert_eq!(model.ty(both).kind(), Kind::Global);
  let first = model.get_type("GlobalFirst").unwrap();
  assert_eq!(model.ty(first).kind(), Kind::Global);
  let url = model.get_type("URL").unwrap();
  assert_eq!(model.ty(url).kind(), Kind::Interface);
}

#[test]
fn test_unknown_extended_attribute_is_fatal() {
  let (mut model, lib) = setup();
  let err = IdlParser::new(&mut model, lib, "[Frobnicate] interface A {};")
    .parse()
    .unwrap_err();
  let IdlError::Syntax(err) = err else {
    panic!("expected syntax error");
  };
  assert_eq!(err.typ, SyntaxErrorType::UnknownExtendedAttribute);
  assert_eq!(err.token, "Frobnicate");
  assert_eq!(err.library, "test");
  assert_eq!((err.line, err.column), (1, 2));
}

#[test]
fn test_constructors() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      [NoInterfaceObject, Constructor, Constructor(DOMString type, optional EventInit init),
       NamedConstructor=Image(optional unsigned long width)]
      interface HTMLImageElement {};
      interface Modern { constructor(long a); };
    "#,
  );
  let img = model.get_type("HTMLImageElement").unwrap();
  assert_eq!(model.ty(img).kind(), Kind::Interface);
  let ctors = model.ty(img).constructors();
  assert_eq!(ctors.len(), 3);
  let names: Vec<&str> = ctors.iter().map(|&c| model.member(c).name()).collect();
  assert_eq!(names, vec!["HTMLImageElement", "HTMLImageElement", "Image"]);
  assert_eq!(model.member(ctors[1]).parameters().len(), 2);
  assert!(model.member(ctors[1]).parameters()[1].is_optional());
  assert!(ctors.iter().all(|&c| model.member(c).is_constructor()));

  let modern = model.get_type("Modern").unwrap();
  assert_eq!(model.ty(modern).constructors().len(), 1);
  assert_eq!(model.ty(modern).operations().count(), 0);
}

#[test]
fn test_member_level_attributes_are_skipped() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      interface A {
        [Unknown, Whatever=(1, 2)] readonly attribute long x;
        [Unforgeable] readonly attribute Location location;
        [Throws, Unforgeable] static boolean check();
        void f([Clamp] optional long a, [TreatNullAs=EmptyString] DOMString b);
      };
    "#,
  );
  let a = model.get_type("A").unwrap();
  let x = model.property(a, "x").unwrap();
  assert!(!model.member(x).modifiers().contains(Modifiers::UNFORGEABLE));

  let location = model.property(a, "location").unwrap();
  let modifiers = model.member(location).modifiers();
  assert!(modifiers.contains(Modifiers::UNFORGEABLE | Modifiers::READ_ONLY));
  assert_eq!(
    model.signature(location),
    "[Unforgeable] readonly Location location"
  );

  let check = model.operation(a, "check").unwrap();
  assert!(model
    .member(check)
    .modifiers()
    .contains(Modifiers::UNFORGEABLE | Modifiers::STATIC));

  let f = model.operation(a, "f").unwrap();
  let params = model.member(f).parameters();
  assert_eq!(params.len(), 2);
  assert!(params[0].modifiers.contains(Modifiers::OPTIONAL));
  assert!(!params[0].modifiers.contains(Modifiers::UNFORGEABLE));
  assert!(!model.member(f).modifiers().contains(Modifiers::UNFORGEABLE));
}

#[test]
fn test_specials_and_names() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      interface Storage {
        getter DOMString? getItem(DOMString key);
        setter creator void (DOMString name, DOMString value);
        deleter void (DOMString name);
        legacycaller any (any... args);
        stringifier;
        stringifier attribute DOMString href;
        static Storage create();
      };
    "#,
  );
  let storage = model.get_type("Storage").unwrap();
  let get_item = model.operation(storage, "getItem").unwrap();
  assert_eq!(
    model.member(get_item).as_operation().unwrap().specials,
    Specials::GETTER
  );
  let set = model.operation(storage, "setter creator").unwrap();
  assert_eq!(model.member(set).as_operation().unwrap().specials, Specials::SETTER);
  let del = model.operation(storage, "deleter").unwrap();
  assert!(model.member(del).as_operation().unwrap().specials.is_empty());
  let call = model.operation(storage, "legacycaller").unwrap();
  assert!(model.member(call).parameters()[0].is_variadic());
  assert!(model.property(storage, "href").is_some());
  let create = model.operation(storage, "create").unwrap();
  assert!(model.member(create).modifiers().contains(Modifiers::STATIC));
}

#[test]
fn test_serializer_and_nested_typedef() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      interface Perf {
        serializer = { attribute, inherit };
        serializer;
        typedef sequence<long> Longs;
        readonly attribute Longs values raises(DOMException);
      };
    "#,
  );
  let longs = model.get_type("Longs").unwrap();
  assert_eq!(model.ty(longs).kind(), Kind::Alias);
  let perf = model.get_type("Perf").unwrap();
  let values = model.property(perf, "values").unwrap();
  assert_eq!(model.member(values).ty(), Some(longs));
  assert!(model.member(values).modifiers().contains(Modifiers::READ_ONLY));
}

#[test]
fn test_parameter_defaults_and_raises() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      interface A {
        void f(optional long a = -1, optional B b = {}, optional sequence<long> c = [], in DOMString d)
          raises(DOMException);
        void g(optional DOMString s = "x, y");
      };
    "#,
  );
  let a = model.get_type("A").unwrap();
  let f = model.operation(a, "f").unwrap();
  let names: Vec<&str> = model
    .member(f)
    .parameters()
    .iter()
    .map(|p| p.name.as_str())
    .collect();
  assert_eq!(names, vec!["a", "b", "c", "d"]);
  let g = model.operation(a, "g").unwrap();
  assert_eq!(model.member(g).parameters().len(), 1);
}

#[test]
fn test_consts_keep_raw_text() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      const unsigned short TOP_LEVEL = 0x10;
      interface Node { const unsigned short ELEMENT_NODE = 1; const double E = - 2.5e3; };
    "#,
  );
  let globals = model.library(lib).globals();
  let top = model.property(globals, "TOP_LEVEL").unwrap();
  assert_eq!(
    model.member(top).as_property().unwrap().initial_value.as_deref(),
    Some("0x10")
  );
  assert!(model.member(top).modifiers().contains(Modifiers::CONSTANT));
  let node = model.get_type("Node").unwrap();
  let e = model.property(node, "E").unwrap();
  assert_eq!(
    model.member(e).as_property().unwrap().initial_value.as_deref(),
    Some("- 2.5e3")
  );
}

#[test]
fn test_enum_dictionary_exception() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      enum Mode { "open", "closed", };
      enum Empty {};
      dictionary Base {};
      dictionary Init : Base {
        [Clamp] required long count;
        DOMString label = "none";
        Mode mode;
      };
      exception DOMException : Base {
        const unsigned short INDEX_SIZE_ERR = 1;
        unsigned short code;
      };
    "#,
  );
  let mode = model.get_type("Mode").unwrap();
  assert_eq!(model.ty(mode).kind(), Kind::Enum);
  assert_eq!(model.ty(mode).enum_literals(), &["open", "closed"]);
  let empty = model.get_type("Empty").unwrap();
  assert!(model.ty(empty).enum_literals().is_empty());

  let init = model.get_type("Init").unwrap();
  assert_eq!(model.ty(init).kind(), Kind::Dictionary);
  assert_eq!(model.ty(init).super_type(), model.get_type("Base"));
  let label = model.property(init, "label").unwrap();
  assert_eq!(
    model.member(label).as_property().unwrap().initial_value.as_deref(),
    Some("\"none\"")
  );
  assert!(model.ty(mode).referenced_by().contains(&model.property(init, "mode").unwrap()));

  let ex = model.get_type("DOMException").unwrap();
  assert_eq!(model.ty(ex).kind(), Kind::Exception);
  assert_eq!(model.ty(ex).properties().count(), 2);
}

#[test]
fn test_typedef_valuetype_module() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      module dom {
        typedef [Clamp] unsigned long long DOMTimeStamp;
        valuetype DOMString sequence<unsigned short>;
        interface Event { readonly attribute DOMTimeStamp timeStamp; };
      };
    "#,
  );
  let ts = model.get_type("DOMTimeStamp").unwrap();
  assert_eq!(model.ty(ts).kind(), Kind::Alias);
  assert_eq!(model.ty(ts).super_type(), model.get_type("unsigned long long"));
  let ull = model.get_type("unsigned long long").unwrap();
  assert_eq!(model.ty(ull).implemented_by(), &[ts]);
  let dom_string = model.get_type("DOMString").unwrap();
  assert_eq!(model.ty(dom_string).kind(), Kind::Primitive);
  assert_eq!(
    model.type_name(model.ty(dom_string).super_type().unwrap()),
    "sequence<unsigned short>"
  );
}

#[test]
fn test_callbacks() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      callback EventHandlerNonNull = any (Event event);
      [TreatNonCallableAsNull] callback Fn = void ();
      callback interface EventListener { void handleEvent(Event event); };
    "#,
  );
  let handler = model.get_type("EventHandlerNonNull").unwrap();
  assert_eq!(model.ty(handler).kind(), Kind::CallbackFunction);
  let op = model.operation(handler, "EventHandlerNonNull").unwrap();
  assert_eq!(model.member(op).ty(), model.get_type("any"));
  assert_eq!(model.member(op).parameters().len(), 1);
  let f = model.get_type("Fn").unwrap();
  assert_eq!(model.member(model.operation(f, "Fn").unwrap()).ty(), None);
  let listener = model.get_type("EventListener").unwrap();
  assert_eq!(model.ty(listener).kind(), Kind::CallbackInterface);
}

#[test]
fn test_implements_and_includes() {
  let (mut model, lib) = setup();
  parse_ok(
    &mut model,
    lib,
    r#"
      interface Window : EventTarget, WindowBase64 {};
      Window implements GlobalEventHandlers;
      interface mixin WindowOrWorkerGlobalScope {};
      Window includes WindowOrWorkerGlobalScope;
    "#,
  );
  let window = model.get_type("Window").unwrap();
  let names: Vec<&str> = model
    .ty(window)
    .types()
    .iter()
    .map(|&t| model.type_name(t))
    .collect();
  assert_eq!(names, vec![
    "WindowBase64",
    "GlobalEventHandlers",
    "WindowOrWorkerGlobalScope"
  ]);
  let mixin = model.get_type("WindowOrWorkerGlobalScope").unwrap();
  assert_eq!(model.ty(mixin).kind(), Kind::NoInterfaceObject);
  assert_eq!(model.ty(mixin).implemented_by(), &[window]);
  let target = model.get_type("EventTarget").unwrap();
  assert_eq!(model.ty(window).super_type(), Some(target));
  assert_eq!(model.ty(target).implemented_by(), &[window]);
}

#[test]
fn test_syntax_errors() {
  assert_eq!(
    syntax_error("interface A { attribute long x }"),
    SyntaxErrorType::RequiredTokenNotFound(TT::Semicolon)
  );
  assert_eq!(
    syntax_error("42;"),
    SyntaxErrorType::ExpectedSyntax(
      "dictionary, callback, exception, interface, typedef, valuetype, module or const"
    )
  );
  assert_eq!(
    syntax_error("A extends B;"),
    SyntaxErrorType::ExpectedKeyword("implements")
  );
  assert_eq!(
    syntax_error("interface A { void f(long a long b); };"),
    SyntaxErrorType::ExpectedSyntax("`,` or `)`")
  );
  assert_eq!(
    syntax_error("interface A {"),
    SyntaxErrorType::RequiredTokenNotFound(TT::BraceClose)
  );
  assert_eq!(
    syntax_error("enum E { open };"),
    SyntaxErrorType::RequiredTokenNotFound(TT::String)
  );
  assert_eq!(
    syntax_error("interface A {}; }"),
    SyntaxErrorType::RequiredTokenNotFound(TT::EOF)
  );
  assert_eq!(
    syntax_error("[Global] typedef long T;"),
    SyntaxErrorType::ExpectedSyntax("interface, callback, exception or dictionary")
  );
}
