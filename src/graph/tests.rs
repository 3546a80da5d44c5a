#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;

#[test]
fn test_parse_simple_and_generic_refs() {
    let plain = TypeRef::parse("com.example.LoginState").unwrap();
    assert_eq!(plain.name, "com.example.LoginState");
    assert!(plain.args.is_empty());

    let generic = TypeRef::parse("mvi.IntentProcessor<a.S, a.I.Submit, a.E>").unwrap();
    assert_eq!(generic.name, "mvi.IntentProcessor");
    assert_eq!(generic.args.len(), 3);
    assert_eq!(generic.args[1].name, "a.I.Submit");
    assert_eq!(generic.to_string(), "mvi.IntentProcessor<a.S, a.I.Submit, a.E>");
}

#[test]
fn test_parse_nested_and_nullable() {
    let nested = TypeRef::parse("kotlin.collections.Map<kotlin.String, kotlin.collections.List<a.B?>>")
        .unwrap();
    assert_eq!(nested.args[1].args[0].name, "a.B");
}

#[test]
fn test_parse_rejects_malformed() {
    assert!(TypeRef::parse("").is_err());
    assert!(TypeRef::parse("a.B<").is_err());
    assert!(TypeRef::parse("a.B<C D>").is_err());
    assert!(TypeRef::parse("a.B> trailing").is_err());
    assert!(TypeRef::parse(".a.B").is_err());
}

#[test]
fn test_default_package() {
    assert_eq!(default_package("com.example.login.LoginIntent.Submit"), "com.example.login");
    assert_eq!(default_package("com.example.LoginState"), "com.example");
    assert_eq!(default_package("Root"), "");
}

#[test]
fn test_substitute_only_touches_params() {
    let mut sup = TypeRef::parse("mvi.IntentProcessor<a.S, E, a.F>").unwrap();
    sup.mark_params(&["E".to_string()]);
    assert!(sup.args[1].param);
    assert!(!sup.args[0].param);

    let bound = sup.substitute(&[("E".to_string(), TypeRef::named("a.I.Go"))]);
    assert_eq!(bound.to_string(), "mvi.IntentProcessor<a.S, a.I.Go, a.F>");
    assert!(!bound.args[1].param);
}

const CHAIN: &str = r#"
declarations:
  - name: mvi.IntentProcessor
    kind: interface
    type_parameters: [S, I, E]
  - name: app.base.BaseProcessor
    kind: class
    type_parameters: [I]
    supertypes: ["mvi.IntentProcessor<app.LoginState, I, app.LoginEffect>"]
  - name: app.GoProcessor
    kind: class
    annotations: [mvi.Processor]
    supertypes: ["app.base.BaseProcessor<app.LoginIntent.Go>"]
  - name: app.LoginIntent.Go
    kind: class
    supertypes: [app.LoginIntent]
"#;

#[test]
fn test_supertype_closure_substitutes_through_chain() {
    let graph = ModelGraph::from_yaml_str(CHAIN).unwrap();
    let decl = graph.declaration("app.GoProcessor").unwrap();
    let closure = graph.supertype_closure(decl);
    let names: Vec<_> = closure.iter().map(|t| t.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "app.base.BaseProcessor<app.LoginIntent.Go>",
            "mvi.IntentProcessor<app.LoginState, app.LoginIntent.Go, app.LoginEffect>",
        ]
    );
}

#[test]
fn test_slot_argument_by_name_then_position() {
    let graph = ModelGraph::from_yaml_str(CHAIN).unwrap();
    let binding = TypeRef::parse("mvi.IntentProcessor<x.S, x.I, x.E>").unwrap();
    // Named lookup wins over a wrong fallback position.
    let by_name = graph.slot_argument(&binding, "I", 0).unwrap();
    assert_eq!(by_name.name, "x.I");

    let unknown = TypeRef::parse("other.Contract<x.S, x.I>").unwrap();
    let by_position = graph.slot_argument(&unknown, "I", 1).unwrap();
    assert_eq!(by_position.name, "x.I");
    assert!(graph.slot_argument(&unknown, "I", 5).is_none());
}

#[test]
fn test_supertype_closure_is_cycle_safe() {
    let yaml = r#"
declarations:
  - name: a.A
    kind: interface
    supertypes: [a.B]
  - name: a.B
    kind: interface
    supertypes: [a.A]
"#;
    let graph = ModelGraph::from_yaml_str(yaml).unwrap();
    let closure = graph.supertype_closure(graph.declaration("a.A").unwrap());
    assert_eq!(closure.len(), 1);
    assert_eq!(closure[0].name, "a.B");
}

#[test]
fn test_marked_and_validate() {
    let yaml = r#"
declarations:
  - name: a.Late
    kind: class
    annotations: [mvi.Processor]
    resolvable: false
  - name: a.Ready
    kind: class
    annotations: [mvi.Processor]
    supertypes: [a.Pending]
  - name: a.Pending
    kind: interface
    resolvable: false
  - name: a.Plain
    kind: class
"#;
    let graph = ModelGraph::from_yaml_str(yaml).unwrap();
    let marked = graph.marked("mvi.Processor");
    assert_eq!(marked.len(), 2);
    assert_eq!(marked[0].id.as_str(), "a.Late");
    assert!(!graph.validate(marked[0]));
    // A declaration whose supertype is still unresolved is deferred as well.
    assert!(!graph.validate(marked[1]));
}

#[test]
fn test_validate_checks_nested_type_arguments() {
    let yaml = r#"
declarations:
  - name: a.Box
    kind: class
    type_parameters: [T]
  - name: a.Later
    kind: class
    resolvable: false
  - name: a.Wrapped
    kind: class
    annotations: [mvi.Processor]
    supertypes: ["mvi.IntentProcessor<a.S, a.Box<a.Later>, a.E>"]
  - name: a.Generic
    kind: class
    annotations: [mvi.Processor]
    type_parameters: [T]
    supertypes: ["mvi.IntentProcessor<a.S, T, a.E>"]
"#;
    let graph = ModelGraph::from_yaml_str(yaml).unwrap();
    assert_eq!(graph.len(), 4);
    assert!(!graph.is_empty());
    assert!(!graph.validate(graph.declaration("a.Wrapped").unwrap()));
    assert!(graph.validate(graph.declaration("a.Generic").unwrap()));
}

#[test]
fn test_empty_manifest_loads() {
    let graph = ModelGraph::from_yaml_str("declarations: []\n").unwrap();
    assert!(graph.is_empty());
    assert!(graph.marked("mvi.Processor").is_empty());
}

#[test]
fn test_duplicate_declaration_rejected() {
    let yaml = r#"
declarations:
  - name: a.A
    kind: class
  - name: a.A
    kind: object
"#;
    let err = ModelGraph::from_yaml_str(yaml).unwrap_err();
    assert!(err.to_string().contains("Duplicate declaration"));
}

#[test]
fn test_json_manifest() {
    let json = r#"{"declarations":[{"name":"a.S","kind":"class","package":"custom.pkg"}]}"#;
    let graph = ModelGraph::from_json_str(json).unwrap();
    assert_eq!(graph.declaration("a.S").unwrap().package, "custom.pkg");
}
