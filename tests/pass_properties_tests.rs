#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{kinds, load_fixture, pass, reversed_fixture};
use mvigen::config::CodegenConfig;
use mvigen::diagnostics::DiagnosticKind;
use mvigen::pass::{discover, run_pass};
use mvigen::pipeline::partition;
use mvigen::{FsHost, MemoryHost};
use std::collections::BTreeSet;
use std::path::Path;

const FIXTURES: &[&str] = &[
    "login.yaml",
    "music_init.yaml",
    "duplicate_init.yaml",
    "mixed.yaml",
    "deferred.yaml",
    "deferred_event.yaml",
    "ambiguous_event.yaml",
];

#[test]
fn test_two_passes_are_byte_identical() {
    let config = CodegenConfig::default();
    for name in FIXTURES {
        let graph = load_fixture(name);
        let (first_report, first) = pass(&graph, &config);
        let (second_report, second) = pass(&graph, &config);
        assert_eq!(first.files, second.files, "{name}");
        assert_eq!(first.dependencies, second.dependencies, "{name}");
        assert_eq!(first_report.diagnostics, second_report.diagnostics, "{name}");
    }
}

#[test]
fn test_discovery_order_does_not_change_output() {
    let config = CodegenConfig::default();
    for name in FIXTURES {
        let (_, forward) = pass(&load_fixture(name), &config);
        let (_, backward) = pass(&reversed_fixture(name), &config);
        assert_eq!(forward.files, backward.files, "{name}");
        assert_eq!(forward.dependencies, backward.dependencies, "{name}");
    }
}

#[test]
fn test_partition_is_total() {
    let config = CodegenConfig::default();
    for name in FIXTURES {
        let graph = load_fixture(name);
        let descriptors = discover(&graph, &config).descriptors;
        let expected: BTreeSet<String> = descriptors
            .iter()
            .map(|d| d.declaring_type.to_string())
            .collect();

        let grouping = partition(descriptors.clone(), config.init_only_grouping);
        let grouped: Vec<String> = grouping
            .groups
            .iter()
            .flat_map(|g| g.descriptors.iter().map(|d| d.declaring_type.to_string()))
            .collect();
        assert_eq!(grouped.len(), descriptors.len(), "{name}: descriptor duplicated or dropped");
        assert_eq!(grouped.into_iter().collect::<BTreeSet<_>>(), expected, "{name}");
    }
}

#[test]
fn test_multiplicity_holds_for_every_emitted_feature() {
    let config = CodegenConfig::default();
    for name in FIXTURES {
        let graph = load_fixture(name);
        let descriptors = discover(&graph, &config).descriptors;
        let outcome = mvigen::pipeline::group(descriptors, config.init_only_grouping);
        for feature in &outcome.features {
            assert!(feature.group.init_handlers().count() <= 1, "{name}");
            let events: Vec<_> = feature
                .group
                .event_handlers()
                .filter_map(|d| d.event_type())
                .collect();
            let unique: BTreeSet<_> = events.iter().collect();
            assert_eq!(events.len(), unique.len(), "{name}");
        }
    }
}

#[test]
fn test_deferred_declaration_joins_a_later_pass() {
    let config = CodegenConfig::default();
    let mut graph = load_fixture("deferred.yaml");

    let (first, first_host) = pass(&graph, &config);
    assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);
    assert_eq!(first.deferred.len(), 1);
    assert_eq!(first.deferred[0].as_str(), "app.login.LogoutProcessor");
    assert_eq!(first.artifacts.len(), 1);
    assert_eq!(first.artifacts[0].source_descriptors.len(), 1);

    graph
        .declaration_mut("app.login.LogoutProcessor")
        .unwrap()
        .resolvable = true;

    let (second, second_host) = pass(&graph, &config);
    assert!(second.deferred.is_empty());
    assert_eq!(second.artifacts.len(), 1, "no stale duplicate from the first pass");
    let members: Vec<&str> = second.artifacts[0]
        .source_descriptors
        .iter()
        .map(|d| d.as_str())
        .collect();
    assert_eq!(
        members,
        vec!["app.login.LogoutProcessor", "app.login.SubmitProcessor"]
    );
    assert_eq!(first_host.files.len(), second_host.files.len());
}

#[test]
fn test_unresolved_intent_defers_its_processor() {
    let config = CodegenConfig::default();
    let mut graph = load_fixture("deferred_event.yaml");

    let (first, _) = pass(&graph, &config);
    assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);
    let deferred: Vec<&str> = first.deferred.iter().map(|d| d.as_str()).collect();
    assert_eq!(deferred, vec!["app.login.SubmitProcessor"]);
    assert_eq!(first.artifacts.len(), 1);
    assert_eq!(first.artifacts[0].source_descriptors.len(), 1);
    assert_eq!(
        first.artifacts[0].source_descriptors[0].as_str(),
        "app.login.LogoutProcessor"
    );

    graph
        .declaration_mut("app.login.LoginIntent.Submit")
        .unwrap()
        .resolvable = true;

    let (second, host) = pass(&graph, &config);
    assert!(second.deferred.is_empty());
    assert_eq!(second.artifacts[0].source_descriptors.len(), 2);
    let code = &host.files[Path::new("app/login/generated/login_intent_processor_executor.rs")];
    assert!(code.contains("crate::app::login::LoginIntent::Submit(intent) =>"));
}

#[test]
fn test_rerun_without_new_declarations_is_idempotent() {
    let config = CodegenConfig::default();
    let graph = load_fixture("login.yaml");
    let mut host = MemoryHost::new();
    let first = run_pass(&graph, &config, &mut host);
    let files_after_first = host.files.clone();
    let second = run_pass(&graph, &config, &mut host);

    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(host.files, files_after_first);
}

#[test]
fn test_write_failure_is_local_to_its_feature() {
    let config = CodegenConfig::default();
    let graph = load_fixture("mixed.yaml");
    let mut host = MemoryHost::new()
        .failing_on("app/login/generated/login_intent_processor_executor.rs");
    let report = run_pass(&graph, &config, &mut host);

    let io: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::EmissionIoFailure)
        .collect();
    assert_eq!(io.len(), 1);
    assert_eq!(io[0].location, "feature:app.login.LoginIntent");

    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].name, "ProfileIntentProcessorExecutor");
    assert!(host
        .files
        .contains_key(Path::new("app/profile/generated/profile_intent_processor_executor.rs")));
    assert!(!host.files.contains_key(Path::new("app/login/generated/mod.rs")));
}

#[test]
fn test_errors_are_reported_through_the_host() {
    let config = CodegenConfig::default();
    let graph = load_fixture("mixed.yaml");
    let mut host = MemoryHost::new();
    let report = run_pass(&graph, &config, &mut host);
    assert!(report.has_errors());
    assert_eq!(report.error_count(), 3);
    assert_eq!(host.diagnostics, report.diagnostics);
    assert_eq!(
        kinds(&report)
            .iter()
            .filter(|k| **k == DiagnosticKind::IntentTypeNotConcrete)
            .count(),
        2
    );
}

#[test]
fn test_fs_host_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = CodegenConfig::default();
    let graph = load_fixture("login.yaml");
    let mut host = FsHost::new(dir.path(), config.deps_manifest.clone());
    let report = run_pass(&graph, &config, &mut host);
    assert!(!report.has_errors());
    assert_eq!(host.written().len(), 2);

    let generated = dir.path().join("app/login/generated");
    let module = std::fs::read_to_string(generated.join("mod.rs")).unwrap();
    assert!(module.contains("pub use login_intent_processor_executor::LoginIntentProcessorExecutor;"));

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("mvigen-deps.json")).unwrap(),
    )
    .unwrap();
    let artifacts = manifest["artifacts"].as_object().unwrap();
    assert_eq!(artifacts.len(), 2);
    let dispatcher = &artifacts["app/login/generated/login_intent_processor_executor.rs"];
    assert_eq!(dispatcher["namespace"], "app.login.generated");
    assert_eq!(dispatcher["sources"].as_array().unwrap().len(), 2);
}

#[test]
fn test_fs_host_drops_dispatcher_of_a_feature_rejected_later() {
    let dir = tempfile::tempdir().unwrap();
    let config = CodegenConfig::default();
    let mut graph = load_fixture("duplicate_init.yaml");
    graph
        .declaration_mut("app.cart.LegacyCartInit")
        .unwrap()
        .resolvable = false;

    let dispatcher = dir.path().join("app/cart/generated/cart_intent_processor_executor.rs");
    let module = dir.path().join("app/cart/generated/mod.rs");

    let mut host = FsHost::new(dir.path(), config.deps_manifest.clone());
    let first = run_pass(&graph, &config, &mut host);
    assert!(!first.has_errors(), "{:?}", first.diagnostics);
    assert!(dispatcher.exists());
    assert!(module.exists());

    graph
        .declaration_mut("app.cart.LegacyCartInit")
        .unwrap()
        .resolvable = true;
    let mut host = FsHost::new(dir.path(), config.deps_manifest.clone());
    let second = run_pass(&graph, &config, &mut host);
    assert_eq!(kinds(&second), vec![DiagnosticKind::DuplicateInitHandler]);
    assert!(second.artifacts.is_empty());
    assert!(!dispatcher.exists(), "rejected feature left its dispatcher behind");
    assert!(!module.exists(), "module index still exports the rejected dispatcher");

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join(&config.deps_manifest)).unwrap(),
    )
    .unwrap();
    assert!(manifest["artifacts"].as_object().unwrap().is_empty());
}
