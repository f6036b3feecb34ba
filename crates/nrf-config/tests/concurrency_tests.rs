//! Competing writers on the same key
//!
//! The competing write runs between the reader's fetch and its write; the
//! stale writer must be rejected and the competing write must survive.

use nrf_document::{ConfigKey, ConfigKind, PatchItem};
use nrf_model::{NfDiscoverSystemOptions, NfScreeningRulesListType, NfScreeningType, NrfSystemOptions, ProblemKind};
use nrf_store::DocumentStore;
use nrf_test_utils::{owner, sample_screening_rules, seeded_store, InterleavingStore, TestHarness};
use serde_json::json;
use std::sync::Arc;

const FQDN: NfScreeningRulesListType = NfScreeningRulesListType::NfFqdn;

fn threshold(value: u32) -> NrfSystemOptions {
    NrfSystemOptions {
        nf_discover_system_options: Some(NfDiscoverSystemOptions {
            discovery_result_load_threshold: Some(value),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn racing_harness() -> (TestHarness<InterleavingStore>, TestHarness) {
    let inner = Arc::new(seeded_store());
    let racing = TestHarness::with_store(Arc::new(InterleavingStore::new(inner.clone())));
    let competitor = TestHarness::with_store(inner);
    (racing, competitor)
}

#[test]
fn stale_patch_is_rejected() {
    let (racing, competitor) = racing_harness();
    racing.store.after_find(ConfigKind::ScreeningRules(FQDN), move || {
        competitor
            .service
            .patch_screening_rule(FQDN, &[PatchItem::replace("/nfScreeningType", json!("WHITELIST"))])
            .unwrap();
    });

    let err = racing
        .service
        .patch_screening_rule(FQDN, &[PatchItem::replace("/nfScreeningRulesListStatus", json!("DISABLED"))])
        .unwrap_err();
    assert_eq!(err.kind(), ProblemKind::Conflict);
    assert_eq!(err.status, 409);

    let current = racing.service.screening_rule(FQDN).unwrap();
    assert_eq!(current.nf_screening_type, NfScreeningType::Whitelist);
    let stored = racing
        .store
        .inner()
        .find(&ConfigKey::new(owner(), ConfigKind::ScreeningRules(FQDN)))
        .unwrap()
        .unwrap();
    assert_eq!(stored.revision(), 2);
}

#[test]
fn stale_replace_is_rejected() {
    let (racing, competitor) = racing_harness();
    racing.store.after_find(ConfigKind::ScreeningRules(FQDN), move || {
        let mut rules = sample_screening_rules(FQDN);
        rules.nf_screening_type = NfScreeningType::Whitelist;
        competitor.service.replace_screening_rule(FQDN, rules).unwrap();
    });

    let err = racing
        .service
        .replace_screening_rule(FQDN, sample_screening_rules(FQDN))
        .unwrap_err();
    assert_eq!(err.kind(), ProblemKind::Conflict);
}

#[test]
fn stale_options_update_is_rejected_for_both_halves() {
    let (racing, competitor) = racing_harness();
    racing.store.after_find(ConfigKind::ErrorResponses, move || {
        competitor.service.update_system_options(threshold(10)).unwrap();
    });

    let err = racing.service.update_system_options(threshold(20)).unwrap_err();
    assert_eq!(err.kind(), ProblemKind::Conflict);

    let current = racing.service.system_options().unwrap();
    assert_eq!(
        current.nf_discover_system_options.unwrap().discovery_result_load_threshold,
        Some(10)
    );
    for kind in [ConfigKind::SystemOptions, ConfigKind::ErrorResponses] {
        let stored = racing.store.inner().find(&ConfigKey::new(owner(), kind)).unwrap().unwrap();
        assert_eq!(stored.revision(), 2);
    }
}

#[test]
fn sequential_updates_both_apply() {
    let harness = TestHarness::new();
    harness.service.update_system_options(threshold(10)).unwrap();
    let updated = harness.service.update_system_options(threshold(20)).unwrap();
    assert_eq!(
        updated.nf_discover_system_options.unwrap().discovery_result_load_threshold,
        Some(20)
    );
    let stored = harness
        .store
        .find(&ConfigKey::new(owner(), ConfigKind::SystemOptions))
        .unwrap()
        .unwrap();
    assert_eq!(stored.revision(), 3);
}

#[test]
fn threads_racing_on_one_key_never_lose_an_accepted_update() {
    let harness = Arc::new(TestHarness::new());
    let handles: Vec<_> = (0..8u32)
        .map(|i| {
            let harness = Arc::clone(&harness);
            std::thread::spawn(move || harness.service.update_system_options(threshold(i * 10)).map(|_| i))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let accepted: Vec<u32> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
    assert!(!accepted.is_empty());
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.kind(), ProblemKind::Conflict);
    }

    let stored = harness
        .store
        .find(&ConfigKey::new(owner(), ConfigKind::SystemOptions))
        .unwrap()
        .unwrap();
    assert_eq!(stored.revision(), 1 + accepted.len() as u64);
}
