//! Commands run against a snapshot on disk, as the binary does

use nrf_config::{ConfigurationService, RecordingLogSink};
use nrf_configctl::{CtlCommand, StateSnapshot};
use nrf_document::{ConfigKey, ConfigKind, PatchItem};
use nrf_model::{LogLevel, NfScreeningRulesListType};
use nrf_store::{DocumentStore, MemoryEventLog, MemoryStore};
use nrf_test_utils::{owner, sample_events, seeded_store, test_config};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn open(path: &Path) -> (ConfigurationService, Arc<MemoryStore>, Arc<MemoryEventLog>) {
    let (store, events) = StateSnapshot::load(path).unwrap().into_stores().unwrap();
    let store = Arc::new(store);
    let events = Arc::new(events);
    let service = ConfigurationService::new(
        test_config(),
        store.clone(),
        events.clone(),
        Arc::new(RecordingLogSink::new(LogLevel::Info)),
    )
    .unwrap();
    (service, store, events)
}

fn write_seed(path: &Path) {
    let events = MemoryEventLog::from_events(sample_events());
    StateSnapshot::capture(&seeded_store(), &events).unwrap().save(path).unwrap();
}

#[test]
fn patch_survives_a_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    write_seed(&path);

    let (service, store, events) = open(&path);
    let patch = CtlCommand::PatchRule(
        NfScreeningRulesListType::NfFqdn,
        vec![PatchItem::replace("/nfScreeningType", json!("WHITELIST"))],
    );
    assert!(patch.is_write());
    let body = patch.run(&service).unwrap();
    assert_eq!(body["nfScreeningType"], "WHITELIST");
    StateSnapshot::capture(&store, &events).unwrap().save(&path).unwrap();

    let (reloaded, _, _) = open(&path);
    let body = CtlCommand::ShowRule(NfScreeningRulesListType::NfFqdn)
        .run(&reloaded)
        .unwrap();
    assert_eq!(body["nfScreeningType"], "WHITELIST");
}

#[test]
fn update_after_reload_continues_revisions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    write_seed(&path);

    let (service, store, _) = open(&path);
    let options = CtlCommand::ShowOptions.run(&service).unwrap();
    let request = serde_json::from_value(options.clone()).unwrap();
    let updated = CtlCommand::UpdateOptions(request).run(&service).unwrap();
    assert_eq!(updated, options);

    let primary = store
        .find(&ConfigKey::new(owner(), ConfigKind::SystemOptions))
        .unwrap()
        .unwrap();
    assert_eq!(primary.revision(), 2);
}

#[test]
fn failed_command_reports_problem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let (service, _, _) = open(&path);
    let problem = CtlCommand::ShowOptions.run(&service).unwrap_err();
    assert_eq!(problem.status, 404);

    let problem = CtlCommand::ProfileEvents(None).run(&service).unwrap_err();
    assert_eq!(problem.detail, "Could not fetch NrfEventTransactions");
}
