use fieldtree_config::{
    HISTORY_LIMIT, OperationKind, OperationOutcome, OperationRecord, PreferenceStore, Preferences,
};
use fieldtree_test_support::fixtures::temp_dir;

#[test]
fn history_survives_repeated_sessions_and_stays_capped() -> anyhow::Result<()> {
    let temp = temp_dir()?;
    let store = PreferenceStore::new(temp.path().join("fieldtree.json"));

    for session in 0..6 {
        let mut prefs = store.load()?;
        for op in 0..10 {
            prefs.record(OperationRecord::success(
                OperationKind::Create,
                format!("session {session} op {op}"),
            ));
        }
        prefs.record(OperationRecord::failure(
            OperationKind::Compress,
            format!("session {session}"),
            "no device directories",
        ));
        store.save(&prefs)?;
    }

    let prefs = store.load()?;
    assert_eq!(prefs.history.len(), HISTORY_LIMIT);
    let newest = prefs.recent(Some(1)).next();
    assert_eq!(newest.map(|op| op.description.as_str()), Some("session 5"));
    assert_eq!(newest.map(|op| op.outcome), Some(OperationOutcome::Error));
    Ok(())
}

#[test]
fn document_is_human_readable_json() -> anyhow::Result<()> {
    let temp = temp_dir()?;
    let path = temp.path().join("fieldtree.json");
    let store = PreferenceStore::new(&path);

    let mut prefs = Preferences {
        last_root: Some(temp.path().join("plants")),
        ..Preferences::default()
    };
    prefs.record(OperationRecord::success(
        OperationKind::Create,
        "100/INV-3-PVPM (5 sub-units)",
    ));
    store.save(&prefs)?;

    let raw = std::fs::read_to_string(&path)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(value["archive"]["method"], "deflated");
    assert_eq!(value["history"][0]["kind"], "CREATE");
    assert!(raw.contains('\n'), "document should be pretty-printed");
    Ok(())
}
