use morfi_core::SelectionState;

use crate::persisted::{
    StoredIdentity, StoredSelections, IDENTITY_KEY, IDENTITY_VERSION, STATE_KEY, STATE_VERSION,
};

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub(crate) fn load_identity() -> Option<StoredIdentity> {
    let raw = local_storage()?.get_item(IDENTITY_KEY).ok()??;
    let record: StoredIdentity = serde_json::from_str(&raw).ok()?;
    if record.version != IDENTITY_VERSION || record.user_id.is_empty() {
        return None;
    }
    Some(record)
}

pub(crate) fn save_identity(record: &StoredIdentity) {
    let Ok(raw) = serde_json::to_string(record) else {
        return;
    };
    let Some(storage) = local_storage() else {
        return;
    };
    let _ = storage.set_item(IDENTITY_KEY, &raw);
}

pub(crate) fn load_selections() -> SelectionState {
    let Some(record) = read_selections() else {
        return SelectionState::new();
    };
    SelectionState::restore(record.selected)
}

pub(crate) fn save_selections(state: &SelectionState) {
    let record = StoredSelections {
        version: STATE_VERSION,
        selected: state.entries(),
    };
    let Ok(raw) = serde_json::to_string(&record) else {
        return;
    };
    let Some(storage) = local_storage() else {
        return;
    };
    let _ = storage.set_item(STATE_KEY, &raw);
}

fn read_selections() -> Option<StoredSelections> {
    let raw = local_storage()?.get_item(STATE_KEY).ok()??;
    let record: StoredSelections = serde_json::from_str(&raw).ok()?;
    if record.version != STATE_VERSION {
        return None;
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn clear_keys() {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(IDENTITY_KEY);
            let _ = storage.remove_item(STATE_KEY);
        }
    }

    #[wasm_bindgen_test]
    fn identity_round_trips() {
        clear_keys();
        let record = StoredIdentity {
            version: IDENTITY_VERSION,
            user_id: "u_abc_1".to_string(),
            display_name: "Mauri".to_string(),
        };
        save_identity(&record);
        let loaded = load_identity().expect("identity loads");
        assert_eq!(loaded.user_id, "u_abc_1");
        assert_eq!(loaded.display_name, "Mauri");
        clear_keys();
    }

    #[wasm_bindgen_test]
    fn corrupt_identity_loads_as_absent() {
        clear_keys();
        let storage = local_storage().expect("storage available");
        let _ = storage.set_item(IDENTITY_KEY, "{not json");
        assert!(load_identity().is_none());
        clear_keys();
    }

    #[wasm_bindgen_test]
    fn selections_round_trip() {
        clear_keys();
        let mut state = SelectionState::new();
        state.toggle("Pizza");
        state.set_score("Pizza", "7,25").expect("valid score");
        save_selections(&state);
        let restored = load_selections();
        assert_eq!(restored.score_of("Pizza"), Some(7.25));
        clear_keys();
    }

    #[wasm_bindgen_test]
    fn missing_or_corrupt_state_is_empty() {
        clear_keys();
        assert!(load_selections().is_empty());
        let storage = local_storage().expect("storage available");
        let _ = storage.set_item(STATE_KEY, "[[[");
        assert!(load_selections().is_empty());
        clear_keys();
    }

    #[wasm_bindgen_test]
    fn version_mismatch_is_treated_as_empty() {
        clear_keys();
        let storage = local_storage().expect("storage available");
        let _ = storage.set_item(
            STATE_KEY,
            r#"{"version": 99, "selected": [["Pizza", 8.0]]}"#,
        );
        assert!(load_selections().is_empty());
        clear_keys();
    }
}
