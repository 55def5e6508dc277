use serde::{Deserialize, Serialize};

pub(crate) const IDENTITY_VERSION: u32 = 1;
pub(crate) const STATE_VERSION: u32 = 1;

pub(crate) const IDENTITY_KEY: &str = "morfi.identity.v1";
pub(crate) const STATE_KEY: &str = "morfi.state.v1";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredIdentity {
    pub(crate) version: u32,
    pub(crate) user_id: String,
    pub(crate) display_name: String,
}

impl Default for StoredIdentity {
    fn default() -> Self {
        Self {
            version: IDENTITY_VERSION,
            user_id: String::new(),
            display_name: String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredSelections {
    pub(crate) version: u32,
    pub(crate) selected: Vec<(String, f64)>,
}

impl Default for StoredSelections {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            selected: Vec::new(),
        }
    }
}
