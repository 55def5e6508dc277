use js_sys::{Date, Math};

use crate::persisted::{StoredIdentity, IDENTITY_VERSION};
use crate::persisted_store;

/// Who this browser votes as. The id is generated once and then sticks;
/// only the display name is user-editable.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Identity {
    pub(crate) user_id: String,
    pub(crate) display_name: String,
}

pub(crate) fn load() -> Identity {
    persisted_store::load_identity()
        .map(|record| Identity {
            user_id: record.user_id,
            display_name: record.display_name,
        })
        .unwrap_or_default()
}

pub(crate) fn persist(identity: &Identity) {
    persisted_store::save_identity(&StoredIdentity {
        version: IDENTITY_VERSION,
        user_id: identity.user_id.clone(),
        display_name: identity.display_name.clone(),
    });
}

/// Fills in the id the first time it is needed; an existing id is never
/// replaced.
pub(crate) fn ensure_user_id(identity: &mut Identity) {
    if !identity.user_id.is_empty() {
        return;
    }
    identity.user_id = generate_user_id();
}

fn generate_user_id() -> String {
    let now = Date::now() as u64;
    let salt = (Math::random() * f64::from(u32::MAX)) as u64;
    format!("u_{:012x}_{now}", splitmix64(now ^ (salt << 20)))
}

fn splitmix64(mut value: u64) -> u64 {
    value = value.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = value;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
