//! Preferences kept in the browser's local storage across page loads.

use shared::session::{DEFAULT_DURATION_MS, TIME_PRESETS_MS};

const DURATION_KEY: &str = "time";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Only values that name one of the presets are honoured.
fn parse_duration(raw: Option<String>) -> Option<u64> {
    raw?
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| TIME_PRESETS_MS.contains(ms))
}

/// The preset picked on an earlier visit, or the default.
pub fn load_duration_ms() -> u64 {
    let raw = local_storage().and_then(|s| s.get_item(DURATION_KEY).ok().flatten());
    parse_duration(raw).unwrap_or(DEFAULT_DURATION_MS)
}

pub fn save_duration_ms(duration_ms: u64) {
    let Some(storage) = local_storage() else {
        return;
    };
    if storage
        .set_item(DURATION_KEY, &duration_ms.to_string())
        .is_err()
    {
        web_sys::console::warn_1(&"Could not remember the selected time".into());
    }
}
