//! Page-side collaborators: the `window.folioHost` object, `localStorage`,
//! haptics and URL flags.

use folio_engine::{HostEvent, KeyValueStore};
use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

/// Name of the global object the page exposes for audio and overlay calls.
pub const HOST_OBJECT: &str = "folioHost";
/// Element hidden when running with `?dev=true`.
pub const MAINTENANCE_OVERLAY_ID: &str = "maintenance-overlay";

/// Forward one frame's events to the page. A missing host object or method
/// is skipped silently; the game never depends on the host answering.
pub fn dispatch(events: &[HostEvent]) {
    if events.is_empty() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    let host = Reflect::get(&window, &JsValue::from_str(HOST_OBJECT)).unwrap_or(JsValue::UNDEFINED);

    for event in events {
        match event {
            HostEvent::PlaySound(name) => call(&host, "audio", "play", &[JsValue::from_str(name)]),
            HostEvent::OpenProject(project) => {
                call(&host, "overlay", "openProject", &[JsValue::from_str(project)])
            }
            HostEvent::CloseOverlay => call(&host, "overlay", "close", &[]),
            HostEvent::Audio(control) => call(&host, "audio", control.method(), &[]),
            HostEvent::Haptic(ms) => {
                let _ = window.navigator().vibrate_with_duration(*ms);
            }
        }
    }
}

fn call(host: &JsValue, object: &str, method: &str, args: &[JsValue]) {
    if host.is_undefined() || host.is_null() {
        return;
    }
    let target = match Reflect::get(host, &JsValue::from_str(object)) {
        Ok(t) if t.is_object() => t,
        _ => return,
    };
    let func = match Reflect::get(&target, &JsValue::from_str(method)) {
        Ok(f) => match f.dyn_into::<Function>() {
            Ok(f) => f,
            Err(_) => return,
        },
        Err(_) => return,
    };
    let result = match args {
        [] => func.call0(&target),
        [a] => func.call1(&target, a),
        [a, b, ..] => func.call2(&target, a, b),
    };
    if let Err(e) = result {
        log::warn!("host: {}.{} threw {:?}", object, method, e);
    }
}

/// `KeyValueStore` backed by `window.localStorage`. Every operation is a
/// no-op when storage is unavailable (private mode, sandboxed iframe).
#[derive(Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("storage: failed to write '{}'", key);
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// True when the query string carries `dev=true`.
pub fn is_dev_query(search: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(k, v)| k == "dev" && v == "true")
}

/// Hide the maintenance overlay when the page was opened with `?dev=true`.
pub fn apply_dev_flag() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let search = window.location().search().unwrap_or_default();
    if !is_dev_query(&search) {
        return;
    }
    if let Some(el) = window
        .document()
        .and_then(|d| d.get_element_by_id(MAINTENANCE_OVERLAY_ID))
    {
        let _ = el.class_list().add_1("hidden");
        log::info!("dev mode: maintenance overlay hidden");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_flag_parsing() {
        assert!(is_dev_query("?dev=true"));
        assert!(is_dev_query("?a=1&dev=true"));
        assert!(is_dev_query("dev=true&b"));
        assert!(!is_dev_query(""));
        assert!(!is_dev_query("?dev=false"));
        assert!(!is_dev_query("?dev"));
        assert!(!is_dev_query("?devmode=true"));
    }
}
