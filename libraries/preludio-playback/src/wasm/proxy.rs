//! Instance proxy backed by a JavaScript object

use crate::proxy::InstanceProxy;
use js_sys::{Function, Reflect};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};

/// Forwards `seekTo` / `setVolume` to methods of the same name on a JS object
pub struct JsInstanceProxy {
    target: JsValue,
}

impl JsInstanceProxy {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn call(&self, method: &str, arg: &JsValue) {
        let function = Reflect::get(&self.target, &JsValue::from_str(method))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok());

        let Some(function) = function else {
            warn!(method, "Player instance has no such method");
            return;
        };
        if let Err(e) = function.call1(&self.target, arg) {
            warn!(method, error = ?e, "Player instance call failed");
        }
    }
}

impl InstanceProxy for JsInstanceProxy {
    fn seek_to(&self, seconds: f64) {
        self.call("seekTo", &JsValue::from_f64(seconds));
    }

    fn set_volume(&self, level: u8) {
        self.call("setVolume", &JsValue::from(level));
    }
}
