//! Conversions shared by the bindings.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use stommel_core::StommelError;
use wasm_bindgen::prelude::*;

/// Serializes `value`, sending `None` as `null` so gaps survive in JS.
pub(crate) fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = Serializer::new().serialize_missing_as_null(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Reads an optional settings object; `undefined` and `null` give the default.
pub(crate) fn from_js_or_default<T>(value: JsValue, what: &str) -> Result<T, JsValue>
where
    T: DeserializeOwned + Default,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

pub(crate) fn core_error(context: &str, err: StommelError) -> JsValue {
    JsValue::from_str(&format!("{} failed: {}", context, err))
}
