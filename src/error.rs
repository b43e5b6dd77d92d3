use wasm_bindgen::prelude::*;
use js_sys::{Object, Reflect};
use tilepath::{ConfigError, EngineError};

fn set_kv(obj: &Object, k: &str, v: &JsValue) { let _ = Reflect::set(obj, &JsValue::from_str(k), v); }

fn new_obj() -> Object { Object::new() }

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f32, max: f32, got: f32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min as f64));
    set_kv(&d, "max", &JsValue::from_f64(max as f64));
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_id(kind: &str, id: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "kind", &JsValue::from_str(kind));
    set_kv(&d, "id", &JsValue::from_f64(id));
    err("invalid_id", format!("invalid {} id", kind), Some(d.into()))
}

/// Map a core rejection onto the envelope codes used everywhere else.
pub fn engine(e: &EngineError) -> JsValue {
    match e {
        EngineError::NonFinite { param } => non_finite(param),
        EngineError::LimitExceeded { what, limit } => {
            let d = new_obj();
            set_kv(&d, "what", &JsValue::from_str(what));
            set_kv(&d, "limit", &JsValue::from_f64(*limit as f64));
            err("limit_exceeded", e.to_string(), Some(d.into()))
        }
        EngineError::InvalidSize { .. } => err("invalid_size", e.to_string(), None),
        EngineError::DuplicateGroupId(id) => {
            let d = new_obj(); set_kv(&d, "id", &JsValue::from_f64(*id as f64));
            err("duplicate_group_id", e.to_string(), Some(d.into()))
        }
    }
}

pub fn config(e: &ConfigError) -> JsValue {
    match e {
        ConfigError::Json(_) => err("json_parse", e.to_string(), None),
        ConfigError::OutOfRange { param, got } => out_of_range(param, 0.0, f32::INFINITY, *got),
    }
}
