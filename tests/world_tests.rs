use js_sys::{Reflect, Uint32Array};
use serde::{Deserialize, Serialize};
use tilepath_wasm::World;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// Plain JS objects, the shape callers hand in.
fn js(v: &serde_json::Value) -> JsValue {
    v.serialize(&serde_wasm_bindgen::Serializer::json_compatible()).unwrap()
}

#[derive(Deserialize)]
struct MoverState {
    segment: Option<u32>,
    t: Option<f32>,
    transitioning: bool,
}

fn bar(x: f32, y: f32) -> JsValue {
    let v = serde_json::json!({
        "nodes": [{ "position": { "x": -0.5, "y": 0.0 } }, { "position": { "x": 0.5, "y": 0.0 } }],
        "edges": [{ "a": 0, "b": 1 }],
        "transform": { "position": { "x": x, "y": y } },
        "size": { "x": 1.0, "y": 1.0 }
    });
    js(&v)
}

fn num(v: &JsValue, key: &str) -> f64 {
    Reflect::get(v, &JsValue::from_str(key)).unwrap().as_f64().unwrap()
}

#[wasm_bindgen_test]
fn adjacent_pieces_merge_into_one_group() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0)).unwrap();
    assert_eq!(w.piece_count(), 2);
    assert_eq!(w.group_count(), 1);
    assert_eq!(w.group_id(a).as_f64(), w.group_id(b).as_f64());

    let nodes = w.get_node_data();
    let positions = Reflect::get(&nodes, &JsValue::from_str("positions")).unwrap();
    assert_eq!(js_sys::Float32Array::from(positions).length(), 6);
    let segs = w.get_segment_data();
    let endpoints = Reflect::get(&segs, &JsValue::from_str("endpoints")).unwrap();
    assert_eq!(Uint32Array::from(endpoints).length(), 4);
}

#[wasm_bindgen_test]
fn mover_turns_at_a_junction() {
    let mut w = World::new();
    let v = serde_json::json!({
        "nodes": [
            { "position": { "x": 0.0, "y": 0.0 } },
            { "position": { "x": 2.0, "y": 0.0 } },
            { "position": { "x": 2.0, "y": 2.0 } }
        ],
        "edges": [{ "a": 0, "b": 1 }, { "a": 1, "b": 2 }],
        "size": { "x": 4.0, "y": 4.0 }
    });
    w.register_piece(js(&v)).unwrap();
    let m = w.add_mover(1.0, 0.0);
    let p = w.advance(m, 0.0, 1.0, 1.0 / 60.0);
    assert_eq!(num(&p, "x"), 1.0);
    let s: MoverState = serde_wasm_bindgen::from_value(w.mover_state(m)).unwrap();
    assert_eq!(s.segment, Some(1));
    assert!(s.t.unwrap().abs() < 1e-4);
    assert!(s.transitioning);
}

#[wasm_bindgen_test]
fn drag_release_and_toggle_round_trip() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(4.0, 0.0)).unwrap();
    assert!(w.begin_drag(b));
    assert!(w.drag_to(b, 1.2, 0.1));
    let out = w.release(b);
    assert_eq!(num(&out, "snapped_to"), a as f64);
    assert_eq!(w.group_id(a).as_f64(), w.group_id(b).as_f64());

    let hit = w.query_nearest_segment(0.0, 0.1, None);
    assert!(!hit.is_null());
    let sw = w.add_toggle_switch(&Uint32Array::from(&[a, 0][..]), &Uint32Array::new_with_length(0)).unwrap();
    assert_eq!(w.flip_switch(sw), Some(true));
    assert!(w.query_nearest_segment(0.0, 0.1, None).is_null());
}

#[wasm_bindgen_test]
fn logging_can_be_installed_twice() {
    assert!(tilepath_wasm::init_logging("debug"));
    assert!(tilepath_wasm::init_logging("warn"));
    assert!(!tilepath_wasm::init_logging("chatty"));
    let mut w = World::new();
    w.register_piece(bar(0.0, 0.0)).unwrap();
    w.rebuild();
}
