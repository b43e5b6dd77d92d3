use crate::World;
use js_sys::Uint32Array;
use tilepath::{EdgeRef, EngineConfig, GroupId, MoverId, PieceDef, PieceId, ToggleSwitch, Transform, Vec2};
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;
use crate::error;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// JS numbers carry group IDs; only integral values name a group.
fn group_from_f64(v: f64) -> Option<GroupId> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= 9_007_199_254_740_991.0 { Some(v as GroupId) } else { None }
}

fn edge_refs(flat: &Uint32Array) -> Vec<EdgeRef> {
    let v = flat.to_vec();
    v.chunks_exact(2).map(|c| EdgeRef::new(PieceId(c[0]), c[1])).collect()
}

#[wasm_bindgen]
impl World {
    #[wasm_bindgen(constructor)]
    pub fn new() -> World {
        crate::World::rs_new()
    }
    pub fn generation(&self) -> u64 {
        self.rs_generation()
    }

    // Configuration
    pub fn get_config(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.config()).unwrap_or(JsValue::NULL)
    }
    pub fn set_config(&mut self, v: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<EngineConfig>(v) {
            Ok(cfg) => self.inner.set_config(cfg).is_ok(),
            Err(_) => false,
        }
    }
    pub fn set_config_res(&mut self, v: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => match EngineConfig::from_json_value(val) {
                Ok(cfg) => match self.inner.set_config(cfg) {
                    Ok(()) => error::ok(JsValue::TRUE),
                    Err(e) => error::config(&e),
                },
                Err(e) => error::config(&e),
            },
            Err(e) => error::err("json_parse", format!("{}", e), None),
        }
    }

    // Pieces
    pub fn register_piece(&mut self, def: JsValue) -> Option<u32> {
        let def = serde_wasm_bindgen::from_value::<PieceDef>(def).ok()?;
        self.inner.register_piece(def).ok().map(|id| id.0)
    }
    pub fn register_piece_res(&mut self, def: JsValue) -> JsValue {
        let def = match serde_wasm_bindgen::from_value::<PieceDef>(def) {
            Ok(d) => d,
            Err(e) => return error::err("json_parse", format!("{}", e), None),
        };
        match self.inner.register_piece(def) {
            Ok(id) => error::ok(JsValue::from_f64(id.0 as f64)),
            Err(e) => error::engine(&e),
        }
    }
    pub fn unregister_piece(&mut self, id: u32) -> bool {
        self.inner.unregister_piece(PieceId(id))
    }
    pub fn unregister_piece_res(&mut self, id: u32) -> JsValue {
        if !self.inner.registry().contains(PieceId(id)) {
            return error::invalid_id("piece", id as f64);
        }
        error::ok(JsValue::from_bool(self.inner.unregister_piece(PieceId(id))))
    }
    pub fn piece_count(&self) -> u32 {
        self.inner.registry().len() as u32
    }
    pub fn set_piece_transform(&mut self, id: u32, x: f32, y: f32, rotation_deg: f32) -> bool {
        let t = Transform { position: Vec2::new(x, y), rotation_deg };
        self.inner.set_piece_transform(PieceId(id), t)
    }
    pub fn set_piece_transform_res(&mut self, id: u32, x: f32, y: f32, rotation_deg: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        if !rotation_deg.is_finite() {
            return error::non_finite("rotation_deg");
        }
        if !self.inner.registry().contains(PieceId(id)) {
            return error::invalid_id("piece", id as f64);
        }
        error::ok(JsValue::from_bool(self.set_piece_transform(id, x, y, rotation_deg)))
    }
    pub fn rebuild(&mut self) {
        self.inner.rebuild_global_graph();
    }

    // Groups
    pub fn group_id(&self, piece: u32) -> JsValue {
        match self.inner.group_id(PieceId(piece)) {
            Some(g) => JsValue::from_f64(g as f64),
            None => JsValue::NULL,
        }
    }
    pub fn group_id_res(&self, piece: u32) -> JsValue {
        match self.inner.group_id(PieceId(piece)) {
            Some(g) => error::ok(JsValue::from_f64(g as f64)),
            None => error::invalid_id("piece", piece as f64),
        }
    }
    pub fn group_pieces(&self, group: f64) -> Uint32Array {
        let ids: Vec<u32> = group_from_f64(group)
            .map(|g| self.inner.pieces_in_group(g).into_iter().map(|p| p.0).collect())
            .unwrap_or_default();
        crate::interop::arr_u32(&ids)
    }
    pub fn group_count(&self) -> u32 {
        self.inner.groups().len() as u32
    }
    pub fn set_group_movement_locked(&mut self, group: f64, locked: bool) -> bool {
        group_from_f64(group).map_or(false, |g| self.inner.set_group_movement_locked(g, locked))
    }
    pub fn set_group_movement_locked_res(&mut self, group: f64, locked: bool) -> JsValue {
        let Some(g) = group_from_f64(group) else { return error::invalid_id("group", group) };
        if self.inner.groups().group(g).is_none() {
            return error::invalid_id("group", group);
        }
        error::ok(JsValue::from_bool(self.inner.set_group_movement_locked(g, locked)))
    }
    pub fn is_group_movement_locked(&self, group: f64) -> bool {
        group_from_f64(group).map_or(false, |g| self.inner.is_group_movement_locked(g))
    }
    pub fn rotate_group(&mut self, group: f64, degrees: f32) -> bool {
        group_from_f64(group).map_or(false, |g| self.inner.rotate_group(g, degrees))
    }
    pub fn rotate_group_res(&mut self, group: f64, degrees: f32) -> JsValue {
        if !degrees.is_finite() {
            return error::non_finite("degrees");
        }
        match group_from_f64(group) {
            Some(g) if self.inner.groups().group(g).is_some() => error::ok(JsValue::from_bool(self.inner.rotate_group(g, degrees))),
            _ => error::invalid_id("group", group),
        }
    }

    // Drag and drop
    pub fn begin_drag(&mut self, piece: u32) -> bool {
        self.inner.begin_drag(PieceId(piece))
    }
    pub fn drag_to(&mut self, piece: u32, x: f32, y: f32) -> bool {
        self.inner.drag_to(PieceId(piece), Vec2::new(x, y))
    }
    pub fn drag_to_res(&mut self, piece: u32, x: f32, y: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        if !self.inner.registry().contains(PieceId(piece)) {
            return error::invalid_id("piece", piece as f64);
        }
        error::ok(JsValue::from_bool(self.drag_to(piece, x, y)))
    }
    pub fn release(&mut self, piece: u32) -> JsValue {
        match self.inner.release(PieceId(piece)) {
            Some(out) => serde_wasm_bindgen::to_value(&out).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }
    pub fn release_res(&mut self, piece: u32) -> JsValue {
        match self.inner.registry().get(PieceId(piece)) {
            None => return error::invalid_id("piece", piece as f64),
            Some(p) if !p.frozen => return error::err("not_dragging", "piece is not being dragged", None),
            Some(_) => {}
        }
        error::ok(self.release(piece))
    }

    // Edge activation
    pub fn set_edge_active(&mut self, piece: u32, edge: u32, active: bool) -> bool {
        self.inner.set_edge_active(EdgeRef::new(PieceId(piece), edge), active)
    }
    pub fn set_edge_active_res(&mut self, piece: u32, edge: u32, active: bool) -> JsValue {
        match self.inner.registry().get(PieceId(piece)) {
            None => error::invalid_id("piece", piece as f64),
            Some(p) if (edge as usize) >= p.edges.len() => error::invalid_id("edge", edge as f64),
            Some(_) => error::ok(JsValue::from_bool(self.set_edge_active(piece, edge, active))),
        }
    }
    /// Edge sets are flattened `[piece, edge, piece, edge, ...]` pairs.
    pub fn add_toggle_switch(&mut self, primary: &Uint32Array, alternate: &Uint32Array) -> Option<u32> {
        let sw = ToggleSwitch::new(edge_refs(primary), edge_refs(alternate));
        self.inner.add_toggle_switch(sw).map(|i| i as u32)
    }
    pub fn flip_switch(&mut self, index: u32) -> Option<bool> {
        self.inner.flip_switch(index as usize)
    }

    // Queries
    pub fn query_nearest_segment(&self, x: f32, y: f32, group: Option<f64>) -> JsValue {
        let group = match group {
            Some(v) => match group_from_f64(v) {
                Some(g) => Some(g),
                None => return JsValue::NULL,
            },
            None => None,
        };
        match self.inner.query_nearest_segment(Vec2::new(x, y), group) {
            Some(hit) => {
                let obj = crate::interop::new_obj();
                crate::interop::set_kv(&obj, "segment", &JsValue::from_f64(hit.segment.0 as f64));
                crate::interop::set_kv(&obj, "t", &JsValue::from_f64(hit.t as f64));
                crate::interop::set_kv(&obj, "point", &crate::interop::vec2(hit.point));
                crate::interop::set_kv(&obj, "dist", &JsValue::from_f64(hit.dist as f64));
                obj.into()
            }
            None => JsValue::NULL,
        }
    }
    pub fn query_nearest_segment_res(&self, x: f32, y: f32, group: Option<f64>) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        if let Some(v) = group {
            if group_from_f64(v).is_none() {
                return error::invalid_id("group", v);
            }
        }
        error::ok(self.query_nearest_segment(x, y, group))
    }

    // Movers
    pub fn add_mover(&mut self, x: f32, y: f32) -> u32 {
        self.inner.add_mover(Vec2::new(x, y)).0
    }
    pub fn add_mover_res(&mut self, x: f32, y: f32) -> JsValue {
        if !x.is_finite() {
            return error::non_finite("x");
        }
        if !y.is_finite() {
            return error::non_finite("y");
        }
        error::ok(JsValue::from_f64(self.add_mover(x, y) as f64))
    }
    pub fn remove_mover(&mut self, id: u32) -> bool {
        self.inner.remove_mover(MoverId(id))
    }
    pub fn advance(&mut self, id: u32, ix: f32, iy: f32, dt: f32) -> JsValue {
        match self.inner.advance(MoverId(id), Vec2::new(ix, iy), dt) {
            Some(p) => crate::interop::vec2(p),
            None => JsValue::NULL,
        }
    }
    pub fn advance_res(&mut self, id: u32, ix: f32, iy: f32, dt: f32) -> JsValue {
        if !ix.is_finite() {
            return error::non_finite("ix");
        }
        if !iy.is_finite() {
            return error::non_finite("iy");
        }
        if !dt.is_finite() {
            return error::non_finite("dt");
        }
        if dt < 0.0 {
            return error::out_of_range("dt", 0.0, f32::INFINITY, dt);
        }
        if self.inner.mover(MoverId(id)).is_none() {
            return error::invalid_id("mover", id as f64);
        }
        error::ok(self.advance(id, ix, iy, dt))
    }
    pub fn mover_state(&self, id: u32) -> JsValue {
        match self.inner.mover_state(MoverId(id)) {
            Some(s) => serde_wasm_bindgen::to_value(&s).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    // Typed arrays for rendering
    pub fn get_node_data(&self) -> JsValue {
        let pos = self.inner.graph().node_arrays();
        let obj = crate::interop::new_obj();
        crate::interop::set_kv(&obj, "positions", &crate::interop::arr_f32(&pos).into());
        obj.into()
    }
    pub fn get_segment_data(&self) -> JsValue {
        let (endpoints, active) = self.inner.graph().segment_arrays();
        let obj = crate::interop::new_obj();
        crate::interop::set_kv(&obj, "endpoints", &crate::interop::arr_u32(&endpoints).into());
        crate::interop::set_kv(&obj, "active", &crate::interop::arr_u8(&active).into());
        obj.into()
    }
}

impl Default for World {
    fn default() -> Self {
        World::new()
    }
}
