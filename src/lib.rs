use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;
mod logging;

pub use logging::init_logging;

#[wasm_bindgen]
pub struct World { pub(crate) inner: tilepath::World }

impl World {
    pub fn rs_new() -> World { World { inner: tilepath::World::new() } }
    pub fn rs_generation(&self) -> u64 { self.inner.graph().generation() }
    pub fn inner(&self) -> &tilepath::World { &self.inner }
}
