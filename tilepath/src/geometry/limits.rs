// Ingestion limits for authored piece data

// Scene size caps
pub const MAX_PIECES: usize = 4_096;
pub const MAX_NODES_PER_PIECE: usize = 1_024;
pub const MAX_EDGES_PER_PIECE: usize = 4_096;

// Numeric bounds
pub const COORD_MIN: f32 = -1_000_000.0;
pub const COORD_MAX: f32 =  1_000_000.0;
pub const SIZE_MAX: f32 = 100_000.0;

#[inline]
pub fn in_coord_bounds(x: f32) -> bool { x.is_finite() && x >= COORD_MIN && x <= COORD_MAX }

#[inline]
pub fn in_size_bounds(w: f32) -> bool { w.is_finite() && w > 0.0 && w <= SIZE_MAX }
