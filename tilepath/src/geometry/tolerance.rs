// Centralized tolerances and helpers for position matching

pub const EPS_NODE: f32 = 0.01;              // two nodes closer than this are the same node
pub const EPS_LEN: f32 = 1e-6;               // zero-length vector threshold
pub const ADJACENCY_TOLERANCE: f32 = 0.1;    // edge-to-edge touching slack between pieces
pub const SNAP_TOLERANCE: f32 = 0.3;         // release distance that still snaps to a neighbor
pub const ALIGN_THRESHOLD: f32 = 0.3;        // |dot(dir, input)| needed to move or to pick a branch
pub const SWITCH_RADIUS: f32 = 0.3;          // straight-through switch gate (distance to node)
pub const JUNCTION_RADIUS: f32 = 1.5;        // turning switch gate (distance to node)
pub const TURN_DOT: f32 = 0.7;               // |dot(dirs)| below this counts as a turn
pub const CAPTURE_RADIUS: f32 = 0.3;         // re-anchor search radius after a rebuild
pub const INPUT_DEADZONE: f32 = 0.1;         // input magnitude treated as "no input"

pub const MOVE_SPEED_DEFAULT: f32 = 2.0;       // units per second along a segment
pub const TRANSITION_SPEED_DEFAULT: f32 = 5.0; // units per second while smoothing a switch

#[inline] pub fn clamp01(x: f32) -> f32 { x.max(0.0).min(1.0) }
#[inline] pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool { (a - b).abs() <= eps }

#[inline]
pub fn norm2(mut x: f32, mut y: f32) -> ((f32, f32), f32) {
    let len = (x*x + y*y).sqrt();
    if len > EPS_LEN { x/=len; y/=len; ((x,y), len) } else { ((0.0,0.0), 0.0) }
}
