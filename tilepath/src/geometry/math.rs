use super::tolerance::{clamp01, norm2, EPS_LEN};
use crate::model::Vec2;

pub fn seg_distance_sq(px: f32, py: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32) {
    let vx = x2 - x1; let vy = y2 - y1;
    let wx = px - x1; let wy = py - y1;
    let vv = vx*vx + vy*vy;
    let t = if vv > EPS_LEN*EPS_LEN { clamp01((wx*vx + wy*vy) / vv) } else { 0.0 };
    let projx = x1 + t * vx; let projy = y1 + t * vy;
    let dx = px - projx; let dy = py - projy;
    (dx*dx + dy*dy, t)
}

/// Closest point to `p` on segment `a`-`b` and its parameter `t` in [0,1].
/// A zero-length segment projects everything onto `a` with `t = 0`.
pub fn project_on_segment(p: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let (_, t) = seg_distance_sq(p.x, p.y, a.x, a.y, b.x, b.y);
    (lerp(a, b, t), t)
}

#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (b - a).length_sq()
}

#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let ((x, y), _) = norm2(v.x, v.y);
    Vec2::new(x, y)
}

/// Unit direction from `a` to `b`; zero for coincident points.
#[inline]
pub fn direction(a: Vec2, b: Vec2) -> Vec2 {
    normalize(b - a)
}

pub fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= EPS_LEN {
        target
    } else {
        current + delta * (max_delta / dist)
    }
}

pub fn rotate(v: Vec2, angle_deg: f32) -> Vec2 {
    if angle_deg == 0.0 {
        return v;
    }
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// World-space axis-aligned extents of a `size` rectangle rotated by `angle_deg`.
pub fn rotated_extents(size: Vec2, angle_deg: f32) -> Vec2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    Vec2::new(size.x * cos + size.y * sin, size.x * sin + size.y * cos)
}
