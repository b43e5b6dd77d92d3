use std::time::Instant;
use tilepath::{PieceDef, Vec2, World};

// Grid of unit pieces, each carrying a cross of four edges through its center.
fn build_grid_world(side: usize) -> World {
    let mut w = World::new();
    let nodes = [(0.0, 0.0), (-0.5, 0.0), (0.5, 0.0), (0.0, -0.5), (0.0, 0.5)];
    let edges = [(0, 1), (0, 2), (0, 3), (0, 4)];
    for j in 0..side { for i in 0..side {
        let def = PieceDef::new(Vec2::new(1.0, 1.0), &nodes, &edges, i as f32, j as f32);
        let _ = w.register_piece(def);
    } }
    w
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() { return 0.0; }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len()-1)]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut side = 12usize;
    let mut rebuilds = 50usize;
    let mut assert_ms: Option<f64> = None;
    for a in &args[1..] {
        if let Some(val)=a.strip_prefix("--side=") { if let Ok(v)=val.parse() { side=v; } }
        else if let Some(val)=a.strip_prefix("--rebuilds=") { if let Ok(v)=val.parse() { rebuilds=v; } }
        else if let Some(val)=a.strip_prefix("--assert-ms=") { if let Ok(v)=val.parse() { assert_ms=Some(v); } }
    }

    let t_build = Instant::now();
    let mut w = build_grid_world(side);
    let build_ms = t_build.elapsed().as_secs_f64() * 1000.0;
    let mover = w.add_mover(Vec2::new(0.0, 0.0));

    let mut times_ms: Vec<f64> = Vec::with_capacity(rebuilds);
    let start_all = Instant::now();
    for k in 0..rebuilds {
        let t0 = Instant::now();
        w.rebuild_global_graph();
        let dt = t0.elapsed().as_secs_f64() * 1000.0;
        times_ms.push(dt);
        let input = if k % 2 == 0 { Vec2::new(1.0, 0.0) } else { Vec2::new(0.0, 1.0) };
        let _ = w.advance(mover, input, 1.0 / 60.0);
    }
    let dur_all = start_all.elapsed().as_secs_f64() * 1000.0;
    times_ms.sort_by(|a,b| a.total_cmp(b));
    let med = percentile(&times_ms, 0.5);
    let p90 = percentile(&times_ms, 0.9);
    let p99 = percentile(&times_ms, 0.99);
    println!(
        "pieces={} nodes={} segments={} groups={} build_ms={:.3} rebuilds={} total_ms={:.3} median_ms={:.4} p90_ms={:.4} p99_ms={:.4}",
        w.registry().len(), w.graph().node_count(), w.graph().segment_count(), w.groups().len(),
        build_ms, rebuilds, dur_all, med, p90, p99
    );
    if let Some(th) = assert_ms { if med > th { eprintln!("FAIL: median {:.4} ms > threshold {:.3} ms", med, th); std::process::exit(1); } }
}
