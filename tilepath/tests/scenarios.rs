use tilepath::{EdgeRef, PieceDef, SegmentId, Vec2, World};

fn bar(x: f32, y: f32) -> PieceDef {
    PieceDef::new(Vec2::new(1.0, 1.0), &[(-0.5, 0.0), (0.5, 0.0)], &[(0, 1)], x, y)
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
}

#[test]
fn touching_pieces_share_a_boundary_node_and_a_group() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0)).unwrap();
    let g = w.graph();
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.segment_count(), 2);
    let shared = g.find_node(Vec2::new(0.5, 0.0), 0.01).unwrap();
    let node = g.node(shared).unwrap();
    assert_eq!(node.segments.len(), 2);
    assert_eq!(node.owners.len(), 2);
    assert_eq!(w.group_id(a), w.group_id(b));
    assert_eq!(w.groups().len(), 1);
}

#[test]
fn piece_dropped_far_away_gets_its_original_id_back() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0).with_group_id(77)).unwrap();
    let shared = w.group_id(a).unwrap();
    assert_eq!(w.group_id(b), Some(shared));
    assert_ne!(shared, 77);

    assert!(w.begin_drag(b));
    assert!(w.drag_to(b, Vec2::new(5.0, 5.0)));
    let out = w.release(b).unwrap();
    assert_eq!(out.snapped_to, None);
    assert_eq!(out.group_id, 77);
    assert_eq!(w.group_id(b), Some(77));
    assert_eq!(w.pieces_in_group(77), vec![b]);
    assert_ne!(w.group_id(a), Some(77));
}

#[test]
fn perpendicular_input_switches_onto_the_branch() {
    let mut w = World::new();
    let def = PieceDef::new(Vec2::new(4.0, 4.0), &[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)], &[(0, 1), (1, 2)], 0.0, 0.0);
    w.register_piece(def).unwrap();
    let m = w.add_mover(Vec2::new(1.0, 0.0));
    let s = w.mover_state(m).unwrap();
    assert_eq!(s.segment, Some(SegmentId(0)));
    assert!((s.t.unwrap() - 0.5).abs() < 1e-6);

    w.advance(m, Vec2::new(0.0, 1.0), 1.0 / 60.0).unwrap();
    let s = w.mover_state(m).unwrap();
    assert_eq!(s.segment, Some(SegmentId(1)));
    assert!(s.t.unwrap().abs() < 1e-4);
    assert!(s.transitioning);

    // The transition glides onto the junction node instead of teleporting.
    let mut last = s.position;
    for _ in 0..30 {
        let p = w.advance(m, Vec2::new(0.0, 1.0), 1.0 / 60.0).unwrap();
        assert!((p.x - last.x).abs() <= 5.0 / 60.0 + 1e-5);
        last = p;
        if !w.mover_state(m).unwrap().transitioning {
            break;
        }
    }
    assert!(close(last, Vec2::new(2.0, 0.0)));
    let p = w.advance(m, Vec2::new(0.0, 1.0), 0.25).unwrap();
    assert!(close(p, Vec2::new(2.0, 0.5)));
}

#[test]
fn deactivated_segment_disappears_from_queries_until_reactivated() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let group = w.group_id(a);
    let probe = Vec2::new(0.1, 0.05);
    assert!(w.query_nearest_segment(probe, group).is_some());

    assert!(w.set_edge_active(EdgeRef::new(a, 0), false));
    assert!(w.query_nearest_segment(probe, group).is_none());
    assert!(w.query_nearest_segment(probe, None).is_none());
    assert!(w.query_nearest_segment(probe, Some(12345)).is_none());

    assert!(w.set_edge_active(EdgeRef::new(a, 0), true));
    let hit = w.query_nearest_segment(probe, group).unwrap();
    assert!(close(hit.point, Vec2::new(0.1, 0.0)));
    assert!(!w.set_edge_active(EdgeRef::new(a, 9), true));
}
