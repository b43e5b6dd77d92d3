use tilepath::{EngineError, PieceDef, Transform, Vec2, World};

fn bar(x: f32, y: f32) -> PieceDef {
    PieceDef::new(Vec2::new(1.0, 1.0), &[(-0.5, 0.0), (0.5, 0.0)], &[(0, 1)], x, y)
}

#[test]
fn splitting_a_row_restores_every_original_id() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0).with_group_id(10)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0).with_group_id(20)).unwrap();
    let c = w.register_piece(bar(2.0, 0.0).with_group_id(30)).unwrap();
    let shared = w.group_id(a).unwrap();
    assert!(![10, 20, 30].contains(&shared));
    assert_eq!(w.group_id(b), Some(shared));
    assert_eq!(w.group_id(c), Some(shared));

    w.begin_drag(b);
    assert_eq!(w.group_id(b), Some(20));
    assert_eq!(w.group_id(a), Some(10));
    assert_eq!(w.group_id(c), Some(30));
    assert!(w.groups().group(shared).is_none());
    w.drag_to(b, Vec2::new(0.0, 4.0));
    w.release(b);
    assert_eq!(w.group_id(b), Some(20));
    assert_eq!(w.groups().len(), 3);
}

#[test]
fn release_near_a_neighbor_snaps_exactly_and_joins_its_group() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0)).unwrap();
    let c = w.register_piece(bar(6.0, 0.0)).unwrap();
    let g = w.group_id(a).unwrap();

    w.begin_drag(c);
    w.drag_to(c, Vec2::new(2.2, 0.1));
    let out = w.release(c).unwrap();
    assert_eq!(out.snapped_to, Some(b));
    assert_eq!(w.registry().get(c).unwrap().transform.position, Vec2::new(2.0, 0.0));
    assert_eq!(out.group_id, g);
    assert_eq!(w.group_id(c), Some(g));
    assert_eq!(w.group_id(b), Some(g));
    assert_eq!(w.graph().node_count(), 4);
}

#[test]
fn rotation_keeps_pieces_adjacent_and_the_id_stable() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0)).unwrap();
    let g = w.group_id(a).unwrap();
    assert!(w.rotate_group(g, 90.0));
    let pa = w.registry().get(a).unwrap().transform.position;
    let pb = w.registry().get(b).unwrap().transform.position;
    assert!((pa.x - 0.5).abs() < 1e-4 && (pa.y + 0.5).abs() < 1e-4);
    assert!((pb.x - 0.5).abs() < 1e-4 && (pb.y - 0.5).abs() < 1e-4);
    assert_eq!(w.group_id(a), Some(g));
    assert_eq!(w.group_id(b), Some(g));
    // Both bars now run vertically through x = 0.5.
    assert!(w.graph().find_node(Vec2::new(0.5, 0.0), 0.01).is_some());
    assert!(!w.rotate_group(999, 90.0));
    assert!(!w.rotate_group(g, f32::NAN));
}

#[test]
fn movement_lock_belongs_to_the_group_id() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    w.register_piece(bar(1.0, 0.0)).unwrap();
    let g = w.group_id(a).unwrap();
    assert!(w.set_group_movement_locked(g, true));
    w.rebuild_global_graph();
    assert!(w.is_group_movement_locked(g));
    assert!(!w.set_group_movement_locked(4242, true));
    assert!(!w.is_group_movement_locked(4242));
}

#[test]
fn unregistering_leaves_neighbors_consistent() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0).with_group_id(5)).unwrap();
    let b = w.register_piece(bar(1.0, 0.0)).unwrap();
    assert!(w.unregister_piece(b));
    assert!(!w.unregister_piece(b));
    assert_eq!(w.group_id(b), None);
    assert_eq!(w.group_id(a), Some(5));
    assert_eq!(w.graph().segment_count(), 1);
}

#[test]
fn moving_a_piece_with_set_transform_regroups() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    let b = w.register_piece(bar(3.0, 0.0)).unwrap();
    assert_ne!(w.group_id(a), w.group_id(b));
    assert!(w.set_piece_transform(b, Transform::at(0.0, 1.0)));
    assert_eq!(w.group_id(a), w.group_id(b));
    assert!(!w.set_piece_transform(b, Transform::at(f32::INFINITY, 0.0)));
}

#[test]
fn registration_rejects_bad_input() {
    let mut w = World::new();
    w.register_piece(bar(0.0, 0.0).with_group_id(3)).unwrap();
    assert_eq!(w.register_piece(bar(5.0, 0.0).with_group_id(3)), Err(EngineError::DuplicateGroupId(3)));
    assert_eq!(w.register_piece(bar(f32::NAN, 0.0)), Err(EngineError::NonFinite { param: "transform.position" }));
    let mut flat = bar(0.0, 0.0);
    flat.size = Vec2::new(-1.0, 1.0);
    assert!(matches!(w.register_piece(flat), Err(EngineError::InvalidSize { .. })));
    assert_eq!(w.registry().len(), 1);
}

#[test]
fn requested_id_may_not_clash_with_a_live_merged_group() {
    let mut w = World::new();
    let a = w.register_piece(bar(0.0, 0.0)).unwrap();
    w.register_piece(bar(1.0, 0.0)).unwrap();
    let merged = w.group_id(a).unwrap();
    let err = w.register_piece(bar(5.0, 0.0).with_group_id(merged)).unwrap_err();
    assert_eq!(err, EngineError::DuplicateGroupId(merged));
    assert_eq!(err.to_string(), format!("group id {} is already in use", merged));
}
