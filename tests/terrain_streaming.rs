use ridgeline::{
    headless, ChunkType, HeadlessTerrain, PhysicsBackend, TerrainError,
};

fn sweep(terrain: &mut HeadlessTerrain, to: f64, step: f64) {
    let mut x = 0.0;
    while x <= to {
        let report = terrain.update(x);
        assert!(report.aborted.is_none(), "tick at {} aborted", x);
        x += step;
    }
}

#[test]
fn test_same_seed_same_terrain() {
    let mut a = headless(1234).unwrap();
    let mut b = headless(1234).unwrap();

    let mut x = 0.0;
    while x <= 1500.0 {
        a.update(x);
        b.update(x);
        x += 7.0;
    }

    assert_eq!(a.chunk_types(), b.chunk_types());
    let first = a.segments().first().unwrap().start_x;
    for i in 0..2000 {
        let x = first + i as f64 * 0.173;
        assert_eq!(
            a.height_at(x).map(f64::to_bits),
            b.height_at(x).map(f64::to_bits),
            "height differs at {}",
            x
        );
    }
    assert_eq!(a.physics().body_count(), b.physics().body_count());
    assert_eq!(a.renderer().decoration_count(), b.renderer().decoration_count());
}

#[test]
fn test_height_queries_do_not_change_generation() {
    let mut quiet = headless(77).unwrap();
    let mut noisy = headless(77).unwrap();

    let mut x = 0.0;
    while x <= 1200.0 {
        quiet.update(x);
        noisy.update(x);
        for query_x in [x - 3.0, x + 50.0, x + 5000.0, -200.0] {
            noisy.height_at(query_x);
            noisy.height_near(query_x);
        }
        x += 20.0;
    }
    assert_eq!(quiet.chunk_types(), noisy.chunk_types());
}

#[test]
fn test_seam_continuity_between_first_segments() {
    let mut terrain = headless(42).unwrap();
    assert!(terrain.build_segment_at(0.0).is_some());
    assert!(terrain.build_segment_at(40.0).is_some());

    let left = terrain.height_at(39.999).unwrap();
    let right = terrain.height_at(40.001).unwrap();
    assert!((left - right).abs() < 0.01, "{} vs {}", left, right);

    let segments = terrain.segments();
    assert_eq!(
        segments.get(0).unwrap().last_height(),
        segments.get(1).unwrap().first_height()
    );
}

#[test]
fn test_origin_segment_is_gentle_for_many_seeds() {
    for seed in [0u32, 1, 42, 1234, 99_999, u32::MAX] {
        let mut terrain = headless(seed).unwrap();
        terrain.update(0.0);
        let first = terrain.segments().get(0).unwrap();
        assert!(
            matches!(first.chunk_type, ChunkType::Hills | ChunkType::Plateau),
            "seed {} starts with {}",
            seed,
            first.chunk_type
        );
    }
}

#[test]
fn test_sweep_keeps_window_bounded_and_disjoint() {
    let mut terrain = headless(42).unwrap();
    let capacity = terrain.config().window_capacity();

    let mut x = 0.0;
    while x <= 2000.0 {
        terrain.update(x);
        let segments = terrain.segments();
        assert!(segments.is_disjoint(), "overlap at x={}", x);
        assert!(segments.len() <= capacity, "{} segments at x={}", segments.len(), x);
        assert!(segments.covering(x).is_some(), "no segment under x={}", x);
        x += 10.0;
    }

    let seams: Vec<_> = terrain.segments().iter().collect();
    for pair in seams.windows(2) {
        assert_eq!(pair[0].end_x(), pair[1].start_x);
        assert_eq!(pair[0].last_height(), pair[1].first_height());
    }
}

#[test]
fn test_self_heal_rebuilds_missing_segment() {
    let mut terrain = headless(42).unwrap();
    terrain.update(100.0);
    assert!(terrain.remove_segment_at(120.0).unwrap().is_ok());
    assert!(terrain.segments().covering(125.0).is_none());

    let report = terrain.update(125.0);
    assert!(report.aborted.is_none());
    assert_eq!(terrain.stats().self_heals, 1);

    let healed = terrain.segments().covering(125.0).unwrap();
    assert_eq!(healed.start_x, 120.0);
    assert!(healed.handle_count() > 0);

    for seam in [120.0, 160.0] {
        let left = terrain.height_at(seam - 0.001).unwrap();
        let right = terrain.height_at(seam + 0.001).unwrap();
        assert!((left - right).abs() < 0.01, "seam {}: {} vs {}", seam, left, right);
    }
}

#[test]
fn test_eviction_keeps_collaborators_in_sync() {
    let mut terrain = headless(9).unwrap();
    sweep(&mut terrain, 1600.0, 15.0);

    let bodies: usize = terrain.segments().iter().map(|s| s.body_handles.len()).sum();
    let meshes: usize = terrain.segments().iter().map(|s| s.mesh_handles.len()).sum();
    assert_eq!(terrain.physics().body_count(), bodies);
    assert_eq!(terrain.renderer().mesh_count(), meshes);
    assert!(terrain.stats().segments_evicted > 0);
    for (_, mesh) in terrain.renderer().meshes() {
        assert!(!mesh.detail.wireframe);
    }
}

#[test]
fn test_physics_failures_leave_partial_segments() {
    let mut terrain = headless(5).unwrap();
    terrain.physics_mut().fail_next_calls(3);

    let report = terrain.update(0.0);
    assert!(!report.is_clean());
    let incomplete: Vec<_> = report.builds.iter().filter(|b| !b.is_complete()).collect();
    assert_eq!(incomplete.len(), 3);
    for build in &incomplete {
        assert!(build.failures().all(|f| f.step == "collision"));
    }

    // Every segment was still stored and answers queries
    assert_eq!(terrain.segments().len(), 6);
    assert!(terrain.height_at(10.0).is_some());
    assert!(terrain.segments().get(0).unwrap().body_handles.is_empty());
    assert!(!terrain.segments().get(3).unwrap().body_handles.is_empty());
    assert_eq!(terrain.stats().incomplete_builds, 3);
}

#[test]
fn test_render_failure_is_reported_per_step() {
    let mut terrain = headless(5).unwrap();
    terrain.renderer_mut().fail_next_calls(1);

    let report = terrain.update(0.0);
    let first = &report.builds[0];
    assert!(!first.is_complete());
    assert!(first.failures().all(|f| f.step == "surface_mesh"));
    assert!(first.produced("collision") > 0);
    assert!(report.builds[1..].iter().all(|b| b.is_complete()));
}

#[test]
fn test_dispose_is_idempotent_and_releases_everything() {
    let mut terrain = headless(42).unwrap();
    sweep(&mut terrain, 400.0, 20.0);

    assert!(terrain.dispose().unwrap() > 0);
    assert_eq!(terrain.dispose(), Ok(0));
    assert!(terrain.is_disposed());
    assert_eq!(terrain.physics().body_count(), 0);
    assert_eq!(terrain.renderer().mesh_count(), 0);
    assert_eq!(terrain.renderer().decoration_count(), 0);

    let report = terrain.update(420.0);
    assert_eq!(report.aborted, Some(TerrainError::Disposed));
    assert!(terrain.segments().is_empty());
    assert!(terrain.build_segment_at(0.0).is_none());
}

#[test]
fn test_custom_collaborators_see_every_body() {
    use ridgeline::{BodyHandle, StaticBox, TerrainResult};
    use ridgeline::{SceneRecorder, Terrain, TerrainConfig, TerrainSeed};

    #[derive(Default)]
    struct CountingPhysics {
        live: i64,
        next: u64,
    }

    impl PhysicsBackend for CountingPhysics {
        fn create_static_box(&mut self, _shape: StaticBox) -> TerrainResult<BodyHandle> {
            self.live += 1;
            self.next += 1;
            Ok(BodyHandle(self.next))
        }

        fn remove_body(&mut self, _handle: BodyHandle) -> TerrainResult<()> {
            self.live -= 1;
            Ok(())
        }

        fn set_body_sleeping(&mut self, _handle: BodyHandle, _sleeping: bool) -> TerrainResult<()> {
            Ok(())
        }

        fn step(&mut self, _dt: f32) {}
    }

    let mut terrain = Terrain::new(
        TerrainSeed(3),
        TerrainConfig::default(),
        CountingPhysics::default(),
        SceneRecorder::new(),
    )
    .unwrap();
    let mut x = 0.0;
    while x <= 800.0 {
        terrain.update(x);
        x += 25.0;
    }
    assert!(terrain.physics().live > 0);
    terrain.dispose().unwrap();
    assert_eq!(terrain.physics().live, 0);
}

#[test]
fn test_extreme_and_jumping_positions_never_break_the_window() {
    let mut terrain = headless(42).unwrap();
    let capacity = terrain.config().window_capacity();

    for x in [0.0, 1.0e300, 10_000.0, f64::MAX, 10_010.0, 3_000.0, 5.0, 1.0e12] {
        let report = terrain.update(x);
        let segments = terrain.segments();
        match report.aborted {
            Some(TerrainError::InvalidTrackedPosition { .. }) => {
                assert!(x > 1.0e11, "{} refused", x);
                continue;
            }
            Some(other) => panic!("unexpected abort at {}: {}", x, other),
            None => {}
        }
        assert!(segments.len() <= capacity);
        assert!(segments.covering(x).is_some(), "no segment under x={}", x);
        let indices = segments.indices();
        for pair in indices.windows(2) {
            assert_eq!(pair[1], pair[0] + 1, "hole in window at x={}: {:?}", x, indices);
        }
    }
}
