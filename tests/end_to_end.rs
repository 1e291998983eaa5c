use droplet_terrain::erosion::{simulate_droplet, Droplet, Termination};
use droplet_terrain::{
    build_erosion_brush, generate_height_field, simulate_erosion, ErosionParameters, HeightField,
    HeightSurface, NoiseSettings,
};
use proptest::prelude::*;

fn scenario_settings() -> NoiseSettings {
    NoiseSettings {
        seed: 42,
        octaves: 4,
        persistence: 0.5,
        scale: 1.0,
        target_height: 1.0,
    }
}

#[test]
fn test_generate_and_erode_small_field() {
    let mut field = generate_height_field(&scenario_settings(), 16).unwrap();
    let again = generate_height_field(&scenario_settings(), 16).unwrap();
    assert_eq!(field, again);

    let params = ErosionParameters {
        brush_radius: 2,
        ..Default::default()
    };
    let brush = build_erosion_brush(2);
    let stats = simulate_erosion(&mut field, &brush, &params, 1000, 42).unwrap();

    assert_eq!(stats.droplets, 1000);
    assert_eq!(field.size(), 16);
    assert_eq!(field.as_slice().len(), 256);
    assert!(field.is_finite());
}

#[test]
fn test_erosion_run_is_deterministic() {
    let params = ErosionParameters {
        brush_radius: 2,
        ..Default::default()
    };
    let brush = build_erosion_brush(2);
    let run = || {
        let mut field = generate_height_field(&scenario_settings(), 32).unwrap();
        simulate_erosion(&mut field, &brush, &params, 2000, 7).unwrap();
        field
    };
    assert_eq!(run(), run());
}

#[test]
fn test_flat_field_single_droplet() {
    let mut field = HeightField::new_with(16, 0.5).unwrap();
    let outcome = simulate_droplet(
        &mut field,
        &build_erosion_brush(3),
        &ErosionParameters::default(),
        Droplet::spawn(8.0, 8.0),
    );
    assert_eq!(outcome.steps, 1);
    assert_eq!(outcome.termination, Termination::Stalled);
    assert_eq!(field.total(), 0.5 * 256.0);
}

#[test]
fn test_brush_rebuild_is_stable() {
    for radius in 0..8 {
        assert_eq!(build_erosion_brush(radius), build_erosion_brush(radius));
    }
}

/// Wraps a field and fails the test on any access outside the grid.
struct BoundsChecked {
    field: HeightField,
    touched: usize,
}

impl BoundsChecked {
    fn check(&self, x: usize, y: usize) {
        let n = self.field.size();
        assert!(x < n && y < n, "droplet touched ({}, {}) on a {}x{} field", x, y, n, n);
    }
}

impl HeightSurface for BoundsChecked {
    fn size(&self) -> usize {
        self.field.size()
    }

    fn height(&self, x: usize, y: usize) -> f32 {
        self.check(x, y);
        self.field.get(x, y)
    }

    fn add_height(&mut self, x: usize, y: usize, delta: f32) {
        self.check(x, y);
        self.touched += 1;
        self.field.add(x, y, delta);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn droplets_stay_inside_the_field(
        size in 3usize..40,
        seed in any::<u64>(),
        radius in 0usize..6,
        spawns in prop::collection::vec((0.0f32..=1.0, 0.0f32..=1.0), 1..40),
    ) {
        let settings = NoiseSettings { seed, octaves: 5, ..Default::default() };
        let field = generate_height_field(&settings, size).unwrap();
        let mut surface = BoundsChecked { field, touched: 0 };
        let params = ErosionParameters {
            lifetime: 64,
            brush_radius: radius,
            ..Default::default()
        };
        let brush = build_erosion_brush(radius);
        let span = (size - 3) as f32;

        for (u, v) in spawns {
            let droplet = Droplet::spawn(1.0 + u * span, 1.0 + v * span);
            let outcome = simulate_droplet(&mut surface, &brush, &params, droplet);
            prop_assert!(outcome.steps <= params.lifetime);
            prop_assert!(outcome.sediment.is_finite());
        }
        prop_assert!(surface.field.is_finite());
    }
}
