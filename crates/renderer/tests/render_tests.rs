//! End-to-end figure rendering against on-disk region assets.

use heatmap_common::{DisplayExtent, ExtentSpec, HeatmapError, InterpolationMethod, RenderOptions, SamplePoint};
use interpolation::{interpolate, InterpolationGrid};
use region_assets::{BoundaryPolygon, RegionAssetStore};
use renderer::{encode_base64, encode_png, render, RasterImage, RenderStyle};
use test_utils::{
    bbox, exclave_boundary_geojson, five_samples, holed_boundary_geojson, lattice_samples, TempRegionStore,
};

struct Scene {
    _tmp: TempRegionStore,
    store: RegionAssetStore,
    boundary: BoundaryPolygon,
    samples: Vec<SamplePoint>,
    grid: InterpolationGrid,
}

/// `regionA` from the standard store, interpolated with RBF.
fn standard_scene() -> Scene {
    let tmp = TempRegionStore::standard();
    let store = RegionAssetStore::new(tmp.root());
    let boundary = store.load_boundary("regionA").unwrap();
    let samples = five_samples();
    let grid = interpolate(&samples, &boundary.bounding_region(), 50, InterpolationMethod::Rbf).unwrap();
    Scene {
        _tmp: tmp,
        store,
        boundary,
        samples,
        grid,
    }
}

/// Region whose boundary has a small exclave outside the main part.
fn exclave_scene() -> Scene {
    let tmp = TempRegionStore::new();
    tmp.write_boundary("split", &exclave_boundary_geojson(bbox::REGION_A));
    let store = RegionAssetStore::new(tmp.root());
    let boundary = store.load_boundary("split").unwrap();
    let samples = five_samples();
    let grid = interpolate(&samples, &boundary.bounding_region(), 40, InterpolationMethod::Kriging).unwrap();
    Scene {
        _tmp: tmp,
        store,
        boundary,
        samples,
        grid,
    }
}

fn render_with(scene: &Scene, options: &RenderOptions) -> RasterImage {
    let layers = scene.store.load_layers("regionA", &options.map_layers).unwrap();
    render(&scene.grid, &scene.boundary, &layers, &scene.samples, options, &RenderStyle::default()).unwrap()
}

fn alpha_at(image: &RasterImage, x: f64, y: f64) -> u8 {
    let (px, py) = image.geo_to_pixel(x, y).expect("coordinate outside image");
    image.pixel(px, py).unwrap().alpha()
}

fn rgb_at(image: &RasterImage, x: f64, y: f64) -> (u8, u8, u8) {
    let (px, py) = image.geo_to_pixel(x, y).expect("coordinate outside image");
    let c = image.pixel(px, py).unwrap();
    (c.red(), c.green(), c.blue())
}

#[test]
fn test_heat_is_clipped_to_main_part() {
    let scene = exclave_scene();
    let image = render_with(&scene, &RenderOptions::default());

    // Inside the main rectangle
    assert_eq!(alpha_at(&image, 112.3, 37.85), 255);
    assert_eq!(alpha_at(&image, 112.79, 37.85), 255);

    // Inside the grid region but outside the main rectangle
    assert_eq!(alpha_at(&image, 112.81, 37.85), 0);
    assert_eq!(alpha_at(&image, 112.85, 37.85), 0);

    // The exclave is outlined but carries no heat
    assert_eq!(alpha_at(&image, 112.95, 38.305), 0);
}

#[test]
fn test_boundary_hole_keeps_heat() {
    let tmp = TempRegionStore::new();
    tmp.write_boundary("holed", &holed_boundary_geojson(bbox::REGION_A));
    let store = RegionAssetStore::new(tmp.root());
    let boundary = store.load_boundary("holed").unwrap();
    assert_eq!(boundary.clip.interiors().len(), 1);

    let samples = five_samples();
    let grid = interpolate(&samples, &boundary.bounding_region(), 40, InterpolationMethod::Kriging).unwrap();
    let image = render(&grid, &boundary, &[], &samples, &RenderOptions::default(), &RenderStyle::default()).unwrap();

    // Hole spans [112.2, 112.4] x [37.75, 37.95]
    assert_eq!(alpha_at(&image, 112.3, 37.85), 255);
    assert_eq!(alpha_at(&image, 112.25, 37.9), 255);
    assert_eq!(alpha_at(&image, 112.6, 37.6), 255);

    // The hole's edge is still outlined in the boundary color
    let (px, py) = image.geo_to_pixel(112.2, 37.85).unwrap();
    let outlined = (px.saturating_sub(2)..=px + 2).any(|x| {
        let c = image.pixel(x, py).unwrap();
        c.red() < 60 && c.green() < 60 && c.blue() < 60
    });
    assert!(outlined, "hole outline missing");
}

#[test]
fn test_exclave_outline_is_drawn() {
    let scene = exclave_scene();
    assert_eq!(scene.boundary.part_count(), 2);
    let image = render_with(&scene, &RenderOptions::default());

    // West edge of the exclave at x = 112.9
    let (px, py) = image.geo_to_pixel(112.9, 38.305).unwrap();
    let hit = (px.saturating_sub(2)..=px + 2).any(|x| image.pixel(x, py).unwrap().alpha() > 0);
    assert!(hit, "exclave outline missing");
}

#[test]
fn test_default_scale_runs_cyan_to_dark_red() {
    let tmp = TempRegionStore::standard();
    let store = RegionAssetStore::new(tmp.root());
    let boundary = store.load_boundary("regionA").unwrap();
    let (xmin, _, _, _) = bbox::REGION_A;
    let samples = lattice_samples(4, bbox::REGION_A, |x, _| x - xmin);
    let grid = interpolate(&samples, &boundary.bounding_region(), 40, InterpolationMethod::Kriging).unwrap();

    let image = render(&grid, &boundary, &[], &samples, &RenderOptions::default(), &RenderStyle::default()).unwrap();

    let (r, _, b) = rgb_at(&image, 111.81, 37.85);
    assert!(b > 150 && r < 40, "west edge should be cyan-ish, got r={} b={}", r, b);

    let (r, g, b) = rgb_at(&image, 112.79, 37.85);
    assert!(r > 120 && g < 60 && b < 40, "east edge should be dark red, got {:?}", (r, g, b));
}

#[test]
fn test_colormap_changes_output() {
    let scene = standard_scene();
    let classic = render_with(&scene, &RenderOptions::default());
    let viridis = render_with(
        &scene,
        &RenderOptions {
            colormap: "viridis".to_string(),
            ..RenderOptions::default()
        },
    );

    assert_ne!(rgb_at(&classic, 112.3, 37.7), rgb_at(&viridis, 112.3, 37.7));
}

#[test]
fn test_unknown_colormap_is_render_error() {
    let scene = standard_scene();
    let options = RenderOptions {
        colormap: "no_such_scale".to_string(),
        ..RenderOptions::default()
    };
    let err = render(&scene.grid, &scene.boundary, &[], &scene.samples, &options, &RenderStyle::default()).unwrap_err();
    assert!(matches!(err, HeatmapError::RenderError(_)), "got {:?}", err);
}

#[test]
fn test_degenerate_extent_is_rejected() {
    let scene = standard_scene();
    let options = RenderOptions {
        extent: Some(ExtentSpec::from(DisplayExtent::new(112.0, 112.0, 37.0, 38.0))),
        ..RenderOptions::default()
    };
    let err = render(&scene.grid, &scene.boundary, &[], &scene.samples, &options, &RenderStyle::default()).unwrap_err();
    assert!(matches!(err, HeatmapError::InputMalformed(_)), "got {:?}", err);
}

#[test]
fn test_custom_extent_changes_scale() {
    let scene = standard_scene();
    let default_image = render_with(&scene, &RenderOptions::default());
    let zoomed = render_with(
        &scene,
        &RenderOptions {
            extent: Some(ExtentSpec::from(DisplayExtent::new(111.7, 112.9, 37.4, 38.3))),
            ..RenderOptions::default()
        },
    );

    assert!(zoomed.projection().scale > default_image.projection().scale);
    assert!(zoomed.width() > default_image.width());
}

#[test]
fn test_layers_draw_over_heat() {
    let scene = standard_scene();
    let plain = render_with(&scene, &RenderOptions::default());
    let layered = render_with(
        &scene,
        &RenderOptions {
            map_layers: vec!["water".to_string(), "roads".to_string(), "missing".to_string()],
            ..RenderOptions::default()
        },
    );

    // Inside the water polygon, away from the road
    assert_ne!(rgb_at(&plain, 112.1, 37.95), rgb_at(&layered, 112.1, 37.95));
    // Outside both layers nothing changes
    assert_eq!(rgb_at(&plain, 112.7, 37.55), rgb_at(&layered, 112.7, 37.55));
}

#[test]
fn test_sample_markers_only_when_requested() {
    let scene = standard_scene();
    let hidden = render_with(&scene, &RenderOptions::default());
    let shown = render_with(
        &scene,
        &RenderOptions {
            show_points: true,
            ..RenderOptions::default()
        },
    );

    let (r, g, b) = rgb_at(&shown, 112.30, 37.85);
    assert!(r < 30 && g < 30 && b < 30, "marker center should be black, got {:?}", (r, g, b));

    let (r, g, b) = rgb_at(&hidden, 112.30, 37.85);
    assert!(r > 30 || g > 30 || b > 30);
}

#[test]
fn test_figure_is_tightly_cropped() {
    let scene = standard_scene();
    let image = render_with(&scene, &RenderOptions::default());
    let padding = RenderStyle::default().crop_padding_px;

    let column_alpha = |x: u32| (0..image.height()).map(|y| image.pixel(x, y).unwrap().alpha()).max().unwrap();
    let row_alpha = |y: u32| (0..image.width()).map(|x| image.pixel(x, y).unwrap().alpha()).max().unwrap();

    for x in 0..padding {
        assert_eq!(column_alpha(x), 0);
        assert_eq!(column_alpha(image.width() - 1 - x), 0);
    }
    for y in 0..padding {
        assert_eq!(row_alpha(y), 0);
        assert_eq!(row_alpha(image.height() - 1 - y), 0);
    }
    assert!(column_alpha(padding) > 0);
    assert!(row_alpha(padding) > 0);

    // Colorbar sits to the right of the map
    let (map_right, _) = image.geo_to_pixel(112.79, 37.85).unwrap();
    assert!((map_right + 10..image.width()).any(|x| column_alpha(x) > 0));
}

#[test]
fn test_encoded_output() {
    let scene = standard_scene();
    let image = render_with(&scene, &RenderOptions::default());

    let png = encode_png(&image).unwrap();
    assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    assert_eq!(&png[16..20], &image.width().to_be_bytes());

    let b64 = encode_base64(&png);
    assert!(b64.starts_with("iVBORw0KGgo"));
}
