use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crustal::{convert_elevation_to_thickness, Axis, ElevationGrid, IsostasyParams};

/// One-degree global grid (181 x 361).
const NLAT: usize = 181;
const NLON: usize = 361;

/// Synthetic elevation field spanning ocean basins and mountain belts.
fn create_grid() -> ElevationGrid {
    let lats: Vec<f64> = (0..NLAT).map(|i| -90.0 + i as f64).collect();
    let lons: Vec<f64> = (0..NLON).map(|i| -180.0 + i as f64).collect();
    let values = (0..NLAT * NLON)
        .map(|i| ((i % 12000) as f64) - 6000.0)
        .collect();

    ElevationGrid {
        variable: "z".to_string(),
        axes: vec![Axis::with_coords("lat", lats), Axis::with_coords("lon", lons)],
        aux_coords: Vec::new(),
        values,
    }
}

fn bench_single_value(c: &mut Criterion) {
    let params = IsostasyParams::default();

    c.bench_function("thickness_single", |b| {
        b.iter(|| black_box(params.thickness(black_box(1234.5))));
    });
}

fn bench_slice(c: &mut Criterion) {
    let grid = create_grid();
    let params = IsostasyParams::default();

    c.bench_function("thickness_slice_1deg", |b| {
        b.iter(|| black_box(convert_elevation_to_thickness(black_box(&grid.values), &params)));
    });
}

fn bench_grid(c: &mut Criterion) {
    let grid = create_grid();
    let params = IsostasyParams::default();

    c.bench_function("thickness_grid_1deg", |b| {
        b.iter(|| black_box(grid.to_thickness(black_box(&params))));
    });
}

criterion_group!(benches, bench_single_value, bench_slice, bench_grid);
criterion_main!(benches);
