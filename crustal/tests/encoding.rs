//! Compression filters on written thickness variables.
//!
//! Kept as a single test in its own binary: the raw library calls below do
//! not go through the netcdf crate's global lock.

use std::ffi::CString;
use std::os::raw::c_int;
use std::path::Path;

use crustal::ConverterBuilder;
use tempfile::TempDir;

/// `(shuffle, deflate, level)` of `variable` as stored in `path`.
fn deflate_settings(path: &Path, variable: &str) -> (c_int, c_int, c_int) {
    let c_path = CString::new(path.to_str().unwrap()).unwrap();
    let c_name = CString::new(variable).unwrap();
    let (mut ncid, mut varid) = (0, 0);
    let (mut shuffle, mut deflate, mut level) = (0, 0, 0);

    unsafe {
        assert_eq!(netcdf_sys::nc_open(c_path.as_ptr(), netcdf_sys::NC_NOWRITE, &mut ncid), 0);
        assert_eq!(netcdf_sys::nc_inq_varid(ncid, c_name.as_ptr(), &mut varid), 0);
        assert_eq!(
            netcdf_sys::nc_inq_var_deflate(ncid, varid, &mut shuffle, &mut deflate, &mut level),
            0
        );
        assert_eq!(netcdf_sys::nc_close(ncid), 0);
    }
    (shuffle, deflate, level)
}

fn write_elevation(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("lat", 4).unwrap();
    file.add_dimension("lon", 8).unwrap();
    let mut z = file.add_variable::<f32>("z", &["lat", "lon"]).unwrap();
    let values: Vec<f32> = (0..32).map(|i| (i as f32) * 100.0 - 1600.0).collect();
    z.put_values(&values, ..).unwrap();
}

#[test]
fn test_thickness_compression_filters() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("in");
    std::fs::create_dir(&input).unwrap();
    write_elevation(&input.join("paleotopography_spliced_30Ma.nc"));

    let default_out = temp_dir.path().join("default");
    ConverterBuilder::new(&input, &default_out)
        .build()
        .unwrap()
        .batch_run()
        .unwrap();
    let (shuffle, deflate, level) =
        deflate_settings(&default_out.join("crustal_thickness_30Ma.nc"), "z");
    assert_eq!(shuffle, 1);
    assert_eq!(deflate, 1);
    assert_eq!(level, 1);

    let unshuffled_out = temp_dir.path().join("unshuffled");
    ConverterBuilder::new(&input, &unshuffled_out)
        .shuffle(false)
        .deflate_level(6)
        .build()
        .unwrap()
        .batch_run()
        .unwrap();
    let (shuffle, deflate, level) =
        deflate_settings(&unshuffled_out.join("crustal_thickness_30Ma.nc"), "z");
    assert_eq!(shuffle, 0);
    assert_eq!(deflate, 1);
    assert_eq!(level, 6);
}
