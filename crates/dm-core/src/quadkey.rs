//! Bing Maps tile system quadkey codec, fixed at detail level 14.
//!
//! Ground truth: Microsoft's published Bing Maps Tile System (Mercator
//! pixel projection, quadtree tile addressing via base-4 digit strings).
//! `quadkey` maps a coordinate to its containing tile's id and center;
//! `tile_center` is its inverse.

/// Fixed detail level used throughout this crate's network and cache
/// layers — matches the original generator's `LEVEL_DETAIL` constant.
pub const LEVEL_DETAIL: u8 = 14;

const MIN_LAT: f64 = -85.051_128_78;
const MAX_LAT: f64 = 85.051_128_78;

fn clip(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn map_size(level: u8) -> u32 {
    256u32 << level
}

/// Project a (lat, lon) pair to global pixel coordinates at `level`.
fn lat_lon_to_pixel(lat: f64, lon: f64, level: u8) -> (u32, u32) {
    let lat = clip(lat, MIN_LAT, MAX_LAT);
    let lon = clip(lon, -180.0, 180.0);

    let x = (lon + 180.0) / 360.0;
    let sin_lat = (lat.to_radians()).sin();
    let y = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * std::f64::consts::PI);

    let size = map_size(level) as f64;
    let pixel_x = clip(x * size + 0.5, 0.0, size - 1.0) as u32;
    let pixel_y = clip(y * size + 0.5, 0.0, size - 1.0) as u32;
    (pixel_x, pixel_y)
}

/// Inverse of [`lat_lon_to_pixel`]: recover the (lat, lon) at the center of
/// the pixel a given global pixel coordinate falls in.
fn pixel_to_lat_lon(pixel_x: u32, pixel_y: u32, level: u8) -> (f64, f64) {
    let size = map_size(level) as f64;
    let x = (pixel_x as f64 / size) - 0.5;
    let y = 0.5 - (pixel_y as f64 / size);

    let lat = 90.0 - 360.0 * (-y * 2.0 * std::f64::consts::PI).exp().atan() / std::f64::consts::PI;
    let lon = 360.0 * x;
    (lat, lon)
}

fn pixel_to_tile(pixel_x: u32, pixel_y: u32) -> (u32, u32) {
    (pixel_x / 256, pixel_y / 256)
}

fn tile_to_quadkey(tile_x: u32, tile_y: u32, level: u8) -> String {
    let mut digits = String::with_capacity(level as usize);
    for i in (1..=level).rev() {
        let mut digit = 0u8;
        let mask = 1u32 << (i - 1);
        if tile_x & mask != 0 {
            digit += 1;
        }
        if tile_y & mask != 0 {
            digit += 2;
        }
        digits.push((b'0' + digit) as char);
    }
    digits
}

fn quadkey_to_tile(quadkey: &str) -> (u32, u32, u8) {
    let mut tile_x = 0u32;
    let mut tile_y = 0u32;
    let level = quadkey.len() as u8;
    for (i, c) in quadkey.chars().enumerate() {
        let mask = 1u32 << (level as usize - i - 1);
        match c {
            '0' => {}
            '1' => tile_x |= mask,
            '2' => tile_y |= mask,
            '3' => {
                tile_x |= mask;
                tile_y |= mask;
            }
            other => panic!("invalid quadkey digit: {other}"),
        }
    }
    (tile_x, tile_y, level)
}

/// Compute the quadkey string and tile center for `(lat, lon)` at
/// [`LEVEL_DETAIL`]. Latitude is clipped to `±85.05112878°` before
/// projection, matching the Mercator projection's singularity at the poles.
pub fn quadkey(lat: f64, lon: f64) -> (f64, f64, String) {
    let (px, py) = lat_lon_to_pixel(lat, lon, LEVEL_DETAIL);
    let (tx, ty) = pixel_to_tile(px, py);
    let qk = tile_to_quadkey(tx, ty, LEVEL_DETAIL);
    let (center_lat, center_lon) = tile_center(&qk);
    (center_lat, center_lon, qk)
}

/// Inverse projection: the (lat, lon) at the center of the tile identified
/// by `quadkey`.
pub fn tile_center(quadkey: &str) -> (f64, f64) {
    let (tx, ty, level) = quadkey_to_tile(quadkey);
    let center_px = tx * 256 + 128;
    let center_py = ty * 256 + 128;
    pixel_to_lat_lon(center_px, center_py, level)
}
