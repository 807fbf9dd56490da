//! PNG rendering for grids.
//!
//! Each cell becomes a `pixel_size` square. At 3 pixels and up, cells are
//! separated by a one-pixel black grid line on their top and left edges,
//! plus a closing line on the bottom and right of the image.

use crate::config::ConfigError;
use crate::grid::{Grid, State};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::path::Path;

/// Grid line colour.
const GRID_LINE: [u8; 4] = [0, 0, 0, 255];

/// Smallest cell size that still gets grid lines.
const MIN_LINED_PIXEL_SIZE: u32 = 3;

/// PICO-8 16-color palette, used for states without an explicit colour.
const PICO8: [[u8; 4]; 16] = [
    [0, 0, 0, 255],       // black
    [29, 43, 83, 255],    // dark-blue
    [126, 37, 83, 255],   // dark-purple
    [0, 135, 81, 255],    // dark-green
    [171, 82, 54, 255],   // brown
    [95, 87, 79, 255],    // dark-grey
    [194, 195, 199, 255], // light-grey
    [255, 241, 232, 255], // white
    [255, 0, 77, 255],    // red
    [255, 163, 0, 255],   // orange
    [255, 236, 39, 255],  // yellow
    [0, 228, 54, 255],    // green
    [41, 173, 255, 255],  // blue
    [131, 118, 156, 255], // lavender
    [255, 119, 168, 255], // pink
    [255, 204, 170, 255], // light-peach
];

/// State to RGBA colour mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: BTreeMap<State, [u8; 4]>,
}

impl Default for Palette {
    /// 0 gray, 1 green, 2 red.
    fn default() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert(0, [128, 128, 128, 255]);
        colors.insert(1, [0, 128, 0, 255]);
        colors.insert(2, [255, 0, 0, 255]);
        Self { colors }
    }
}

impl Palette {
    /// Default palette with `#rrggbb` overrides.
    pub fn from_hex(overrides: &BTreeMap<State, String>) -> Result<Self, ConfigError> {
        let mut palette = Self::default();
        for (&state, value) in overrides {
            let color = parse_hex(value).ok_or_else(|| ConfigError::InvalidColor {
                state,
                value: value.clone(),
            })?;
            palette.colors.insert(state, color);
        }
        Ok(palette)
    }

    /// Colour for `state`, falling back to PICO-8 by state value.
    pub fn get(&self, state: State) -> [u8; 4] {
        self.colors
            .get(&state)
            .copied()
            .unwrap_or(PICO8[state as usize % PICO8.len()])
    }
}

/// Parse `#rrggbb` (leading `#` optional) into opaque RGBA.
fn parse_hex(value: &str) -> Option<[u8; 4]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?, 255])
}

/// Render a grid to an RGBA image.
///
/// # Arguments
/// * `grid` - The grid to render
/// * `palette` - Colour for each state
/// * `pixel_size` - Side of each cell in pixels (clamped to at least 1)
///
/// # Returns
/// RGBA image of `cols * pixel_size` by `rows * pixel_size`, plus one pixel
/// each way when grid lines are drawn. `ConfigError::ImageTooLarge` when a
/// side does not fit in `u32`.
pub fn render_grid(
    grid: &Grid,
    palette: &Palette,
    pixel_size: u32,
) -> Result<RgbaImage, ConfigError> {
    let pixel_size = pixel_size.max(1);
    let lined = pixel_size >= MIN_LINED_PIXEL_SIZE;
    let border = u32::from(lined);

    let too_large = || ConfigError::ImageTooLarge {
        rows: grid.rows(),
        cols: grid.cols(),
        pixel_size,
    };
    let side = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|n| n.checked_mul(pixel_size))
            .and_then(|n| n.checked_add(border))
    };
    let width = side(grid.cols()).ok_or_else(too_large)?;
    let height = side(grid.rows()).ok_or_else(too_large)?;
    // RGBA buffer length must fit in usize as well
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(too_large)?;

    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba(GRID_LINE));

    for (row, col, state) in grid.iter() {
        let color = Rgba(palette.get(state));
        let x0 = (col as u32) * pixel_size;
        let y0 = (row as u32) * pixel_size;

        // with lines, the first row and column of each block stay black
        for dy in border..pixel_size {
            for dx in border..pixel_size {
                img.put_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }

    Ok(img)
}

/// Save an image as PNG.
pub fn save_png<P: AsRef<Path>>(img: &RgbaImage, path: P) -> Result<(), image::ImageError> {
    img.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Grid {
        Grid::from_rows(vec![vec![0, 1], vec![2, 0]], &[0, 1, 2]).unwrap()
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        assert_eq!(palette.get(0), [128, 128, 128, 255]);
        assert_eq!(palette.get(1), [0, 128, 0, 255]);
        assert_eq!(palette.get(2), [255, 0, 0, 255]);
        assert_eq!(palette.get(3), PICO8[3]);
        assert_eq!(palette.get(19), PICO8[3]);
    }

    #[test]
    fn test_from_hex() {
        let mut overrides = BTreeMap::new();
        overrides.insert(1, "#FFa500".to_string());
        overrides.insert(4, "102030".to_string());
        let palette = Palette::from_hex(&overrides).unwrap();
        assert_eq!(palette.get(1), [255, 165, 0, 255]);
        assert_eq!(palette.get(4), [16, 32, 48, 255]);
        assert_eq!(palette.get(0), [128, 128, 128, 255]);
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        for bad in ["#12345", "#gg0000", "red", "#1234567", "#ééé"] {
            let mut overrides = BTreeMap::new();
            overrides.insert(2, bad.to_string());
            assert_eq!(
                Palette::from_hex(&overrides),
                Err(ConfigError::InvalidColor {
                    state: 2,
                    value: bad.to_string()
                }),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_render_without_lines() {
        let img = render_grid(&sample_grid(), &Palette::default(), 2).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
        assert_eq!(img.get_pixel(0, 0).0, [128, 128, 128, 255]);
        assert_eq!(img.get_pixel(3, 1).0, [0, 128, 0, 255]);
        assert_eq!(img.get_pixel(1, 2).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_render_with_lines() {
        let img = render_grid(&sample_grid(), &Palette::default(), 4).unwrap();
        assert_eq!((img.width(), img.height()), (9, 9));
        // grid lines
        assert_eq!(img.get_pixel(0, 2).0, GRID_LINE);
        assert_eq!(img.get_pixel(4, 2).0, GRID_LINE);
        assert_eq!(img.get_pixel(8, 8).0, GRID_LINE);
        // cell interiors
        assert_eq!(img.get_pixel(1, 1).0, [128, 128, 128, 255]);
        assert_eq!(img.get_pixel(5, 3).0, [0, 128, 0, 255]);
        assert_eq!(img.get_pixel(3, 7).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_render_does_not_touch_grid() {
        let grid = sample_grid();
        let before = grid.clone();
        render_grid(&grid, &Palette::default(), 5).unwrap();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_render_rejects_oversized_image() {
        let grid = Grid::new(2, 2, &[0, 1], 0).unwrap();
        assert_eq!(
            render_grid(&grid, &Palette::default(), 3_000_000_000).unwrap_err(),
            ConfigError::ImageTooLarge {
                rows: 2,
                cols: 2,
                pixel_size: 3_000_000_000
            }
        );

        // fits exactly without lines, overflows once the border pixel is added
        let grid = Grid::new(1, 1, &[0], 0).unwrap();
        assert!(matches!(
            render_grid(&grid, &Palette::default(), u32::MAX),
            Err(ConfigError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");
        let img = render_grid(&sample_grid(), &Palette::default(), 3).unwrap();
        save_png(&img, &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), img.dimensions());
        assert_eq!(loaded.get_pixel(1, 1), img.get_pixel(1, 1));
    }
}
