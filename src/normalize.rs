//! Output normaliser: signed-16-bit accumulator to
//! 8-bit luminance, with the vertical flip that reconciles the
//! traversal's +Y-down convention with the external image frame's
//! +Y-up convention.

use crate::detector::{Image, RawImage};

pub fn normalize(raw: &RawImage) -> Image {
    let (lo, hi) = raw
        .data
        .iter()
        .fold((i16::MAX, i16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let mut out = Image::zeroed(raw.width, raw.height);
    if hi == lo {
        return out;
    }
    let (lo, hi) = (lo as f64, hi as f64);
    let scale = 255.0 / (hi - lo);

    for y in 0..raw.height {
        let flipped_y = raw.height - 1 - y;
        for x in 0..raw.width {
            let v = raw.data[y * raw.width + x] as f64;
            out.data[flipped_y * raw.width + x] = (scale * (v - lo)).round() as u8;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_image_normalises_to_zero() {
        let mut raw = RawImage::zeroed(4, 4);
        raw.data.iter_mut().for_each(|v| *v = -2000);
        let img = normalize(&raw);
        assert!(img.data.iter().all(|&p| p == 0));
    }

    #[test]
    fn min_and_max_map_to_0_and_255() {
        let mut raw = RawImage::zeroed(2, 1);
        raw.data[0] = -100;
        raw.data[1] = 900;
        let img = normalize(&raw);
        assert_eq!(img.data[0], 0);
        assert_eq!(img.data[1], 255);
    }

    #[test]
    fn vertical_flip_moves_row_0_to_the_geometric_top() {
        let mut raw = RawImage::zeroed(1, 2);
        raw.data[0] = 0; // row 0 (bottom of traversal frame)
        raw.data[1] = 1000; // row 1
        let img = normalize(&raw);
        assert_eq!(img.data[0], 255); // traversal row 1 is now output row 0
        assert_eq!(img.data[1], 0);
    }
}
