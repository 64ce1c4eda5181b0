//! Rotation and aspect-preserving scaling.

use crate::error::CastError;
use crate::image::convert::DisplayImage;

/// Rotate 90° counter-clockwise: pixel `(x, y)` moves to
/// `(y, width - 1 - x)` and the dimensions swap.
///
/// Used when the display orientation is landscape relative to a
/// portrait-captured device.
pub fn rotate90(image: &DisplayImage) -> DisplayImage {
    let (w, h) = (image.width as usize, image.height as usize);
    let mut pixels = vec![0u8; image.pixels.len()];

    for y in 0..h {
        for x in 0..w {
            let src = (y * w + x) * 4;
            // Destination image is h wide, w tall.
            let dst = ((w - 1 - x) * h + y) * 4;
            pixels[dst..dst + 4].copy_from_slice(&image.pixels[src..src + 4]);
        }
    }

    DisplayImage {
        width: image.height,
        height: image.width,
        pixels,
    }
}

/// Scale to fit within `target_width × target_height`, preserving
/// aspect ratio with nearest-neighbour sampling.
///
/// First fits the height; if the resulting width overflows the
/// target, refits on width instead. The result always touches at
/// least one target edge and never exceeds either.
pub fn scale_to_fit(
    image: &DisplayImage,
    target_width: u32,
    target_height: u32,
) -> Result<DisplayImage, CastError> {
    if target_width == 0 || target_height == 0 {
        return Err(CastError::EmptyViewport);
    }
    if image.width == 0 || image.height == 0 {
        return Ok(image.clone());
    }

    let img_w = image.width as f64;
    let img_h = image.height as f64;

    let mut factor = img_h / target_height as f64;
    let mut dest_w = (img_w / factor).floor() as u32;
    let mut dest_h = target_height;

    if dest_w > target_width {
        dest_w = target_width;
        factor = img_w / dest_w as f64;
        dest_h = (img_h / factor).floor() as u32;
    }

    // A sliver-thin source can floor to zero; keep one pixel.
    dest_w = dest_w.max(1);
    dest_h = dest_h.max(1);

    let mut pixels = Vec::with_capacity(dest_w as usize * dest_h as usize * 4);
    for y in 0..dest_h {
        let src_y = (y as usize * image.height as usize) / dest_h as usize;
        for x in 0..dest_w {
            let src_x = (x as usize * image.width as usize) / dest_w as usize;
            let src = (src_y * image.width as usize + src_x) * 4;
            pixels.extend_from_slice(&image.pixels[src..src + 4]);
        }
    }

    Ok(DisplayImage {
        width: dest_w,
        height: dest_h,
        pixels,
    })
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// A w×h image whose pixel (x, y) is [x, y, 0, 255].
    fn coordinate_image(w: u32, h: u32) -> DisplayImage {
        let mut pixels = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        DisplayImage {
            width: w,
            height: h,
            pixels,
        }
    }

    #[test]
    fn rotate_swaps_dimensions_and_remaps() {
        let image = coordinate_image(3, 2);
        let rotated = rotate90(&image);
        assert_eq!((rotated.width, rotated.height), (2, 3));

        // (x, y) lands at (y, width - 1 - x).
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(rotated.pixel(y, 2 - x), image.pixel(x, y));
            }
        }
    }

    #[test]
    fn rotate_twice_restores_dimensions() {
        let image = coordinate_image(4, 6);
        let twice = rotate90(&rotate90(&image));
        assert_eq!((twice.width, twice.height), (4, 6));

        // Two quarter turns are a half turn.
        for y in 0..6 {
            for x in 0..4 {
                assert_eq!(twice.pixel(3 - x, 5 - y), image.pixel(x, y));
            }
        }
    }

    #[test]
    fn rotate_four_times_is_identity() {
        let image = coordinate_image(4, 6);
        let four = rotate90(&rotate90(&rotate90(&rotate90(&image))));
        assert_eq!(four, image);
    }

    #[test]
    fn scale_fits_and_touches_an_edge() {
        let cases = [
            // (img_w, img_h, target_w, target_h)
            (320u32, 480u32, 428u32, 240u32),
            (480, 320, 100, 100),
            (100, 100, 50, 200),
            (7, 13, 640, 480),
            (1920, 1080, 428, 240),
        ];
        for (w, h, tw, th) in cases {
            let scaled = scale_to_fit(&coordinate_image(w, h), tw, th).unwrap();
            assert!(scaled.width <= tw && scaled.height <= th, "fits in box");
            assert!(
                scaled.width == tw || scaled.height == th,
                "touches an edge: {w}x{h} -> {}x{} in {tw}x{th}",
                scaled.width,
                scaled.height
            );

            // Aspect preserved within integer rounding.
            let src_ratio = w as f64 / h as f64;
            let dst_ratio = scaled.width as f64 / scaled.height as f64;
            assert!(
                (src_ratio - dst_ratio).abs() / src_ratio < 0.05,
                "aspect drift: {src_ratio} vs {dst_ratio}"
            );
        }
    }

    #[test]
    fn scale_height_first_then_width_refit() {
        // Height fit: factor = 480/240 = 2, dest_w = 160 <= 428.
        let scaled = scale_to_fit(&coordinate_image(320, 480), 428, 240).unwrap();
        assert_eq!((scaled.width, scaled.height), (160, 240));

        // Width overflow forces the refit branch.
        let scaled = scale_to_fit(&coordinate_image(480, 320), 100, 100).unwrap();
        assert_eq!((scaled.width, scaled.height), (100, 66));
    }

    #[test]
    fn scale_identity_preserves_pixels() {
        let image = coordinate_image(8, 8);
        let scaled = scale_to_fit(&image, 8, 8).unwrap();
        assert_eq!(scaled, image);
    }

    #[test]
    fn zero_viewport_is_an_error() {
        let image = coordinate_image(4, 4);
        assert!(matches!(
            scale_to_fit(&image, 0, 100),
            Err(CastError::EmptyViewport)
        ));
        assert!(matches!(
            scale_to_fit(&image, 100, 0),
            Err(CastError::EmptyViewport)
        ));
    }
}
