use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, RgbImage};

use super::SceneError;
use crate::types::DepthImage;

/// Cubic filter used for every scene image.
const FILTER: FilterType = FilterType::CatmullRom;

/// `floor(dim / factor)` for both axes.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let scale = |dim: u32| (f64::from(dim) / factor).floor() as u32;
    (scale(width), scale(height))
}

fn target_dimensions(width: u32, height: u32, factor: f64) -> Result<(u32, u32), SceneError> {
    let (w, h) = scaled_dimensions(width, height, factor);
    if w == 0 || h == 0 {
        return Err(SceneError::Degenerate {
            width,
            height,
            factor,
        });
    }
    Ok((w, h))
}

/// Returns the image untouched when `factor == 1`.
pub fn downscale_rgb(image: RgbImage, factor: f64) -> Result<RgbImage, SceneError> {
    if factor == 1.0 {
        return Ok(image);
    }
    let (w, h) = target_dimensions(image.width(), image.height(), factor)?;
    Ok(imageops::resize(&image, w, h, FILTER))
}

/// Returns the image untouched when `factor == 1`.
///
/// The resampler clamps float samples to `[0, 1]`, so depth is normalized by
/// its largest finite value before filtering and scaled back afterwards.
/// Non-finite samples are treated as zero.
pub fn downscale_depth(image: DepthImage, factor: f64) -> Result<DepthImage, SceneError> {
    if factor == 1.0 {
        return Ok(image);
    }
    let (w, h) = target_dimensions(image.width(), image.height(), factor)?;

    let max = image
        .pixels()
        .map(|p| p.0[0])
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Ok(ImageBuffer::new(w, h));
    }

    let normalized: DepthImage = ImageBuffer::from_fn(image.width(), image.height(), |x, y| {
        let v = image.get_pixel(x, y).0[0];
        Luma([if v.is_finite() { v.max(0.0) / max } else { 0.0 }])
    });
    let mut resized = imageops::resize(&normalized, w, h, FILTER);
    for pixel in resized.pixels_mut() {
        pixel.0[0] *= max;
    }
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, (x + y) as u8]))
    }

    #[test]
    fn unit_factor_is_bit_identical() {
        let image = gradient(7, 5);
        let out = downscale_rgb(image.clone(), 1.0).unwrap();
        assert_eq!(out, image);

        let depth: DepthImage = ImageBuffer::from_fn(7, 5, |x, _| Luma([x as f32 * 1.5]));
        let out = downscale_depth(depth.clone(), 1.0).unwrap();
        assert_eq!(out.as_raw(), depth.as_raw());
    }

    #[test]
    fn dimensions_are_floored() {
        assert_eq!(scaled_dimensions(640, 480, 2.0), (320, 240));
        assert_eq!(scaled_dimensions(7, 5, 2.0), (3, 2));
        assert_eq!(scaled_dimensions(10, 10, 3.0), (3, 3));
        assert_eq!(scaled_dimensions(512, 512, 1.5), (341, 341));

        let out = downscale_rgb(gradient(7, 5), 2.0).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
    }

    #[test]
    fn depth_keeps_its_range() {
        let depth: DepthImage = ImageBuffer::from_pixel(8, 8, Luma([4.0]));
        let out = downscale_depth(depth, 2.0).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        for pixel in out.pixels() {
            assert!((pixel.0[0] - 4.0).abs() < 1e-3, "got {}", pixel.0[0]);
        }
    }

    #[test]
    fn collapsing_factor_is_rejected() {
        let err = downscale_rgb(gradient(3, 3), 4.0).unwrap_err();
        assert!(matches!(err, SceneError::Degenerate { width: 3, .. }));
    }
}
