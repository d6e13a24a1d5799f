use anyhow::{anyhow, Result};
use image::{imageops, DynamicImage, GrayImage, Luma};

use super::OcrSettings;

/// Converts image to binary: pixels brighter than `threshold` become white,
/// everything else black.
///
/// Challenge text in the game is light on a dark panel, so this keeps the
/// glyphs and drops the background art.
pub fn threshold_binary(img: &DynamicImage, threshold: u8) -> GrayImage {
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in gray.enumerate_pixels() {
        let value = if pixel[0] > threshold { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Scales the image up by an integer factor. Factors below 2 return a copy.
/// Fails when the scaled size does not fit in `u32`.
pub fn upscale(img: &GrayImage, factor: u32) -> Result<GrayImage> {
    if factor < 2 {
        return Ok(img.clone());
    }
    let (w, h) = img.dimensions();
    let (Some(new_w), Some(new_h)) = (w.checked_mul(factor), h.checked_mul(factor)) else {
        return Err(anyhow!(
            "Upscale factor {} is too large for a {}x{} image",
            factor,
            w,
            h
        ));
    };
    Ok(imageops::resize(img, new_w, new_h, imageops::FilterType::Triangle))
}

/// Median filter over a (2r+1)×(2r+1) window, clamped at the borders.
/// Removes speckle noise left after thresholding.
///
/// The window's 256-bin histogram slides one column per step along each row.
pub fn median_filter(img: &GrayImage, radius: u32) -> GrayImage {
    let (w, h) = img.dimensions();
    if radius == 0 || w == 0 || h == 0 {
        return img.clone();
    }

    let r = radius as i64;
    let clamp_x = |x: i64| x.clamp(0, w as i64 - 1) as usize;
    let clamp_y = |y: i64| y.clamp(0, h as i64 - 1) as usize;
    let pixels = img.as_raw();
    let stride = w as usize;
    let mid = ((2 * r + 1) * (2 * r + 1) / 2) as u32;
    let mut output = GrayImage::new(w, h);
    let mut rows: Vec<usize> = Vec::with_capacity((2 * r + 1) as usize);

    for y in 0..h {
        rows.clear();
        rows.extend((-r..=r).map(|dy| clamp_y(y as i64 + dy) * stride));

        let mut hist = [0u32; 256];
        for dx in -r..=r {
            let sx = clamp_x(dx);
            for &row in &rows {
                hist[pixels[row + sx] as usize] += 1;
            }
        }

        for x in 0..w {
            if x > 0 {
                let leaving = clamp_x(x as i64 - 1 - r);
                let entering = clamp_x(x as i64 + r);
                for &row in &rows {
                    hist[pixels[row + leaving] as usize] -= 1;
                    hist[pixels[row + entering] as usize] += 1;
                }
            }
            output.put_pixel(x, y, Luma([histogram_median(&hist, mid)]));
        }
    }

    output
}

/// Value at sorted position `mid` of the histogram's samples.
fn histogram_median(hist: &[u32; 256], mid: u32) -> u8 {
    let mut seen = 0u32;
    for (value, &count) in hist.iter().enumerate() {
        seen += count;
        if seen > mid {
            return value as u8;
        }
    }
    u8::MAX
}

/// Full preprocessing chain applied before OCR.
pub fn prepare_for_ocr(img: &DynamicImage, settings: &OcrSettings) -> Result<GrayImage> {
    let binary = threshold_binary(img, settings.binary_threshold);
    let scaled = upscale(&binary, settings.upscale_factor)?;
    Ok(median_filter(&scaled, settings.median_radius))
}
