use anyhow::anyhow;
use image::{DynamicImage, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Width of the white border added around the cleaned image. Tesseract reads
/// text near the edge poorly without it.
const BORDER: u32 = 10;

/// Pre-processing filter applied to the grayscale screenshot before OCR.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// 3x3 median blur, removes speckle noise (default)
    Blur,
    /// Otsu binarization
    Thresh,
    /// No filtering beyond grayscale conversion
    None,
}

impl Default for Filter {
    fn default() -> Self {
        Filter::Blur
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blur" => Ok(Filter::Blur),
            "thresh" => Ok(Filter::Thresh),
            "none" => Ok(Filter::None),
            other => Err(anyhow!(
                "Unknown filter {:?} (expected blur, thresh or none)",
                other
            )),
        }
    }
}

/// Prepares a raw screenshot for OCR.
///
/// Grayscale conversion, the selected filter, inversion (black text on white
/// reads better), then a white border.
pub fn clean_image(raw: &DynamicImage, filter: Filter) -> GrayImage {
    let mut clean = raw.to_luma8();

    clean = match filter {
        Filter::Blur => median_blur(&clean),
        Filter::Thresh => otsu_threshold(&clean),
        Filter::None => clean,
    };

    image::imageops::invert(&mut clean);
    add_border(&clean, BORDER, 255)
}

/// 3x3 median filter. Border pixels use whatever neighbours exist.
fn median_blur(img: &GrayImage) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let mut values: Vec<u8> = Vec::with_capacity(9);
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx >= 0 && ny >= 0 && nx < w as i32 && ny < h as i32 {
                        values.push(img.get_pixel(nx as u32, ny as u32)[0]);
                    }
                }
            }
            values.sort_unstable();
            out.put_pixel(x, y, Luma([values[values.len() / 2]]));
        }
    }

    out
}

/// Binarizes using Otsu's method: picks the threshold that maximizes the
/// between-class variance of the grayscale histogram.
fn otsu_threshold(img: &GrayImage) -> GrayImage {
    let mut histogram = [0u32; 256];
    for pixel in img.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total = (img.width() as u64 * img.height() as u64) as f64;
    let sum_all: f64 = histogram
        .iter()
        .enumerate()
        .map(|(value, &count)| value as f64 * count as f64)
        .sum();

    let mut sum_bg = 0.0;
    let mut weight_bg = 0.0;
    let mut best_threshold = 0u8;
    let mut best_variance = 0.0;

    for t in 0..256usize {
        weight_bg += histogram[t] as f64;
        if weight_bg == 0.0 {
            continue;
        }
        let weight_fg = total - weight_bg;
        if weight_fg == 0.0 {
            break;
        }
        sum_bg += t as f64 * histogram[t] as f64;

        let mean_bg = sum_bg / weight_bg;
        let mean_fg = (sum_all - sum_bg) / weight_fg;
        let variance = weight_bg * weight_fg * (mean_bg - mean_fg) * (mean_bg - mean_fg);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }

    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = if pixel[0] > best_threshold { 255 } else { 0 };
    }
    out
}

/// Pads the image with a uniform border of the given value.
fn add_border(img: &GrayImage, border: u32, value: u8) -> GrayImage {
    let (w, h) = img.dimensions();
    let mut out = GrayImage::from_pixel(w + 2 * border, h + 2 * border, Luma([value]));
    image::imageops::replace(&mut out, img, border as i64, border as i64);
    out
}
