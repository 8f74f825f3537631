//! Frame-difference movement estimation.
//!
//! The movement score is a count of distinct moving blobs, not a magnitude:
//! the absolute difference of two consecutive frames is grayscaled, blurred
//! to suppress sensor noise, binary-thresholded, dilated to merge nearby
//! regions, and the connected regions larger than the configured area each
//! add one to the score.

use crate::config::MotionConfig;
use crate::source::Frame;
use image::{imageops, GrayImage, Luma};

/// Result of comparing two consecutive frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionAnalysis {
    /// Number of changed regions larger than the area threshold
    pub region_count: usize,
    /// Changed pixels after thresholding, before dilation
    pub changed_pixels: u64,
    /// Total pixels in the analyzed frame
    pub total_pixels: u64,
}

impl MotionAnalysis {
    /// Fraction of the frame that changed, in [0, 1].
    pub fn changed_fraction(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        self.changed_pixels as f64 / self.total_pixels as f64
    }
}

/// Stateless analyzer comparing consecutive frames.
pub struct MotionDetector {
    config: MotionConfig,
}

impl MotionDetector {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Compare two frames of identical resolution.
    pub fn analyze(&self, previous: &Frame, current: &Frame) -> MotionAnalysis {
        debug_assert_eq!(previous.width(), current.width());
        debug_assert_eq!(previous.height(), current.height());

        let diff = diff_luma(&previous.pixels, &current.pixels);
        let blurred = imageops::blur(&diff, self.config.blur_sigma);

        let mut mask = BitMask::threshold(&blurred, self.config.diff_threshold);
        let changed_pixels = mask.count_set();

        for _ in 0..self.config.dilate_iterations {
            mask = mask.dilate3x3();
        }

        let region_count = mask.count_regions_over(self.config.min_region_area as usize);

        MotionAnalysis {
            region_count,
            changed_pixels,
            total_pixels: u64::from(current.width()) * u64::from(current.height()),
        }
    }
}

/// Per-channel absolute difference of two RGB images, collapsed to grayscale
/// with the usual BT.601 weights.
fn diff_luma(a: &image::RgbImage, b: &image::RgbImage) -> GrayImage {
    let mut out = GrayImage::new(a.width(), a.height());
    for (pa, (pb, po)) in a.pixels().zip(b.pixels().zip(out.pixels_mut())) {
        let dr = u32::from(pa[0].abs_diff(pb[0]));
        let dg = u32::from(pa[1].abs_diff(pb[1]));
        let db = u32::from(pa[2].abs_diff(pb[2]));
        let luma = (299 * dr + 587 * dg + 114 * db) / 1000;
        *po = Luma([luma as u8]);
    }
    out
}

/// Binary pixel mask with the morphology the heuristic needs.
struct BitMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BitMask {
    /// Build a mask of pixels strictly brighter than the threshold.
    fn threshold(image: &GrayImage, threshold: u8) -> Self {
        let bits = image.pixels().map(|p| p[0] > threshold).collect();
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            bits,
        }
    }

    fn count_set(&self) -> u64 {
        self.bits.iter().filter(|b| **b).count() as u64
    }

    /// One pass of 3x3 binary dilation.
    fn dilate3x3(&self) -> Self {
        let mut out = vec![false; self.bits.len()];
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.bits[y * self.width + x] {
                    continue;
                }
                for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        let ny = y as i32 + dy;
                        let nx = x as i32 + dx;
                        if ny >= 0 && ny < self.height as i32 && nx >= 0 && nx < self.width as i32 {
                            out[ny as usize * self.width + nx as usize] = true;
                        }
                    }
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            bits: out,
        }
    }

    /// Count 4-connected regions whose pixel area exceeds `min_area`.
    ///
    /// Breadth-first flood fill over a visited grid, the same shape as the
    /// blob region-growing in the vision engine this borrows from.
    fn count_regions_over(&self, min_area: usize) -> usize {
        let mut visited = vec![false; self.bits.len()];
        let mut count = 0;

        for start in 0..self.bits.len() {
            if !self.bits[start] || visited[start] {
                continue;
            }

            let mut area = 0usize;
            let mut queue = vec![start];
            visited[start] = true;

            while let Some(idx) = queue.pop() {
                area += 1;
                let x = (idx % self.width) as i32;
                let y = (idx / self.width) as i32;

                for (dx, dy) in &[(0, 1), (0, -1), (1, 0), (-1, 0)] {
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx < 0 || nx >= self.width as i32 || ny < 0 || ny >= self.height as i32 {
                        continue;
                    }
                    let nidx = ny as usize * self.width + nx as usize;
                    if self.bits[nidx] && !visited[nidx] {
                        visited[nidx] = true;
                        queue.push(nidx);
                    }
                }
            }

            if area > min_area {
                count += 1;
            }
        }

        count
    }
}
