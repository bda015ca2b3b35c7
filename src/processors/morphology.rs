//! Binary morphology with rectangular structuring elements.
//!
//! The detector needs wide-and-short and long-and-thin kernels (fusing a
//! text line into one blob, isolating table rule lines), so dilation and
//! erosion are implemented as separable horizontal/vertical passes with a
//! sliding-window population count. Inputs and outputs are inverted binary
//! images: foreground is any non-zero pixel, emitted as 255.

use image::GrayImage;

/// Dilates with a `kernel_w x kernel_h` rectangle.
pub fn dilate_rect(image: &GrayImage, kernel_w: u32, kernel_h: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as usize;
    let mut pass = vec![0u8; w * h];
    dilate_horizontal(image.as_raw(), &mut pass, w, h, kernel_w as usize);
    let mut out = vec![0u8; w * h];
    dilate_vertical(&pass, &mut out, w, h, kernel_h as usize);
    GrayImage::from_raw(width, height, out).expect("buffer matches dimensions")
}

/// Erodes with a `kernel_w x kernel_h` rectangle.
///
/// Pixels outside the page count as background, so foreground touching the
/// page edge erodes away like any other boundary.
pub fn erode_rect(image: &GrayImage, kernel_w: u32, kernel_h: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as usize;
    let mut pass = vec![0u8; w * h];
    erode_horizontal(image.as_raw(), &mut pass, w, h, kernel_w as usize);
    let mut out = vec![0u8; w * h];
    erode_vertical(&pass, &mut out, w, h, kernel_h as usize);
    GrayImage::from_raw(width, height, out).expect("buffer matches dimensions")
}

/// Morphological closing: dilate then erode. Fuses nearby foreground.
pub fn close_rect(image: &GrayImage, kernel_w: u32, kernel_h: u32) -> GrayImage {
    erode_rect(&dilate_rect(image, kernel_w, kernel_h), kernel_w, kernel_h)
}

/// Morphological opening: erode then dilate. Removes foreground thinner
/// than the kernel while preserving what survives at full size.
pub fn open_rect(image: &GrayImage, kernel_w: u32, kernel_h: u32) -> GrayImage {
    dilate_rect(&erode_rect(image, kernel_w, kernel_h), kernel_w, kernel_h)
}

/// Pixel-wise union of two masks of equal dimensions.
pub fn union_masks(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let (width, height) = a.dimensions();
    let out: Vec<u8> = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&pa, &pb)| if pa > 0 || pb > 0 { 255 } else { 0 })
        .collect();
    GrayImage::from_raw(width, height, out).expect("buffer matches dimensions")
}

fn dilate_horizontal(input: &[u8], output: &mut [u8], w: usize, h: usize, kernel_w: usize) {
    if kernel_w <= 1 {
        output.copy_from_slice(input);
        return;
    }
    let r_left = (kernel_w - 1) / 2;
    let r_right = kernel_w / 2;

    for y in 0..h {
        let row = y * w;
        let mut on = 0usize;
        for x in 0..=r_right.min(w - 1) {
            if input[row + x] > 0 {
                on += 1;
            }
        }
        for x in 0..w {
            output[row + x] = if on > 0 { 255 } else { 0 };
            let enter = x + r_right + 1;
            if enter < w && input[row + enter] > 0 {
                on += 1;
            }
            if x >= r_left && input[row + x - r_left] > 0 {
                on -= 1;
            }
        }
    }
}

fn dilate_vertical(input: &[u8], output: &mut [u8], w: usize, h: usize, kernel_h: usize) {
    if kernel_h <= 1 {
        output.copy_from_slice(input);
        return;
    }
    let r_top = (kernel_h - 1) / 2;
    let r_bot = kernel_h / 2;

    for x in 0..w {
        let mut on = 0usize;
        for y in 0..=r_bot.min(h - 1) {
            if input[y * w + x] > 0 {
                on += 1;
            }
        }
        for y in 0..h {
            output[y * w + x] = if on > 0 { 255 } else { 0 };
            let enter = y + r_bot + 1;
            if enter < h && input[enter * w + x] > 0 {
                on += 1;
            }
            if y >= r_top && input[(y - r_top) * w + x] > 0 {
                on -= 1;
            }
        }
    }
}

fn erode_horizontal(input: &[u8], output: &mut [u8], w: usize, h: usize, kernel_w: usize) {
    if kernel_w <= 1 {
        output.copy_from_slice(input);
        return;
    }
    let r_left = (kernel_w - 1) / 2;
    let r_right = kernel_w / 2;

    for y in 0..h {
        let row = y * w;
        let mut on = 0usize;
        for x in 0..=r_right.min(w - 1) {
            if input[row + x] > 0 {
                on += 1;
            }
        }
        for x in 0..w {
            // The window extends past the page near the edges; missing
            // pixels are background, so the full kernel width is required.
            output[row + x] = if on == kernel_w { 255 } else { 0 };
            let enter = x + r_right + 1;
            if enter < w && input[row + enter] > 0 {
                on += 1;
            }
            if x >= r_left && input[row + x - r_left] > 0 {
                on -= 1;
            }
        }
    }
}

fn erode_vertical(input: &[u8], output: &mut [u8], w: usize, h: usize, kernel_h: usize) {
    if kernel_h <= 1 {
        output.copy_from_slice(input);
        return;
    }
    let r_top = (kernel_h - 1) / 2;
    let r_bot = kernel_h / 2;

    for x in 0..w {
        let mut on = 0usize;
        for y in 0..=r_bot.min(h - 1) {
            if input[y * w + x] > 0 {
                on += 1;
            }
        }
        for y in 0..h {
            output[y * w + x] = if on == kernel_h { 255 } else { 0 };
            let enter = y + r_bot + 1;
            if enter < h && input[enter * w + x] > 0 {
                on += 1;
            }
            if y >= r_top && input[(y - r_top) * w + x] > 0 {
                on -= 1;
            }
        }
    }
}
