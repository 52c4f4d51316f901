//! Min/max window filters over in-bounds neighbors

use crate::models::GrayImage;

fn window_reduce(image: &GrayImage, size: usize, init: u8, pick: fn(u8, u8) -> u8) -> GrayImage {
    let (width, height) = (image.width(), image.height());
    let half = (size / 2) as isize;
    let mut out = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut acc = init;
            for ky in 0..size as isize {
                for kx in 0..size as isize {
                    let sy = y as isize + ky - half;
                    let sx = x as isize + kx - half;
                    // Neighbors outside the image do not take part
                    if image.in_bounds(sy, sx) {
                        acc = pick(acc, image.get(sy as usize, sx as usize, 0));
                    }
                }
            }
            out.set(y, x, 0, acc);
        }
    }

    out
}

/// Minimum over a `size x size` window
pub fn erode(image: &GrayImage, size: usize) -> GrayImage {
    window_reduce(image, size, u8::MAX, u8::min)
}

/// Maximum over a `size x size` window
pub fn dilate(image: &GrayImage, size: usize) -> GrayImage {
    window_reduce(image, size, u8::MIN, u8::max)
}

/// Erosion followed by dilation; removes specks smaller than the window
pub fn open(image: &GrayImage, size: usize) -> GrayImage {
    dilate(&erode(image, size), size)
}

/// Dilation followed by erosion; fills holes smaller than the window
pub fn close(image: &GrayImage, size: usize) -> GrayImage {
    erode(&dilate(image, size), size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(width: usize, height: usize, y: usize, x: usize) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        img.set(y, x, 0, 255);
        img
    }

    #[test]
    fn test_dilate_grows_dot() {
        let out = dilate(&dot(7, 7, 3, 3), 3);
        assert_eq!(out.as_slice().iter().filter(|&&v| v == 255).count(), 9);
        assert_eq!(out.get(2, 2, 0), 255);
        assert_eq!(out.get(1, 1, 0), 0);
    }

    #[test]
    fn test_erode_removes_dot() {
        let out = erode(&dot(7, 7, 3, 3), 3);
        assert!(out.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_edges_ignore_outside_neighbors() {
        // A white image stays white after erosion: the outside does not count as black
        let white = GrayImage::from_fn(4, 4, |_, _| [255]);
        assert_eq!(erode(&white, 3), white);
        // Corner dot dilates into a 2x2 block only
        let out = dilate(&dot(4, 4, 0, 0), 3);
        assert_eq!(out.as_slice().iter().filter(|&&v| v == 255).count(), 4);
    }

    #[test]
    fn test_open_and_close() {
        let mut img = GrayImage::from_fn(9, 9, |r, c| [if (2..7).contains(&r) && (2..7).contains(&c) { 255 } else { 0 }]);
        img.set(0, 8, 0, 255); // speck
        let opened = open(&img, 3);
        assert_eq!(opened.get(0, 8, 0), 0);
        assert_eq!(opened.get(4, 4, 0), 255);

        let mut holed = GrayImage::from_fn(9, 9, |_, _| [255]);
        holed.set(4, 4, 0, 0);
        assert_eq!(close(&holed, 3).get(4, 4, 0), 255);
    }
}
