pub mod color;
pub mod face;
pub mod image;
pub mod matrix;
pub mod point;

pub use color::{ColorRange, ColorTable, DEFAULT_COLOR_RANGES, Hsv};
pub use face::{CUBE_STRING_LEN, CubeString, FACELETS_PER_FACE, Face, FaceString, UNKNOWN_FACELET};
pub use self::image::{BgrImage, FloatImage, GrayImage, HsvImage, Image, Mask};
pub use matrix::Matrix;
pub use point::Point;
