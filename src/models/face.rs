//! Cube faces and the facelet strings assembled from them

use crate::error::{Result, ScanError};
use std::fmt;
use std::str::FromStr;

/// Letter written for a cell that no color range claimed
pub const UNKNOWN_FACELET: u8 = b'n';

/// Facelets per face
pub const FACELETS_PER_FACE: usize = 9;

/// Facelets in a cube string
pub const CUBE_STRING_LEN: usize = FACELETS_PER_FACE * 6;

/// One of the six photographed cube faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    /// Front face
    Mid,
    /// Bottom face
    Bot,
    /// Back face
    Back,
    /// Top face
    Top,
    /// Right face
    Right,
    /// Left face
    Left,
}

impl Face {
    /// All faces in cube-string order
    pub const ALL: [Face; 6] = [Face::Mid, Face::Bot, Face::Back, Face::Top, Face::Right, Face::Left];

    /// Position of this face in the cube string
    pub fn index(self) -> usize {
        match self {
            Face::Mid => 0,
            Face::Bot => 1,
            Face::Back => 2,
            Face::Top => 3,
            Face::Right => 4,
            Face::Left => 5,
        }
    }

    /// Lowercase face name used in file names and CLI flags
    pub fn name(self) -> &'static str {
        match self {
            Face::Mid => "mid",
            Face::Bot => "bot",
            Face::Back => "back",
            Face::Top => "top",
            Face::Right => "right",
            Face::Left => "left",
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Face {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        Face::ALL
            .into_iter()
            .find(|face| face.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScanError::UnknownFace(s.to_string()))
    }
}

/// Nine facelet letters of one face, row-major
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceString([u8; FACELETS_PER_FACE]);

impl FaceString {
    /// Face with every cell unknown
    pub fn unknown() -> Self {
        Self([UNKNOWN_FACELET; FACELETS_PER_FACE])
    }

    /// Parse nine ASCII letters
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != FACELETS_PER_FACE || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return None;
        }
        let mut cells = [0u8; FACELETS_PER_FACE];
        for (dst, src) in cells.iter_mut().zip(bytes) {
            *dst = src.to_ascii_lowercase();
        }
        Some(Self(cells))
    }

    /// Write `letter` into cell `(row, col)` of the 3x3 grid
    pub fn set(&mut self, row: usize, col: usize, letter: char) {
        if row < 3 && col < 3 && letter.is_ascii() {
            self.0[row * 3 + col] = (letter as u8).to_ascii_lowercase();
        }
    }

    /// Letter at cell `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> char {
        self.0[row * 3 + col] as char
    }

    /// Number of cells still holding the unknown sentinel
    pub fn unknown_count(&self) -> usize {
        self.0.iter().filter(|&&c| c == UNKNOWN_FACELET).count()
    }

    /// Letters as a string slice
    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Default for FaceString {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for FaceString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The 54-letter cube string consumed by the solver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeString([u8; CUBE_STRING_LEN]);

impl CubeString {
    /// Cube string with every facelet unknown
    pub fn new() -> Self {
        Self([UNKNOWN_FACELET; CUBE_STRING_LEN])
    }

    /// Splice a face into its fixed slot
    pub fn insert(&mut self, face: Face, face_string: &FaceString) {
        let start = face.index() * FACELETS_PER_FACE;
        self.0[start..start + FACELETS_PER_FACE].copy_from_slice(&face_string.0);
    }

    /// The nine letters stored for `face`
    pub fn face(&self, face: Face) -> FaceString {
        let start = face.index() * FACELETS_PER_FACE;
        let mut cells = [0u8; FACELETS_PER_FACE];
        cells.copy_from_slice(&self.0[start..start + FACELETS_PER_FACE]);
        FaceString(cells)
    }

    /// True if any facelet is still unknown
    pub fn has_unknown(&self) -> bool {
        self.0.contains(&UNKNOWN_FACELET)
    }

    /// Letters as a string slice
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Default for CubeString {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CubeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_order_and_names() {
        let names: Vec<&str> = Face::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["mid", "bot", "back", "top", "right", "left"]);
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
    }

    #[test]
    fn test_face_from_str() {
        assert_eq!("Right".parse::<Face>().unwrap(), Face::Right);
        assert!(matches!("front".parse::<Face>(), Err(ScanError::UnknownFace(_))));
    }

    #[test]
    fn test_new_cube_string_is_all_unknown() {
        let cube = CubeString::new();
        assert_eq!(cube.as_str().len(), 54);
        assert!(cube.as_str().chars().all(|c| c == 'n'));
        assert!(cube.has_unknown());
    }

    #[test]
    fn test_insert_six_faces_in_order() {
        let faces = ["wwwwwwwww", "yyyyyyyyy", "bbbbbbbbb", "ggggggggg", "rrrrrrrrr", "ooooooooo"];
        let mut cube = CubeString::new();
        // Insert out of order to make sure the slot comes from the face, not the call order
        for i in [3usize, 0, 5, 1, 4, 2] {
            cube.insert(Face::ALL[i], &FaceString::parse(faces[i]).unwrap());
        }
        assert_eq!(cube.as_str(), faces.concat());
        assert!(!cube.has_unknown());
        assert_eq!(cube.face(Face::Back).as_str(), "bbbbbbbbb");
    }

    #[test]
    fn test_face_string_set_lowercases() {
        let mut face = FaceString::unknown();
        face.set(1, 2, 'G');
        assert_eq!(face.as_str(), "nnnnngnnn");
        assert_eq!(face.unknown_count(), 8);
        face.set(3, 0, 'r'); // ignored
        assert_eq!(face.get(1, 2), 'g');
    }

    #[test]
    fn test_face_string_parse_rejects_bad_input() {
        assert!(FaceString::parse("abc").is_none());
        assert!(FaceString::parse("abcdefgh1").is_none());
        assert_eq!(FaceString::parse("RRRWWWGGG").unwrap().as_str(), "rrrwwwggg");
    }
}
