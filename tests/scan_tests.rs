//! End-to-end scans on synthetic cube photos
//!
//! Each face is a single-color square on a black background, large enough
//! for the corner detector to lock onto its outline. The center facelet of
//! every face is far from the outline, so its letter is stable regardless
//! of which corner candidates win the outline search.

use cube_vision::models::{BgrImage, Face};
use cube_vision::pipeline::{CancelToken, ScanControl, scan_with};
use cube_vision::tools::save_bgr;
use cube_vision::{CubeScanner, FaceImages, PipelineContext, ScanError};
use std::sync::mpsc;
use tempfile::tempdir;

const SIZE: usize = 160;
const START: usize = 30;
const END: usize = 130;

fn square_face(color: [u8; 3]) -> BgrImage {
    BgrImage::from_fn(SIZE, SIZE, |r, c| {
        if (START..END).contains(&r) && (START..END).contains(&c) {
            color
        } else {
            [0, 0, 0]
        }
    })
}

/// Face colors in BGR with the letter each should classify as
fn palette() -> [(Face, [u8; 3], char); 6] {
    [
        (Face::Mid, [255, 255, 255], 'w'),
        (Face::Bot, [0, 255, 255], 'y'),
        (Face::Back, [255, 0, 0], 'b'),
        (Face::Top, [0, 255, 0], 'g'),
        (Face::Right, [0, 0, 255], 'r'),
        (Face::Left, [0, 165, 255], 'o'),
    ]
}

fn cube_images() -> FaceImages {
    palette().iter().map(|&(face, color, _)| (face, square_face(color))).collect()
}

#[test]
fn scan_classifies_face_centers() {
    let report = CubeScanner::new().scan(&cube_images()).unwrap();
    let cube = report.cube.as_str();
    assert_eq!(cube.len(), 54);

    for (face, _, letter) in palette() {
        let center = face.index() * 9 + 4;
        assert_eq!(
            cube.as_bytes()[center] as char,
            letter,
            "center of {} in {}",
            face,
            cube
        );
        let result = report.face(face).unwrap();
        assert!(result.corners.len() >= 4, "{} has {} corners", face, result.corners.len());
        assert_eq!((result.rectified.width(), result.rectified.height()), (200, 200));
    }
}

#[test]
fn scan_reads_every_facelet() {
    let report = CubeScanner::new().scan(&cube_images()).unwrap();
    assert_eq!(
        report.cube.as_str(),
        "wwwwwwwwwyyyyyyyyybbbbbbbbbgggggggggrrrrrrrrrooooooooo"
    );
    assert!(!report.cube.has_unknown());

    for (face, _, letter) in palette() {
        let expected: String = std::iter::repeat_n(letter, 9).collect();
        let result = report.face(face).unwrap();
        assert_eq!(result.letters.as_str(), expected, "{}", face);
        assert_eq!(report.cube.face(face).as_str(), expected);

        // The outline hugs the colored square
        for p in result.quad.corners() {
            for v in [p.x, p.y] {
                let near_edge = (v - START as f64).abs() <= 4.0 || (v - END as f64).abs() <= 4.0;
                assert!(near_edge, "{} outline corner ({}, {})", face, p.x, p.y);
            }
        }
    }
}

#[test]
fn sequential_and_parallel_scans_agree() {
    let images = cube_images();
    let parallel = CubeScanner::new().scan(&images).unwrap();
    let sequential = CubeScanner::new().sequential(true).scan(&images).unwrap();
    assert_eq!(parallel.cube, sequential.cube);
}

#[test]
fn scan_reports_missing_faces() {
    let mut images = cube_images();
    images.remove(&Face::Left);
    images.remove(&Face::Top);
    match CubeScanner::new().scan(&images) {
        Err(ScanError::MissingFaces(missing)) => assert_eq!(missing, vec![Face::Top, Face::Left]),
        other => panic!("expected missing faces, got {:?}", other.map(|r| r.cube)),
    }
}

#[test]
fn blank_face_fails_the_scan() {
    let mut images = cube_images();
    images.insert(Face::Back, BgrImage::new(SIZE, SIZE));
    let err = CubeScanner::new().scan(&images).unwrap_err();
    assert!(matches!(err, ScanError::NotEnoughCorners { face: Face::Back, .. }));
}

#[test]
fn cancelled_scan_stops_before_work() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let control = ScanControl { progress: None, cancel };
    let err = scan_with(&PipelineContext::default(), &cube_images(), &control).unwrap_err();
    assert!(matches!(err, ScanError::Cancelled));
}

#[test]
fn progress_counts_every_face() {
    let (tx, rx) = mpsc::channel();
    let control = ScanControl {
        progress: Some(tx),
        cancel: CancelToken::new(),
    };
    scan_with(&PipelineContext::default(), &cube_images(), &control).unwrap();
    drop(control);

    let events: Vec<_> = rx.iter().collect();
    assert_eq!(events.len(), 6);
    assert!(events.iter().all(|p| p.total == 6));
    let last = events.iter().max_by_key(|p| p.completed).unwrap();
    assert_eq!((last.completed, last.percent), (6, 100));
}

#[test]
fn background_scan_streams_progress() {
    let handle = CubeScanner::new().spawn(cube_images());
    let events: Vec<_> = handle.progress().iter().collect();
    let report = handle.join().unwrap();
    assert_eq!(events.len(), 6);
    assert_eq!(report.cube.as_str().len(), 54);
}

#[test]
fn scan_from_files_writes_output_and_artifacts() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for (face, color, _) in palette() {
        let path = dir.path().join(format!("{}.png", face));
        save_bgr(&path, &square_face(color)).unwrap();
        paths.push((face, path));
    }

    let out = dir.path().join("solver").join("CubeString.txt");
    let artifacts = dir.path().join("steps");
    let report = CubeScanner::new()
        .output(&out)
        .artifacts(&artifacts)
        .scan_files(&paths)
        .unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), report.cube.as_str());
    for face in Face::ALL {
        let name = format!("{}.png", face);
        assert!(artifacts.join("canny").join(&name).exists());
        assert!(artifacts.join("harris").join(&name).exists());
        assert!(artifacts.join("cropped").join(&name).exists());
        assert!(artifacts.join("threshold").join(face.name()).join("white.png").exists());
    }
}
