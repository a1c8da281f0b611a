// Integration tests for the rotation pipeline - scanning real directories and
// rotating real image files, wired to the state manager the way the GUI
// workflow drives them.

use camino::{Utf8Path, Utf8PathBuf};
use image::{ImageBuffer, Rgb};
use picflip::services::{scan_images, RotationError, RotationService};
use picflip::StateManager;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
}

/// 16x16 JPEG: left half white, right half black. Big enough that the
/// corners survive JPEG compression recognizably.
fn write_test_jpeg(path: &Utf8Path) {
    let img = ImageBuffer::from_fn(16, 16, |x, _| {
        if x < 8 {
            Rgb([255u8, 255, 255])
        } else {
            Rgb([0u8, 0, 0])
        }
    });
    img.save(path).unwrap();
}

#[test]
fn test_scan_finds_jpegs_recursively() {
    let temp = TempDir::new().unwrap();
    let root = utf8_dir(&temp);

    std::fs::create_dir_all(root.join("sub/deep")).unwrap();
    write_test_jpeg(&root.join("a.jpg"));
    write_test_jpeg(&root.join("sub/b.JPG"));
    write_test_jpeg(&root.join("sub/deep/c.jpeg"));
    std::fs::write(root.join("notes.txt"), "not an image").unwrap();
    std::fs::write(root.join("sub/d.png"), "wrong extension").unwrap();

    let files = scan_images(&root).unwrap();

    assert_eq!(files.len(), 3);
    let names: Vec<_> = files.iter().filter_map(|p| p.file_name()).collect();
    assert!(names.contains(&"a.jpg"));
    assert!(names.contains(&"b.JPG"));
    assert!(names.contains(&"c.jpeg"));
}

#[test]
fn test_scan_missing_directory_errors() {
    let temp = TempDir::new().unwrap();
    let missing = utf8_dir(&temp).join("does-not-exist");

    let err = scan_images(&missing).unwrap_err();
    assert!(matches!(err, RotationError::InputDirMissing(_)));
}

#[test]
fn test_end_to_end_rotation_preserves_names_and_flips_pixels() {
    let temp = TempDir::new().unwrap();
    let root = utf8_dir(&temp);
    let input = root.join("input");
    std::fs::create_dir_all(&input).unwrap();

    for name in ["one.jpg", "two.jpg", "three.jpg"] {
        write_test_jpeg(&input.join(name));
    }

    let files = scan_images(&input).unwrap();
    assert_eq!(files.len(), 3);

    let output = root.join("output");
    assert!(!output.exists());

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let service = RotationService::new(0); // one worker per processor
    let summary = service
        .rotate_batch(&files, &output, cancel_rx, |_| {})
        .unwrap();

    assert_eq!(summary.rotated, 3);
    assert_eq!(summary.failed, 0);

    // One output per input, same file names
    for name in ["one.jpg", "two.jpg", "three.jpg"] {
        let rotated_path = output.join(name);
        assert!(rotated_path.exists(), "missing output {}", name);

        // After 180 degrees the white half is on the right
        let rotated = image::open(&rotated_path).unwrap().to_rgb8();
        assert!(rotated.get_pixel(0, 0).0[0] < 50, "left should be dark");
        assert!(rotated.get_pixel(15, 15).0[0] > 200, "right should be light");
    }
}

#[test]
fn test_cancellation_mid_batch_stops_remaining_files() {
    let temp = TempDir::new().unwrap();
    let root = utf8_dir(&temp);
    let input = root.join("input");
    std::fs::create_dir_all(&input).unwrap();

    let mut files = Vec::new();
    for i in 0..6 {
        let path = input.join(format!("pic{}.jpg", i));
        write_test_jpeg(&path);
        files.push(path);
    }

    let output = root.join("output");
    let (cancel_tx, cancel_rx) = watch::channel(false);

    // Single worker so items run sequentially; cancel after the first one
    let service = RotationService::new(1);
    let err = service
        .rotate_batch(&files, &output, cancel_rx, |_| {
            let _ = cancel_tx.send(true);
        })
        .unwrap_err();

    assert!(matches!(err, RotationError::Cancelled));

    let written = std::fs::read_dir(&output).unwrap().count();
    assert!(
        written < files.len(),
        "cancellation should stop the batch early ({} written)",
        written
    );
}

#[test]
fn test_workflow_wiring_updates_state_per_file() {
    let temp = TempDir::new().unwrap();
    let root = utf8_dir(&temp);
    let input = root.join("input");
    std::fs::create_dir_all(&input).unwrap();

    for name in ["a.jpg", "b.jpg"] {
        write_test_jpeg(&input.join(name));
    }
    // One file that fails to decode
    std::fs::write(input.join("broken.jpg"), b"garbage").unwrap();

    let state = Arc::new(StateManager::new());
    let files = scan_images(&input).unwrap();
    state.start_rotation(files.len());

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let service = RotationService::new(2);
    let state_for_items = Arc::clone(&state);
    let summary = service
        .rotate_batch(&files, &root.join("output"), cancel_rx, |outcome| {
            state_for_items.add_file_result(outcome.file_name, outcome.ok, outcome.message);
        })
        .unwrap();
    state.finish_rotation(false);

    assert_eq!(summary.rotated, 2);
    assert_eq!(summary.failed, 1);

    let snapshot = state.snapshot();
    assert!(!snapshot.is_rotating);
    assert_eq!(snapshot.progress, 3);
    assert_eq!(snapshot.rotated_files.len(), 2);
    assert_eq!(snapshot.failed_files.len(), 1);
    assert_eq!(snapshot.status_message, "Done! 2 rotated, 1 failed");
}

#[tokio::test]
async fn test_workflow_from_blocking_task() {
    let temp = TempDir::new().unwrap();
    let root = utf8_dir(&temp);
    let input = root.join("input");
    std::fs::create_dir_all(&input).unwrap();
    write_test_jpeg(&input.join("solo.jpg"));

    let output = root.join("output");
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    // The scan is blocking walkdir I/O, so the workflow runs it off the
    // async worker threads too
    let scan_dir = input.clone();
    let files = tokio::task::spawn_blocking(move || scan_images(&scan_dir))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(files.len(), 1);

    let output_clone = output.clone();
    let summary = tokio::task::spawn_blocking(move || {
        let service = RotationService::new(2);
        service.rotate_batch(&files, &output_clone, cancel_rx, |_| {})
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(summary.rotated, 1);
    assert!(output.join("solo.jpg").exists());
}
