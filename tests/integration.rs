//! Integration tests for the pic2pdf library

use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use pic2pdf::pdf::{assemble_pdf, count_pages, extract_metadata, AssemblyRequest};
use pic2pdf::session::{AcceptSuggested, Session, Status};
use pic2pdf::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test helper: write a solid-colour RGB image, format chosen by extension
fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let image = RgbImage::from_pixel(width, height, Rgb([40, 120, 200]));
    DynamicImage::ImageRgb8(image)
        .save(&path)
        .expect(&format!("Failed to write fixture {}", name));
    path
}

/// Test helper: write a half-transparent RGBA image
fn write_translucent_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 100]))
        .save(&path)
        .expect("Failed to write translucent fixture");
    path
}

/// Entries of a directory, for checking that nothing was left behind
fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.expect("Failed to read entry").path())
        .collect();
    entries.sort();
    entries
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < 0.01,
        "{}: expected {:.3}, got {:.3}",
        what,
        expected,
        actual
    );
}

#[test]
fn test_two_image_scenario() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let img_a = write_image(images.path(), "a.png", 800, 600);
    let img_b = write_image(images.path(), "b.png", 400, 400);

    let mut session = Session::new(output.path());
    session.drop_files([img_a, img_b]);

    let status = session
        .generate("test", &mut AcceptSuggested)
        .expect("Dialog should accept");

    let expected_path = output.path().join("test.pdf");
    match &status {
        Status::Generated(report) => {
            assert_eq!(report.output_path, expected_path);
            assert_eq!(report.image_count, 2);
        }
        other => panic!("Expected success, got: {}", other),
    }
    assert!(expected_path.exists(), "PDF was not created");

    let metadata = extract_metadata(&expected_path).expect("Failed to read back PDF");
    assert_eq!(metadata.page_count, 2);
    assert_eq!(metadata.images.len(), 2);

    assert_eq!(metadata.images[0].page_number, 1);
    assert_close(metadata.images[0].width.mm(), 190.0, "page 1 width");
    assert_close(metadata.images[0].height.mm(), 142.5, "page 1 height");

    assert_eq!(metadata.images[1].page_number, 2);
    assert_close(metadata.images[1].width.mm(), 190.0, "page 2 width");
    assert_close(metadata.images[1].height.mm(), 190.0, "page 2 height");

    println!("✓ {}", status);
}

#[test]
fn test_every_accepted_format_in_order() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    // Distinct aspect ratios so page order can be checked by height
    let inputs = vec![
        (write_image(images.path(), "one.png", 100, 50), 95.0),
        (write_image(images.path(), "two.JPG", 200, 200), 190.0),
        (write_image(images.path(), "three.jpeg", 100, 200), 380.0),
        (write_image(images.path(), "four.bmp", 50, 10), 38.0),
        (write_image(images.path(), "five.gif", 40, 30), 142.5),
        (write_translucent_png(images.path(), "six.png", 10, 20), 380.0),
    ];

    let request = AssemblyRequest::new(
        inputs.iter().map(|(path, _)| path.clone()).collect(),
        output.path().join("formats"),
    );
    let report = assemble_pdf(&request).expect("Failed to assemble PDF");

    assert_eq!(report.image_count, inputs.len());
    assert_eq!(report.output_path, output.path().join("formats.pdf"));

    let metadata = extract_metadata(&report.output_path).expect("Failed to read back PDF");
    assert_eq!(metadata.page_count, inputs.len());

    for (page, (_, expected_height)) in metadata.images.iter().zip(&inputs) {
        assert_close(
            page.height.mm(),
            *expected_height,
            &format!("page {} height", page.page_number),
        );
    }
}

#[test]
fn test_tall_image_is_not_clamped() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let tall = write_image(images.path(), "tall.png", 10, 100);

    let request = AssemblyRequest::new(vec![tall], output.path().join("tall.pdf"));
    let report = assemble_pdf(&request).expect("Tall images should still assemble");

    let metadata = extract_metadata(&report.output_path).expect("Failed to read back PDF");
    assert_close(metadata.images[0].height.mm(), 1900.0, "tall image height");
}

#[test]
fn test_empty_collection_fails_without_output() {
    let output = TempDir::new().expect("Failed to create temp directory");
    let mut session = Session::new(output.path());

    let status = session
        .generate("test", &mut AcceptSuggested)
        .expect("Should report an error, not cancel");

    assert!(matches!(status, Status::Failed(Error::NoImages)));
    assert!(status.to_string().contains("no images"));
    assert!(dir_entries(output.path()).is_empty(), "No file should be written");
}

#[test]
fn test_blank_filename_fails_without_output() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let mut session = Session::new(output.path());
    session.drop_files([write_image(images.path(), "a.png", 10, 10)]);

    let status = session
        .generate("   ", &mut AcceptSuggested)
        .expect("Should report an error, not cancel");

    assert!(matches!(status, Status::Failed(Error::NoFilename)));
    assert!(status.to_string().contains("no filename"));
    assert!(dir_entries(output.path()).is_empty(), "No file should be written");
}

#[test]
fn test_pdf_suffix_added_once() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let image = write_image(images.path(), "a.png", 30, 20);

    let plain = assemble_pdf(&AssemblyRequest::new(vec![image.clone()], output.path().join("plain")))
        .expect("Failed to assemble");
    assert_eq!(plain.output_path, output.path().join("plain.pdf"));

    let upper = assemble_pdf(&AssemblyRequest::new(vec![image], output.path().join("Upper.PDF")))
        .expect("Failed to assemble");
    assert_eq!(upper.output_path, output.path().join("Upper.PDF"));

    assert_eq!(
        dir_entries(output.path()),
        vec![output.path().join("Upper.PDF"), output.path().join("plain.pdf")]
    );
}

#[test]
fn test_corrupt_image_aborts_whole_run() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let good = write_image(images.path(), "good.png", 20, 10);
    let bad = images.path().join("bad.jpg");
    std::fs::write(&bad, b"not really a jpeg").expect("Failed to write corrupt file");
    let later = write_image(images.path(), "later.bmp", 20, 10);

    let mut session = Session::new(output.path());
    session.drop_files([good, bad, later]);

    let status = session
        .generate("broken", &mut AcceptSuggested)
        .expect("Should report an error, not cancel");

    match &status {
        Status::Failed(err) => assert!(
            err.to_string().contains("bad.jpg"),
            "Error should name the failing image: {}",
            err
        ),
        other => panic!("Expected failure, got: {}", other),
    }

    // No partial output and no temporary leftovers
    assert!(dir_entries(output.path()).is_empty());
    // The collection survives so the user can fix things and retry
    assert_eq!(session.collection().len(), 3);
}

#[test]
fn test_missing_image_aborts_whole_run() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let good = write_image(images.path(), "good.png", 20, 10);

    let request = AssemblyRequest::new(
        vec![good, images.path().join("vanished.png")],
        output.path().join("missing"),
    );

    let result = assemble_pdf(&request);
    assert!(matches!(result, Err(Error::FileNotFound(_))));
    assert!(dir_entries(output.path()).is_empty());
}

#[test]
fn test_missing_unsupported_file_is_ignored() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let good = write_image(images.path(), "good.png", 20, 10);

    // notes.txt does not exist, but the extension filter drops it first
    let mut session = Session::new(output.path());
    let status = session.drop_files([images.path().join("notes.txt"), good]);
    assert!(matches!(status, Status::Added { added: 1, total: 1 }));

    let status = session
        .generate("ignored", &mut AcceptSuggested)
        .expect("Dialog should accept");
    assert!(!status.is_error(), "Unexpected failure: {}", status);
    assert_eq!(count_pages(&output.path().join("ignored.pdf")).expect("Failed to count pages"), 1);
}

#[test]
fn test_missing_accepted_image_reported_by_assembly() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let mut session = Session::new(output.path());
    session.drop_files([images.path().join("gone.png")]);

    let status = session
        .generate("gone", &mut AcceptSuggested)
        .expect("Should report an error, not cancel");
    assert!(matches!(status, Status::Failed(Error::FileNotFound(_))));
    assert!(status.to_string().contains("gone.png"));
    assert!(dir_entries(output.path()).is_empty());
}

#[test]
fn test_unwritable_destination_reports_error() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let image = write_image(images.path(), "a.png", 20, 10);

    let request = AssemblyRequest::new(
        vec![image],
        output.path().join("no-such-dir").join("out.pdf"),
    );

    let result = assemble_pdf(&request);
    assert!(matches!(result, Err(Error::Io(_))), "Expected IO error, got {:?}", result);
    assert!(dir_entries(output.path()).is_empty());
}

#[test]
fn test_cancelled_dialog_writes_nothing() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let mut session = Session::new(output.path());
    session.drop_files([write_image(images.path(), "a.png", 10, 10)]);

    let result = session.generate("test", &mut |_: &Path| None);

    assert!(result.is_none(), "Cancel should produce no status");
    assert!(dir_entries(output.path()).is_empty());
}

#[test]
fn test_dialog_can_pick_another_path() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let chosen = output.path().join("elsewhere");

    let mut session = Session::new(output.path());
    session.drop_files([write_image(images.path(), "a.png", 10, 10)]);

    let status = session
        .generate("suggested", &mut |_: &Path| Some(chosen.clone()))
        .expect("Dialog should accept");

    assert!(!status.is_error(), "Unexpected failure: {}", status);
    assert!(output.path().join("elsewhere.pdf").exists());
    assert!(!output.path().join("suggested.pdf").exists());
}

#[test]
fn test_rerun_keeps_collection_and_layout() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let mut session = Session::new(output.path());
    session.drop_files([
        write_image(images.path(), "a.png", 300, 100),
        write_image(images.path(), "b.jpg", 100, 300),
    ]);

    let first = session.generate("run", &mut AcceptSuggested).expect("Dialog should accept");
    assert!(!first.is_error(), "Unexpected failure: {}", first);
    assert_eq!(session.collection().len(), 2, "Success must not clear the collection");
    let before = extract_metadata(&output.path().join("run.pdf")).expect("Failed to read back PDF");

    let second = session.generate("run", &mut AcceptSuggested).expect("Dialog should accept");
    assert!(!second.is_error(), "Unexpected failure: {}", second);
    let after = extract_metadata(&output.path().join("run.pdf")).expect("Failed to read back PDF");

    assert_eq!(before.page_count, after.page_count);
    assert_eq!(before.images, after.images);
    assert_eq!(dir_entries(output.path()), vec![output.path().join("run.pdf")]);
}

#[test]
fn test_clear_then_generate_fails() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");

    let mut session = Session::new(output.path());
    session.drop_files([write_image(images.path(), "a.png", 10, 10)]);
    session.clear();

    let status = session.generate("test", &mut AcceptSuggested).expect("Should report an error");
    assert!(matches!(status, Status::Failed(Error::NoImages)));
}

#[test]
fn test_document_info() {
    let images = TempDir::new().expect("Failed to create temp directory");
    let output = TempDir::new().expect("Failed to create temp directory");
    let image = write_image(images.path(), "a.png", 10, 10);

    let report = assemble_pdf(&AssemblyRequest::new(vec![image], output.path().join("实验X00XYZ")))
        .expect("Failed to assemble");

    let metadata = extract_metadata(&report.output_path).expect("Failed to read back PDF");
    assert_eq!(metadata.title.as_deref(), Some("实验X00XYZ"));
    assert_eq!(metadata.producer.as_deref(), Some("pic2pdf"));
    assert_eq!(count_pages(&report.output_path).expect("Failed to count pages"), 1);
}
