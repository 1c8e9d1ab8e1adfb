use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use rust_image_converter::{
    format::{Format, SaveOptions},
    image::{Color, Image},
};

fn run<S: AsRef<OsStr>>(args: &[S]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_image-converter-app"))
        .args(args)
        .output()
        .expect("failed to run converter")
}

fn sample_bmp(dir: &Path) -> PathBuf {
    let path = dir.join("sample.bmp");
    let mut image = Image::new(6, 4, Color::rgb(0, 128, 255));
    image.set_pixel(0, 0, Color::rgb(255, 0, 0));
    Format::Bmp
        .save(&path, &image, &SaveOptions::default())
        .unwrap();
    path
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn wrong_argument_count() {
    let output = run(&[Path::new("only.bmp")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Usage:"));

    let output = run(&[Path::new("a.bmp"), Path::new("b.bmp"), Path::new("c.bmp")]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn quality_out_of_range() {
    for quality in ["0", "101"] {
        let output = run(&["in.bmp", "out.jpg", "--quality", quality]);
        assert_eq!(output.status.code(), Some(1), "quality {quality}");
        assert!(stderr(&output).contains("Usage:"));
    }

    let dir = tempfile::tempdir().unwrap();
    let input = sample_bmp(dir.path());
    let jpeg = dir.path().join("out.jpg");
    let output = run(&[
        input.as_os_str(),
        jpeg.as_os_str(),
        OsStr::new("--quality"),
        OsStr::new("100"),
    ]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn help_exits_successfully() {
    let output = run(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("--quality"));
}

#[test]
fn unknown_input_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[&dir.path().join("in.xyz"), &dir.path().join("out.bmp")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Unknown input image format"));
}

#[test]
fn unknown_output_format() {
    let dir = tempfile::tempdir().unwrap();
    let input = sample_bmp(dir.path());
    let output = run(&[&input, &dir.path().join("out.xyz")]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("Unknown output image format"));
}

#[test]
fn load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&[&dir.path().join("missing.ppm"), &dir.path().join("out.bmp")]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("Loading failed"));
}

#[test]
fn save_failure() {
    let dir = tempfile::tempdir().unwrap();
    let input = sample_bmp(dir.path());
    let output = run(&[&input, &dir.path().join("missing/out.ppm")]);

    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("Saving failed"));
}

#[test]
fn converts_bmp_to_ppm() {
    let dir = tempfile::tempdir().unwrap();
    let input = sample_bmp(dir.path());
    let ppm = dir.path().join("out.ppm");
    let output = run(&[&input, &ppm]);

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Successfully converted"));
    assert_eq!(
        Format::Ppm.load(&ppm).unwrap(),
        Format::Bmp.load(&input).unwrap()
    );
}

#[test]
fn legacy_bmp_header_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = sample_bmp(dir.path());
    let legacy = dir.path().join("legacy.bmp");

    let status = Command::new(env!("CARGO_BIN_EXE_image-converter-app"))
        .arg(&input)
        .arg(&legacy)
        .arg("--legacy-bmp-header")
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(&std::fs::read(&legacy).unwrap()[50..54], &[0, 0, 0, 1]);
}
