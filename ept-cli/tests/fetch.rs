use std::io::Write;

use assert_cmd::Command;

/// Writes a minimal, valid single-chunk EPT dataset rooted at `dir`: an
/// `entwine.json` with `hierarchyStep = 0`, one hierarchy chunk, and one
/// LAS tile with a couple of points.
fn write_dataset(dir: &std::path::Path) {
    std::fs::create_dir(dir.join("h")).unwrap();
    std::fs::File::create(dir.join("entwine.json"))
        .unwrap()
        .write_all(br#"{"bounds":[0,0,0,8,8,8],"hierarchyStep":0}"#)
        .unwrap();
    std::fs::File::create(dir.join("h/0-0-0-0.json"))
        .unwrap()
        .write_all(br#"{"0-0-0-0": 2}"#)
        .unwrap();

    let header = las::Builder::default().into_header().unwrap();
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = las::Writer::new(&mut cursor, header).unwrap();
        for (x, y, z) in [(1.0, 1.0, 1.0), (6.0, 6.0, 6.0)] {
            writer
                .write_point(las::Point {
                    x,
                    y,
                    z,
                    ..Default::default()
                })
                .unwrap();
        }
    }
    std::fs::File::create(dir.join("0-0-0-0.laz"))
        .unwrap()
        .write_all(&cursor.into_inner())
        .unwrap();
}

#[test]
fn fetch_writes_laz_output() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let output = dir.path().join("out.laz");

    let mut cmd = Command::cargo_bin("ept").unwrap();
    cmd.args([
        "fetch",
        "--url",
        dir.path().to_str().unwrap(),
        "--bounds",
        "0,0,0,8,8,8",
        "-o",
        output.to_str().unwrap(),
    ]);

    cmd.assert().success();
    assert!(output.exists());
    assert!(std::fs::metadata(&output).unwrap().len() > 0);
}

#[test]
fn fetch_blocking_flag_also_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let output = dir.path().join("out.laz");

    let mut cmd = Command::cargo_bin("ept").unwrap();
    cmd.args([
        "fetch",
        "--blocking",
        "--url",
        dir.path().to_str().unwrap(),
        "--bounds",
        "0,0,0,8,8,8",
        "-o",
        output.to_str().unwrap(),
    ]);

    cmd.assert().success();
    assert!(output.exists());
}

#[test]
fn fetch_rejects_malformed_bounds() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path());
    let output = dir.path().join("out.laz");

    let mut cmd = Command::cargo_bin("ept").unwrap();
    cmd.args([
        "fetch",
        "--url",
        dir.path().to_str().unwrap(),
        "--bounds",
        "0,0,8,8,8",
        "-o",
        output.to_str().unwrap(),
    ]);

    cmd.assert().failure();
}
