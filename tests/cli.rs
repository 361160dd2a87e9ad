mod common;

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use common::{gzip, text, zip_archive};

fn rgzip(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rgzip"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run rgzip")
}

#[test]
fn compress_and_restore_in_place() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let data = text(40_000);
    fs::write(dir.path().join("notes.txt"), &data)?;

    let out = rgzip(dir.path(), &["notes.txt"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(!dir.path().join("notes.txt").exists());
    assert!(dir.path().join("notes.txt.gz").exists());

    let out = rgzip(dir.path(), &["-d", "notes.txt.gz"]);
    assert_eq!(out.status.code(), Some(0), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(dir.path().join("notes.txt"))?, data);
    assert!(!dir.path().join("notes.txt.gz").exists());
    Ok(())
}

#[test]
fn keep_leaves_the_source() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("a"), b"keep me")?;

    let out = rgzip(dir.path(), &["-k", "a"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("a.gz").exists());

    // Existing output is not overwritten without -f.
    let out = rgzip(dir.path(), &["-k", "a"]);
    assert_eq!(out.status.code(), Some(1));
    let out = rgzip(dir.path(), &["-k", "-f", "a"]);
    assert_eq!(out.status.code(), Some(0));
    Ok(())
}

#[test]
fn in_place_zip_with_two_entries_fails_cleanly() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let archive = zip_archive(&[("one.txt", &text(2000)), ("two.txt", b"two")]);
    fs::write(dir.path().join("pair.zip"), &archive)?;

    let out = rgzip(dir.path(), &["-d", "-S", ".zip", "pair.zip"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("more than one entry"));
    assert_eq!(fs::read(dir.path().join("pair.zip"))?, archive);
    assert!(!dir.path().join("pair").exists());
    Ok(())
}

#[test]
fn stdout_extracts_first_entry_with_warning() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let first = text(2000);
    fs::write(
        dir.path().join("pair.zip"),
        zip_archive(&[("one.txt", &first), ("two.txt", b"two")]),
    )?;

    let out = rgzip(dir.path(), &["-dc", "pair.zip"]);
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(out.stdout, first);
    assert!(dir.path().join("pair.zip").exists());

    let out = rgzip(dir.path(), &["-dcq", "pair.zip"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stderr.is_empty());
    Ok(())
}

#[test]
fn test_mode_reports_corruption() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut packed = gzip(&text(10_000));
    let at = packed.len() - 1;
    packed[at] ^= 0x10;
    fs::write(dir.path().join("bad.gz"), &packed)?;
    fs::write(dir.path().join("good.gz"), gzip(b"fine"))?;

    let out = rgzip(dir.path(), &["-t", "good.gz"]);
    assert_eq!(out.status.code(), Some(0));

    let out = rgzip(dir.path(), &["-t", "good.gz", "bad.gz"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("length error"));
    assert!(dir.path().join("bad.gz").exists());
    Ok(())
}

#[test]
fn unknown_suffix_is_skipped() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("data.bin"), gzip(b"x"))?;

    let out = rgzip(dir.path(), &["-d", "data.bin"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown suffix"));
    assert!(dir.path().join("data.bin").exists());
    Ok(())
}

#[test]
fn filters_stdin_to_stdout() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let data = text(70_000);

    let mut child = Command::new(env!("CARGO_BIN_EXE_rgzip"))
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    let mut stdin = child.stdin.take().expect("stdin");
    let input = data.clone();
    let writer = std::thread::spawn(move || stdin.write_all(&input));
    let packed = child.wait_with_output()?;
    writer.join().expect("writer thread")?;
    assert_eq!(packed.status.code(), Some(0));

    let mut child = Command::new(env!("CARGO_BIN_EXE_rgzip"))
        .arg("-d")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;
    let mut stdin = child.stdin.take().expect("stdin");
    let writer = std::thread::spawn(move || stdin.write_all(&packed.stdout));
    let out = child.wait_with_output()?;
    writer.join().expect("writer thread")?;
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, data);
    Ok(())
}

#[test]
fn empty_suffix_never_touches_the_source() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let data = text(10_000);
    fs::write(dir.path().join("f.txt"), &data)?;

    let out = rgzip(dir.path(), &["-f", "-S", "", "f.txt"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid suffix"));
    assert_eq!(fs::read(dir.path().join("f.txt"))?, data);
    assert_eq!(fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn quiet_still_reports_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut packed = gzip(&text(4000));
    let at = packed.len() - 8;
    packed[at] ^= 0xff;
    fs::write(dir.path().join("bad.gz"), &packed)?;

    let out = rgzip(dir.path(), &["-q", "-t", "bad.gz"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("crc error"));
    Ok(())
}
