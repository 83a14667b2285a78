//! A region handed to code that only knows `Read + Seek` / `Write`.

use mmap_region::{FlushMode, MappedRegion, Protection};
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4b, 0x05, 0x06];
const EOCD_LEN: usize = 22;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("mmap_region_io_{}_{}", name, std::process::id()));
    p
}

/// Minimal zip "end of central directory" scan: returns the number of
/// entries recorded in the archive's directory.
fn zip_entry_count<R: Read + Seek>(mut reader: R) -> io::Result<u16> {
    let end = reader.seek(SeekFrom::End(0))?;
    if end < EOCD_LEN as u64 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "too short for a zip archive"));
    }
    reader.seek(SeekFrom::End(-(EOCD_LEN as i64)))?;
    let mut record = [0u8; EOCD_LEN];
    reader.read_exact(&mut record)?;
    if record[..4] != EOCD_SIGNATURE {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "missing end of central directory"));
    }
    Ok(u16::from_le_bytes([record[10], record[11]]))
}

#[test]
fn empty_zip_through_region() {
    let path = tmp_path("empty_zip_through_region");
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .expect("create");
    file.set_len(EOCD_LEN as u64).expect("size");

    let mut zip_data = EOCD_SIGNATURE.to_vec();
    zip_data.extend_from_slice(&[0u8; EOCD_LEN - 4]);

    let mut region =
        MappedRegion::map(&file, 0, EOCD_LEN as u64, Protection::ReadWrite).expect("map");
    {
        let mut cursor = region.cursor();
        cursor.write_all(&zip_data).expect("write archive");
        cursor.flush().expect("flush");
    }
    assert!(!region.is_dirty());

    assert_eq!(zip_entry_count(region.reader()).expect("scan"), 0);
    assert_eq!(fs::read(&path).expect("reopen"), zip_data);

    region.unmap().expect("unmap");
    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn scanner_rejects_non_archive() {
    let path = tmp_path("scanner_rejects_non_archive");
    fs::write(&path, [b'x'; 64]).expect("write");
    let file = OpenOptions::new().read(true).open(&path).expect("open");

    let region = MappedRegion::map(&file, 0, 64, Protection::ReadOnly).expect("map");
    let err = zip_entry_count(region.reader()).expect_err("not a zip");
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);

    fs::remove_file(&path).expect("cleanup");
}

#[test]
fn io_copy_out_of_region() {
    let path = tmp_path("io_copy_out_of_region");
    fs::write(&path, b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ").expect("write");
    let file = OpenOptions::new().read(true).write(true).open(&path).expect("open");

    let mut region = MappedRegion::map(&file, 10, 26, Protection::ReadWrite).expect("map");
    let mut out = Vec::new();
    io::copy(&mut region.reader(), &mut out).expect("copy");
    assert_eq!(out, b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");

    let mut lower = io::Cursor::new(b"abcdefghijklmnopqrstuvwxyz".to_vec());
    io::copy(&mut lower, &mut region.cursor()).expect("copy in");
    region.flush(FlushMode::Sync).expect("flush");
    assert_eq!(
        fs::read(&path).expect("reopen"),
        b"0123456789abcdefghijklmnopqrstuvwxyz"
    );

    fs::remove_file(&path).expect("cleanup");
}
