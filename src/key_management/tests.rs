use super::*;
use crate::error::{error_codes, CryptoError};
use crate::random::{OsRandom, RandomProvider};
use std::collections::HashSet;
use tempfile::tempdir;

#[test]
fn test_derive_filename_shape() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);

    let filename = store.derive_filename(&mut OsRandom.rng()).unwrap();
    assert!(filename.starts_with(FILENAME_PREFIX));
    assert!(filename.ends_with(".txt"));
    assert_eq!(filename.len(), FILENAME_PREFIX.len() + SUFFIX_BYTES * 2 + ".txt".len());
    assert!(store.is_record_name(&filename));
}

#[test]
fn test_derive_filename_unique() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);
    let mut rng = OsRandom.rng();

    let names: HashSet<String> = (0..1000)
        .map(|_| store.derive_filename(&mut rng).unwrap())
        .collect();
    assert_eq!(names.len(), 1000);
}

#[test]
fn test_write_then_read() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);

    let path = store.write("private_key_0011223344556677.txt", "cGF5bG9hZA==").unwrap();
    assert_eq!(path, dir.path().join("private_key_0011223344556677.txt"));
    assert!(store.exists("private_key_0011223344556677.txt").unwrap());
    assert_eq!(
        store.read("private_key_0011223344556677.txt").unwrap(),
        "cGF5bG9hZA=="
    );
}

#[test]
fn test_write_never_overwrites() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);
    let name = "private_key_aaaaaaaaaaaaaaaa.txt";

    store.write(name, "first").unwrap();
    let err = store.write(name, "second").unwrap_err();

    assert_eq!(err.error_code(), error_codes::STORAGE_FILE_EXISTS);
    assert_eq!(store.read(name).unwrap(), "first");
}

#[test]
fn test_write_into_missing_root_fails() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path().join("missing"), DEFAULT_EXTENSION);

    let err = store.write("private_key_0000000000000000.txt", "x").unwrap_err();
    assert!(matches!(err, CryptoError::StorageError { .. }));
    assert_eq!(err.error_code(), error_codes::STORAGE_CREATE_FAILED);

    store.ensure_root().unwrap();
    assert!(store.write("private_key_0000000000000000.txt", "x").is_ok());
}

#[test]
fn test_read_missing_record() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);

    let err = store.read("private_key_ffffffffffffffff.txt").unwrap_err();
    assert_eq!(err.error_code(), error_codes::STORAGE_READ_FAILED);
}

#[test]
fn test_path_escape_rejected() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);

    for name in ["", ".", "..", "../escape.txt", "nested/file.txt", "/etc/passwd", "a\\b"] {
        let err = store.path_for(name).unwrap_err();
        assert_eq!(err.error_code(), error_codes::STORAGE_INVALID_NAME, "{:?}", name);
        assert!(store.write(name, "x").is_err());
    }
}

#[test]
fn test_is_record_name() {
    let store = SecureKeyStore::new("/unused", "txt");

    assert!(store.is_record_name("private_key_0123456789abcdef.txt"));
    assert!(!store.is_record_name("private_key_0123456789ABCDEF.txt"));
    assert!(!store.is_record_name("private_key_0123456789abcde.txt"));
    assert!(!store.is_record_name("private_key_0123456789abcdef.pem"));
    assert!(!store.is_record_name("public_key_0123456789abcdef.txt"));
    assert!(!store.is_record_name("notes.txt"));
}

#[test]
fn test_list_records() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);

    store.write("private_key_bbbbbbbbbbbbbbbb.txt", "b").unwrap();
    store.write("private_key_aaaaaaaaaaaaaaaa.txt", "a").unwrap();
    std::fs::write(dir.path().join("unrelated.txt"), "ignored").unwrap();
    std::fs::create_dir(dir.path().join("private_key_cccccccccccccccc.txt")).unwrap();

    assert_eq!(
        store.list_records().unwrap(),
        vec![
            "private_key_aaaaaaaaaaaaaaaa.txt".to_string(),
            "private_key_bbbbbbbbbbbbbbbb.txt".to_string(),
        ]
    );

    let missing = SecureKeyStore::new(dir.path().join("nope"), DEFAULT_EXTENSION);
    assert!(missing.list_records().unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn test_record_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);
    let path = store.write("private_key_1234567890abcdef.txt", "secret").unwrap();

    let mode = std::fs::metadata(path).unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0);
}

/// Writer that accepts a few bytes and then fails, like a full disk
struct FailingWriter {
    accepted: usize,
}

impl std::io::Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.accepted >= 4 {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"));
        }
        let n = buf.len().min(4 - self.accepted);
        self.accepted += n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl storage::SyncWrite for FailingWriter {
    fn sync(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_failed_write_removes_partial_record() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("private_key_0f0f0f0f0f0f0f0f.txt");
    std::fs::write(&path, "part").unwrap();

    let err = storage::persist(&path, FailingWriter { accepted: 0 }, "cGF5bG9hZA==").unwrap_err();

    assert!(matches!(err, CryptoError::StorageError { .. }));
    assert_eq!(err.error_code(), error_codes::STORAGE_WRITE_FAILED);
    assert!(!path.exists());
}

#[test]
fn test_non_utf8_record_is_format_error() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), DEFAULT_EXTENSION);
    let name = "private_key_ffffffffffffffff.txt";
    std::fs::write(dir.path().join(name), [0xff, 0xfe, b'A', b'A']).unwrap();

    let err = store.read(name).unwrap_err();
    assert!(matches!(err, CryptoError::FormatError { .. }));
    assert_eq!(err.error_code(), error_codes::INVALID_BASE64);
}

#[test]
fn test_store_accessors() {
    let dir = tempdir().unwrap();
    let store = SecureKeyStore::new(dir.path(), "bin");

    assert_eq!(store.root(), dir.path());
    assert_eq!(store.extension(), "bin");
    assert!(store.derive_filename(&mut OsRandom.rng()).unwrap().ends_with(".bin"));
}
