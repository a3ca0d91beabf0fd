// Filesystem storage for encrypted private keys

use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use rand::{CryptoRng, RngCore};

use crate::error::{error_codes, CryptoError, CryptoResult};

/// Prefix shared by every stored record
pub const FILENAME_PREFIX: &str = "private_key_";

/// Bytes of randomness behind each filename suffix (16 hex characters)
pub const SUFFIX_BYTES: usize = 8;

/// Default extension of stored records
pub const DEFAULT_EXTENSION: &str = "txt";

/// Stores encrypted, base64-encoded private keys as individual files under a
/// single root directory.
///
/// Filenames carry a random suffix instead of a counter, so independent
/// writers never coordinate. Files are created with create-new semantics and
/// are never overwritten or deleted by the store.
#[derive(Debug, Clone)]
pub struct SecureKeyStore {
    root: PathBuf,
    extension: String,
}

impl SecureKeyStore {
    /// Create a store rooted at `root`. The directory is not touched until
    /// [`ensure_root`](Self::ensure_root) or a write.
    pub fn new<P: AsRef<Path>>(root: P, extension: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: extension.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Create the root directory (and parents) if it does not exist yet
    pub fn ensure_root(&self) -> CryptoResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            CryptoError::storage_error(
                "create storage root",
                &self.root,
                &e.to_string(),
                error_codes::STORAGE_CREATE_FAILED,
            )
        })
    }

    /// Derive a fresh `private_key_<16 hex>.<ext>` filename
    pub fn derive_filename<R: RngCore + CryptoRng>(&self, rng: &mut R) -> CryptoResult<String> {
        let mut suffix = [0u8; SUFFIX_BYTES];
        rng.try_fill_bytes(&mut suffix)?;
        Ok(format!(
            "{}{}.{}",
            FILENAME_PREFIX,
            hex::encode(suffix),
            self.extension
        ))
    }

    /// Whether `name` has the shape of a record produced by this store
    pub fn is_record_name(&self, name: &str) -> bool {
        let Some(rest) = name.strip_prefix(FILENAME_PREFIX) else {
            return false;
        };
        let Some((suffix, extension)) = rest.split_once('.') else {
            return false;
        };
        extension == self.extension
            && suffix.len() == SUFFIX_BYTES * 2
            && suffix.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Resolve a bare filename inside the root.
    ///
    /// Names with separators, `.`/`..`, or an absolute form are rejected so
    /// the store never reads or writes outside its root.
    pub fn path_for(&self, filename: &str) -> CryptoResult<PathBuf> {
        let mut components = Path::new(filename).components();
        let bare = match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => name == OsStr::new(filename),
            _ => false,
        };

        if !bare || filename.contains(&['/', '\\'][..]) {
            return Err(CryptoError::storage_error(
                "resolve filename",
                Path::new(filename),
                "filename must be a bare name without path components",
                error_codes::STORAGE_INVALID_NAME,
            ));
        }

        Ok(self.root.join(filename))
    }

    pub fn exists(&self, filename: &str) -> CryptoResult<bool> {
        Ok(self.path_for(filename)?.is_file())
    }

    /// Write `payload` to a new file named `filename`
    ///
    /// The file is opened with create-new semantics, so an existing file of
    /// the same name is rejected with `STORAGE_FILE_EXISTS` rather than
    /// overwritten. If writing fails after the file was created the partial
    /// file is removed. On Unix the file is readable by its owner only.
    pub fn write(&self, filename: &str, payload: &str) -> CryptoResult<PathBuf> {
        let path = self.path_for(filename)?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(&path).map_err(|e| {
            let error_code = if e.kind() == ErrorKind::AlreadyExists {
                error_codes::STORAGE_FILE_EXISTS
            } else {
                error_codes::STORAGE_CREATE_FAILED
            };
            CryptoError::storage_error("create record", &path, &e.to_string(), error_code)
        })?;

        persist(&path, file, payload)?;

        log::debug!("Stored record {}", path.display());
        Ok(path)
    }

    /// Read back the payload stored under `filename`
    ///
    /// Only I/O failures are storage errors. A record whose bytes are not
    /// UTF-8 text cannot be base64 and is reported as `INVALID_BASE64`.
    pub fn read(&self, filename: &str) -> CryptoResult<String> {
        let path = self.path_for(filename)?;
        let bytes = fs::read(&path).map_err(|e| {
            CryptoError::storage_error(
                "read record",
                &path,
                &e.to_string(),
                error_codes::STORAGE_READ_FAILED,
            )
        })?;

        String::from_utf8(bytes).map_err(|e| {
            CryptoError::format_error(
                "decode record",
                &format!("{} is not base64 text: {}", path.display(), e.utf8_error()),
                error_codes::INVALID_BASE64,
            )
        })
    }

    /// List the filenames of all records under the root, sorted
    ///
    /// Files that do not match the record naming scheme are ignored. A
    /// missing root directory yields an empty list.
    pub fn list_records(&self) -> CryptoResult<Vec<String>> {
        let list_failed = |e: std::io::Error| {
            CryptoError::storage_error(
                "list records",
                &self.root,
                &e.to_string(),
                error_codes::STORAGE_LIST_FAILED,
            )
        };

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(list_failed(e)),
        };

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(list_failed)?;
            if !entry.file_type().map_err(list_failed)?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.is_record_name(name) {
                    records.push(name.to_string());
                }
            }
        }

        records.sort();
        Ok(records)
    }
}

/// A writer whose contents can be forced to durable storage
pub(super) trait SyncWrite: Write {
    fn sync(&mut self) -> io::Result<()>;
}

impl SyncWrite for fs::File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Write and sync `payload` through `writer`, which was opened on `path`.
///
/// On failure the writer is closed and the file at `path` is removed, so no
/// partial record survives.
pub(super) fn persist<W: SyncWrite>(path: &Path, mut writer: W, payload: &str) -> CryptoResult<()> {
    let written = writer
        .write_all(payload.as_bytes())
        .and_then(|()| writer.sync());
    drop(writer);

    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_file(path) {
            log::warn!(
                "Failed to remove partially written record {}: {}",
                path.display(),
                cleanup
            );
        }
        return Err(CryptoError::storage_error(
            "write record",
            path,
            &e.to_string(),
            error_codes::STORAGE_WRITE_FAILED,
        ));
    }
    Ok(())
}
