//! Named byte resources and the providers that open them
//!
//! Parsers never touch paths directly. A [`ByteResource`] pairs a location
//! with the [`StorageAccess`] provider that understands it; the host decides
//! whether that is the local file system, an archive, or memory.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use hashbrown::HashMap;

use crate::error::StorageError;

/// Largest resource [`ByteResource::read_all`] will load into memory
pub const MAX_RESOURCE_BYTES: u64 = 64 * 1024 * 1024;

/// Readable and seekable stream handed out by a provider
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Storage provider collaborator
pub trait StorageAccess: Send + Sync + fmt::Debug {
    /// Identity of this provider; two resources are the same only if their
    /// providers share an id.
    fn id(&self) -> &str;

    fn open_read(&self, location: &str) -> Result<Box<dyn ReadSeek>, StorageError>;

    fn open_write(&self, location: &str) -> Result<Box<dyn Write + Send>, StorageError>;

    fn exists(&self, location: &str) -> bool;

    fn size(&self, location: &str) -> Result<u64, StorageError>;

    fn last_write_time(&self, location: &str) -> Result<DateTime<Utc>, StorageError>;
}

// =============================================================================
// ByteResource
// =============================================================================

/// Location plus the provider that can open it
#[derive(Clone)]
pub struct ByteResource {
    location: String,
    provider: Arc<dyn StorageAccess>,
}

impl ByteResource {
    pub fn new(location: impl Into<String>, provider: Arc<dyn StorageAccess>) -> Self {
        Self {
            location: location.into(),
            provider,
        }
    }

    /// Resource on the local file system
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new(
            path.as_ref().to_string_lossy().into_owned(),
            Arc::new(FileSystemStorage),
        )
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn provider(&self) -> &Arc<dyn StorageAccess> {
        &self.provider
    }

    pub fn exists(&self) -> bool {
        self.provider.exists(&self.location)
    }

    pub fn size(&self) -> Result<u64, StorageError> {
        self.provider.size(&self.location)
    }

    pub fn last_write_time(&self) -> Result<DateTime<Utc>, StorageError> {
        self.provider.last_write_time(&self.location)
    }

    pub fn open_read(&self) -> Result<Box<dyn ReadSeek>, StorageError> {
        self.provider.open_read(&self.location)
    }

    pub fn open_write(&self) -> Result<Box<dyn Write + Send>, StorageError> {
        self.provider.open_write(&self.location)
    }

    /// Read the whole resource, refusing anything over [`MAX_RESOURCE_BYTES`]
    pub fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        let mut bytes = Vec::new();
        let mut reader = self.open_read()?.take(MAX_RESOURCE_BYTES + 1);
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| StorageError::io(&self.location, e))?;
        if bytes.len() as u64 > MAX_RESOURCE_BYTES {
            return Err(StorageError::io(
                &self.location,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("larger than {MAX_RESOURCE_BYTES} bytes"),
                ),
            ));
        }
        Ok(bytes)
    }

    /// Read up to `count` leading bytes; shorter resources return fewer
    pub fn read_prefix(&self, count: usize) -> Result<Vec<u8>, StorageError> {
        let mut bytes = Vec::with_capacity(count);
        self.open_read()?
            .take(count as u64)
            .read_to_end(&mut bytes)
            .map_err(|e| StorageError::io(&self.location, e))?;
        Ok(bytes)
    }

    /// Extension of the location, without the dot
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        let dot = name.rfind('.')?;
        (dot > 0).then(|| &name[dot + 1..])
    }

    /// Sibling resource with the extension replaced (or added)
    pub fn with_extension(&self, extension: &str) -> ByteResource {
        let name_start = self.location.len() - self.file_name().len();
        let stem_end = match self.extension() {
            Some(ext) => self.location.len() - ext.len() - 1,
            None => self.location.len(),
        };
        let location = format!(
            "{}.{}",
            &self.location[..stem_end.max(name_start)],
            extension
        );
        ByteResource::new(location, Arc::clone(&self.provider))
    }

    fn file_name(&self) -> &str {
        self.location
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.location)
    }
}

impl PartialEq for ByteResource {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location && self.provider.id() == other.provider.id()
    }
}

impl Eq for ByteResource {}

impl Hash for ByteResource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.hash(state);
        self.provider.id().hash(state);
    }
}

impl fmt::Debug for ByteResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteResource")
            .field("location", &self.location)
            .field("provider", &self.provider.id())
            .finish()
    }
}

impl fmt::Display for ByteResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

// =============================================================================
// Providers
// =============================================================================

/// Provider backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSystemStorage;

impl StorageAccess for FileSystemStorage {
    fn id(&self) -> &str {
        "filesystem"
    }

    fn open_read(&self, location: &str) -> Result<Box<dyn ReadSeek>, StorageError> {
        let file = fs::File::open(location).map_err(|e| StorageError::io(location, e))?;
        Ok(Box::new(io::BufReader::new(file)))
    }

    fn open_write(&self, location: &str) -> Result<Box<dyn Write + Send>, StorageError> {
        let file = fs::File::create(location).map_err(|e| StorageError::io(location, e))?;
        Ok(Box::new(io::BufWriter::new(file)))
    }

    fn exists(&self, location: &str) -> bool {
        Path::new(location).is_file()
    }

    fn size(&self, location: &str) -> Result<u64, StorageError> {
        fs::metadata(location)
            .map(|m| m.len())
            .map_err(|e| StorageError::io(location, e))
    }

    fn last_write_time(&self, location: &str) -> Result<DateTime<Utc>, StorageError> {
        fs::metadata(location)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .map_err(|e| StorageError::io(location, e))
    }
}

type MemoryFiles = Arc<RwLock<HashMap<String, MemoryFile>>>;

#[derive(Debug, Clone)]
struct MemoryFile {
    bytes: Arc<Vec<u8>>,
    modified: DateTime<Utc>,
}

static NEXT_MEMORY_STORAGE: AtomicU64 = AtomicU64::new(1);

/// In-memory provider; each instance is its own namespace
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    id: String,
    files: MemoryFiles,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let serial = NEXT_MEMORY_STORAGE.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("memory-{serial}"),
            files: Arc::default(),
        }
    }

    /// Store `bytes` at `location`, replacing any previous content
    pub fn insert(&self, location: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let file = MemoryFile {
            bytes: Arc::new(bytes.into()),
            modified: Utc::now(),
        };
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location.into(), file);
    }

    pub fn remove(&self, location: &str) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(location)
            .is_some()
    }

    /// Handle to `location` in this storage
    pub fn resource(self: &Arc<Self>, location: impl Into<String>) -> ByteResource {
        ByteResource::new(location, Arc::clone(self) as Arc<dyn StorageAccess>)
    }

    fn get(&self, location: &str) -> Result<MemoryFile, StorageError> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                location: location.to_string(),
            })
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageAccess for MemoryStorage {
    fn id(&self) -> &str {
        &self.id
    }

    fn open_read(&self, location: &str) -> Result<Box<dyn ReadSeek>, StorageError> {
        let file = self.get(location)?;
        Ok(Box::new(Cursor::new(SharedBytes(file.bytes))))
    }

    fn open_write(&self, location: &str) -> Result<Box<dyn Write + Send>, StorageError> {
        Ok(Box::new(MemoryWriter {
            location: location.to_string(),
            buffer: Vec::new(),
            files: Arc::clone(&self.files),
        }))
    }

    fn exists(&self, location: &str) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(location)
    }

    fn size(&self, location: &str) -> Result<u64, StorageError> {
        Ok(self.get(location)?.bytes.len() as u64)
    }

    fn last_write_time(&self, location: &str) -> Result<DateTime<Utc>, StorageError> {
        Ok(self.get(location)?.modified)
    }
}

/// Shared buffer so readers do not copy the stored image
struct SharedBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Collects writes and publishes them when flushed or dropped
struct MemoryWriter {
    location: String,
    buffer: Vec<u8>,
    files: MemoryFiles,
}

impl MemoryWriter {
    fn commit(&mut self) {
        let file = MemoryFile {
            bytes: Arc::new(self.buffer.clone()),
            modified: Utc::now(),
        };
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(self.location.clone(), file);
    }
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
