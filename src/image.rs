//! Byte-addressable mutable window over an image file.

use crate::error::Error;
use crate::error::Result;
use memmap::MmapMut;
use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;

/// Total size of an image: 128 KiB, fixed (§3).
pub const IMAGE_SIZE: usize = 128 * 1024;

/// A fixed-size, read-write memory-mapped view of an image file.
///
/// The mapping is shared with the backing file (`MAP_SHARED`), so every mutation through the
/// returned byte slice is visible to the file once the OS flushes the page; [`Image::close`]
/// and `Drop` both force that flush explicitly so callers don't depend on writeback timing.
pub struct Image {
    file: File,
    map: MmapMut,
}

impl Image {
    /// Opens `path` and maps its first [`IMAGE_SIZE`] bytes read-write.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        if len < IMAGE_SIZE as u64 {
            return Err(Error::Invalid);
        }
        let map = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self { file, map })
    }

    /// Returns the mapped bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.map[..IMAGE_SIZE]
    }

    /// Returns the mapped bytes, mutably.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.map[..IMAGE_SIZE]
    }

    /// Returns a raw pointer to the start of the mapping.
    ///
    /// Used by [`crate::layout::Layout`] to build typed views over disjoint byte ranges; callers
    /// must only dereference non-overlapping regions within `IMAGE_SIZE`.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.map.as_mut_ptr()
    }

    /// Flushes dirty pages to the backing file.
    pub fn sync(&self) -> Result<()> {
        self.map.flush()?;
        Ok(())
    }

    /// Flushes and releases the mapping. Equivalent to dropping the `Image`, but lets the
    /// caller observe I/O errors instead of losing them in `Drop`.
    pub fn close(self) -> Result<()> {
        self.sync()?;
        drop(self.file);
        Ok(())
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        let _ = self.map.flush();
    }
}
