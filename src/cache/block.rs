use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{CacheError, IoError};
use crate::image::{BoundingBox, ImageExpr};
use crate::pixel::{bytes_per_pixel, ChannelType, Pixel, PixelFormat};

/// Prefix of every temporary file created by the cache.
pub const CACHE_FILE_PREFIX: &str = "raster-cache-";

/// Reference-counted handle to one materialized image expression.
///
/// Cloning a block shares the same backing file and bumps an atomic count.
/// The file is deleted exactly once, when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct CachedBlock {
    storage: Arc<BlockStorage>,
}

#[derive(Debug)]
struct BlockStorage {
    file: NamedTempFile,
    path: PathBuf,
    identifier: String,
    cols: u32,
    rows: u32,
    planes: u32,
    pixel_format: PixelFormat,
    channel_type: ChannelType,
}

impl Drop for BlockStorage {
    fn drop(&mut self) {
        debug!(path = %self.identifier, "Releasing cache block");
    }
}

impl CachedBlock {
    /// Evaluate `expr` completely and write the result to a new temporary
    /// file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Allocate`] if the file cannot be created or
    /// written. A partially written file is removed before returning.
    pub fn materialize<E: ImageExpr>(expr: &E, dir: &Path) -> Result<Self, CacheError> {
        let allocate_err = |e: std::io::Error| CacheError::Allocate {
            message: format!("{}: {}", dir.display(), e),
        };

        let mut file = tempfile::Builder::new()
            .prefix(CACHE_FILE_PREFIX)
            .suffix(".raw")
            .tempfile_in(dir)
            .map_err(allocate_err)?;

        let (cols, rows, planes) = (expr.cols(), expr.rows(), expr.planes());
        let px_size = E::Pixel::SIZE;
        let mut row = vec![0u8; cols as usize * px_size];

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            for plane in 0..planes {
                for y in 0..rows {
                    for (x, out) in row.chunks_exact_mut(px_size).enumerate() {
                        expr.pixel(x as u32, y, plane).write_ne(out);
                    }
                    writer.write_all(&row).map_err(allocate_err)?;
                }
            }
            writer.flush().map_err(allocate_err)?;
        }

        let path = file.path().to_path_buf();
        let identifier = path.display().to_string();
        debug!(
            path = %identifier,
            cols,
            rows,
            planes,
            bytes = cols as u64 * rows as u64 * planes as u64 * px_size as u64,
            "Materialized image expression"
        );

        Ok(Self {
            storage: Arc::new(BlockStorage {
                file,
                path,
                identifier,
                cols,
                rows,
                planes,
                pixel_format: <E::Pixel as Pixel>::FORMAT,
                channel_type: <E::Pixel as Pixel>::CHANNEL_TYPE,
            }),
        })
    }

    pub fn cols(&self) -> u32 {
        self.storage.cols
    }

    pub fn rows(&self) -> u32 {
        self.storage.rows
    }

    pub fn planes(&self) -> u32 {
        self.storage.planes
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.storage.pixel_format
    }

    pub fn channel_type(&self) -> ChannelType {
        self.storage.channel_type
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.storage.path
    }

    pub(crate) fn identifier(&self) -> &str {
        &self.storage.identifier
    }

    /// Number of live handles sharing this block.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.storage)
    }

    /// True if both handles refer to the same backing file.
    pub fn ptr_eq(&self, other: &CachedBlock) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.storage.pixel_format, self.storage.channel_type)
    }

    /// Read the bytes of pixel `(x, y, plane)` into `out`.
    ///
    /// The coordinate must already be bounds-checked.
    pub(crate) fn read_pixel(
        &self,
        x: u32,
        y: u32,
        plane: u32,
        out: &mut [u8],
    ) -> Result<(), CacheError> {
        let s = &self.storage;
        let index = (plane as u64 * s.rows as u64 + y as u64) * s.cols as u64 + x as u64;
        let offset = index * self.bytes_per_pixel() as u64;

        read_exact_at(self.storage.file.as_file(), out, offset).map_err(IoError::from)?;
        Ok(())
    }

    /// Read every plane of `bbox` into `dst`, plane-major then row-major.
    ///
    /// The region and buffer size must already be validated.
    pub(crate) fn read_region(&self, bbox: &BoundingBox, dst: &mut [u8]) -> Result<(), CacheError> {
        let s = &self.storage;
        let bpp = self.bytes_per_pixel() as u64;
        let row_len = bbox.width as usize * bpp as usize;

        let file = self.storage.file.as_file();
        let mut out = 0;
        for plane in 0..s.planes as u64 {
            for y in bbox.y as u64..bbox.bottom() as u64 {
                let offset = ((plane * s.rows as u64 + y) * s.cols as u64 + bbox.x as u64) * bpp;
                read_exact_at(file, &mut dst[out..out + row_len], offset)
                    .map_err(IoError::from)?;
                out += row_len;
            }
        }
        Ok(())
    }
}

/// Fill `buf` from `offset` without touching the file cursor.
#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                buf = &mut buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
