//! File-backed block writer.
//!
//! Layout: `{dir}/{number:036}.blk`, each item as a little-endian `u32`
//! length followed by the encoded bytes.

use crate::ports::{BlockItemWriter, BlockItemWriterFactory};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path of the file holding block `number`.
pub fn block_file_path(dir: &Path, number: u64) -> PathBuf {
    dir.join(format!("{number:036}.blk"))
}

/// Writes one block to one file.
pub struct FileBlockItemWriter {
    dir: PathBuf,
    current: Option<(u64, BufWriter<File>)>,
}

impl FileBlockItemWriter {
    /// Writer placing block files under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
        }
    }

    fn open_file(&mut self) -> io::Result<&mut BufWriter<File>> {
        match self.current.as_mut() {
            Some((_, file)) => Ok(file),
            None => Err(io::Error::new(io::ErrorKind::Other, "no block open")),
        }
    }
}

impl BlockItemWriter for FileBlockItemWriter {
    fn open_block(&mut self, number: u64) -> io::Result<()> {
        if self.current.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "writer already has an open block",
            ));
        }
        let path = block_file_path(&self.dir, number);
        let file = File::create(&path)?;
        debug!(block_number = number, path = %path.display(), "Opened block file");
        self.current = Some((number, BufWriter::new(file)));
        Ok(())
    }

    fn write_item(&mut self, bytes: &[u8]) -> io::Result<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "item too large"))?;
        let file = self.open_file()?;
        file.write_all(&len.to_le_bytes())?;
        file.write_all(bytes)
    }

    fn close_block(&mut self) -> io::Result<()> {
        let (number, mut file) = self
            .current
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no block open"))?;
        file.flush()?;
        file.get_ref().sync_all()?;
        debug!(block_number = number, "Closed block file");
        Ok(())
    }
}

/// Creates file writers rooted at one directory.
pub struct FileBlockItemWriterFactory {
    dir: PathBuf,
}

impl FileBlockItemWriterFactory {
    /// Create the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory block files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BlockItemWriterFactory for FileBlockItemWriterFactory {
    fn create(&self) -> io::Result<Box<dyn BlockItemWriter>> {
        Ok(Box::new(FileBlockItemWriter::new(self.dir.clone())))
    }
}

/// Read back the encoded items of a block file.
pub fn read_block_file(path: &Path) -> io::Result<Vec<Vec<u8>>> {
    let mut data = Vec::new();
    File::open(path)?.read_to_end(&mut data)?;

    let mut items = Vec::new();
    let mut rest = data.as_slice();
    while !rest.is_empty() {
        if rest.len() < 4 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated length prefix",
            ));
        }
        let (prefix, tail) = rest.split_at(4);
        let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        if tail.len() < len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated item"));
        }
        let (item, tail) = tail.split_at(len);
        items.push(item.to_vec());
        rest = tail;
    }
    Ok(items)
}
