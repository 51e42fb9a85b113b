//! Captured guest memory image
//!
//! A [`CoreDump`] is a read-only view over guest physical memory. The debugger
//! writes an ELF core file whose `PT_LOAD` segments hold the RAM ranges; those
//! segments are laid end to end into one logical image and read from disk on
//! demand, so a multi-gigabyte guest never has to sit in memory.
//!
//! Handles are shared (`Arc<CoreDump>`) between the snapshot store and the
//! renderer. A newer poll replacing the dump does not disturb a render that is
//! still reading the old one.

use crate::error::{Error, Result};
use goblin::container::Ctx;
use goblin::elf::program_header::{ProgramHeader, PT_LOAD};
use goblin::elf::Elf;
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const ELF_HEADER_LEN: usize = 64;

/// A range of the logical image backed by part of the core file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: u64,
    file_offset: u64,
    len: u64,
}

#[derive(Debug)]
enum Backing {
    Memory(Vec<u8>),
    File {
        file: Mutex<File>,
        path: PathBuf,
        segments: Vec<Segment>,
        remove_on_drop: bool,
    },
}

#[derive(Debug)]
pub struct CoreDump {
    backing: Backing,
    size: u64,
}

impl CoreDump {
    /// Wrap an image that is already in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        CoreDump {
            backing: Backing::Memory(bytes),
            size,
        }
    }

    /// Open an ELF core file, leaving it on disk afterwards
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_file(path.as_ref(), false)
    }

    /// Open an ELF core file that this handle owns; the file is deleted once
    /// the last reference to the dump goes away
    pub fn open_owned(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_file(path.as_ref(), true)
    }

    fn open_file(path: &Path, remove_on_drop: bool) -> Result<Self> {
        let mut file = File::open(path)?;

        let mut header_bytes = [0u8; ELF_HEADER_LEN];
        file.read_exact(&mut header_bytes)?;
        let header = Elf::parse_header(&header_bytes)?;
        let ctx = Ctx::new(header.container()?, header.endianness()?);

        let table_len = header.e_phnum as usize * header.e_phentsize as usize;
        let mut table = vec![0u8; table_len];
        file.seek(SeekFrom::Start(header.e_phoff))?;
        file.read_exact(&mut table)?;

        let program_headers = ProgramHeader::parse(&table, 0, header.e_phnum as usize, ctx)?;
        let segments = load_segments(&program_headers);
        let size = segments.last().map(|s| s.start + s.len).unwrap_or(0);

        if segments.is_empty() {
            return Err(Error::Parse(format!(
                "{} has no loadable segments",
                path.display()
            )));
        }

        tracing::trace!(
            path = %path.display(),
            segments = segments.len(),
            size,
            "opened core dump"
        );

        Ok(CoreDump {
            backing: Backing::File {
                file: Mutex::new(file),
                path: path.to_path_buf(),
                segments,
                remove_on_drop,
            },
            size,
        })
    }

    /// Total number of bytes in the logical image
    pub fn memory_size(&self) -> usize {
        usize::try_from(self.size).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Read up to `size` bytes starting at `offset`.
    ///
    /// The result is shorter than `size` when the range runs past the end of
    /// the image, and empty when `offset` is already past it.
    pub fn read_memory(&self, offset: usize, size: usize) -> io::Result<Vec<u8>> {
        let offset = offset as u64;
        if offset >= self.size || size == 0 {
            return Ok(Vec::new());
        }
        let end = offset.saturating_add(size as u64).min(self.size);

        match &self.backing {
            Backing::Memory(bytes) => Ok(bytes[offset as usize..end as usize].to_vec()),
            Backing::File { file, segments, .. } => {
                let mut out = Vec::with_capacity((end - offset) as usize);
                let mut file = file.lock();

                for segment in segments {
                    let seg_end = segment.start + segment.len;
                    if seg_end <= offset || segment.start >= end {
                        continue;
                    }

                    let from = offset.max(segment.start);
                    let to = end.min(seg_end);
                    let mut chunk = vec![0u8; (to - from) as usize];

                    file.seek(SeekFrom::Start(segment.file_offset + (from - segment.start)))?;
                    file.read_exact(&mut chunk)?;
                    out.extend_from_slice(&chunk);
                }

                Ok(out)
            }
        }
    }
}

impl Drop for CoreDump {
    fn drop(&mut self) {
        if let Backing::File {
            path,
            remove_on_drop: true,
            ..
        } = &self.backing
        {
            if let Err(e) = fs::remove_file(path) {
                tracing::debug!(path = %path.display(), error = %e, "could not remove core dump");
            }
        }
    }
}

fn load_segments(program_headers: &[ProgramHeader]) -> Vec<Segment> {
    let mut start = 0;
    program_headers
        .iter()
        .filter(|ph| ph.p_type == PT_LOAD && ph.p_filesz > 0)
        .map(|ph| {
            let segment = Segment {
                start,
                file_offset: ph.p_offset,
                len: ph.p_filesz,
            };
            start += ph.p_filesz;
            segment
        })
        .collect()
}
