//! In-memory VPK directory writer for tests.
//!
//! Produces the smallest valid `*_dir.vpk` for a list of paths. Only the tree is
//! written; no data sections follow it.

use binrw::BinWrite;
use byteorder::{WriteBytesExt, LE};
use std::io::{self, Cursor, Write};
use std::path::Path;

use crate::entry::{EntryRecord, EMBEDDED_ARCHIVE_INDEX, EMPTY_COMPONENT, ENTRY_TERMINATOR};
use crate::header::VPK_SIGNATURE;

/// A single file to place in a fixture archive.
#[derive(Debug, Clone)]
pub struct FixtureEntry {
    pub extension: String,
    pub directory: String,
    pub file_name: String,
    pub record: EntryRecord,
    pub preload: Vec<u8>,
}

impl FixtureEntry {
    /// Split a normalized path into tree components.
    ///
    /// `foo.txt` lands in the root directory, `README` has no extension.
    pub fn new(path: &str) -> Self {
        let (directory, file) = match path.rsplit_once('/') {
            Some((dir, file)) => (dir, file),
            None => (EMPTY_COMPONENT, path),
        };
        let (file_name, extension) = match file.rsplit_once('.') {
            Some((name, ext)) => (name, ext),
            None => (file, EMPTY_COMPONENT),
        };

        Self {
            extension: extension.to_string(),
            directory: directory.to_string(),
            file_name: file_name.to_string(),
            record: EntryRecord {
                archive_index: EMBEDDED_ARCHIVE_INDEX,
                terminator: ENTRY_TERMINATOR,
                ..Default::default()
            },
            preload: Vec::new(),
        }
    }

    pub fn with_preload(mut self, preload: Vec<u8>) -> Self {
        self.preload = preload;
        self
    }

    pub fn with_archive(mut self, index: u16, offset: u32, length: u32) -> Self {
        self.record.archive_index = index;
        self.record.offset = offset;
        self.record.length = length;
        self
    }

    pub fn with_crc(mut self, crc32: u32) -> Self {
        self.record.crc32 = crc32;
        self
    }

    pub fn with_terminator(mut self, terminator: u16) -> Self {
        self.record.terminator = terminator;
        self
    }
}

/// Builder for a VPK directory file.
#[derive(Debug, Clone)]
pub struct VpkFixture {
    version: u32,
    entries: Vec<FixtureEntry>,
}

impl Default for VpkFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl VpkFixture {
    pub fn new() -> Self {
        Self {
            version: 1,
            entries: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_path(self, path: &str) -> Self {
        self.with_entry(FixtureEntry::new(path))
    }

    pub fn with_paths<'a>(self, paths: impl IntoIterator<Item = &'a str>) -> Self {
        paths.into_iter().fold(self, Self::with_path)
    }

    pub fn with_entry(mut self, entry: FixtureEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Serialize the header and directory tree.
    pub fn to_bytes(&self) -> Vec<u8> {
        let tree = self.tree_bytes();

        let mut out = Vec::with_capacity(tree.len() + 28);
        out.write_u32::<LE>(VPK_SIGNATURE).unwrap();
        out.write_u32::<LE>(self.version).unwrap();
        out.write_u32::<LE>(tree.len() as u32).unwrap();
        if self.version == 2 {
            for _ in 0..4 {
                out.write_u32::<LE>(0).unwrap();
            }
        }
        out.extend_from_slice(&tree);
        out
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn tree_bytes(&self) -> Vec<u8> {
        // extension -> directory -> entries, in first-seen order
        let mut groups: Vec<(&str, Vec<(&str, Vec<&FixtureEntry>)>)> = Vec::new();
        for entry in &self.entries {
            let ext_idx = match groups.iter().position(|(ext, _)| *ext == entry.extension) {
                Some(idx) => idx,
                None => {
                    groups.push((&entry.extension, Vec::new()));
                    groups.len() - 1
                }
            };
            let dirs = &mut groups[ext_idx].1;
            match dirs.iter_mut().find(|(dir, _)| *dir == entry.directory) {
                Some((_, files)) => files.push(entry),
                None => dirs.push((&entry.directory, vec![entry])),
            }
        }

        let mut tree = Cursor::new(Vec::new());
        for (extension, dirs) in groups {
            write_cstr(&mut tree, extension);
            for (directory, files) in dirs {
                write_cstr(&mut tree, directory);
                for entry in files {
                    write_cstr(&mut tree, &entry.file_name);
                    let mut record = entry.record;
                    record.preload_length = entry.preload.len() as u16;
                    record.write(&mut tree).unwrap();
                    tree.write_all(&entry.preload).unwrap();
                }
                write_cstr(&mut tree, "");
            }
            write_cstr(&mut tree, "");
        }
        write_cstr(&mut tree, "");

        tree.into_inner()
    }
}

fn write_cstr(out: &mut Cursor<Vec<u8>>, value: &str) {
    out.write_all(value.as_bytes()).unwrap();
    out.write_all(&[0]).unwrap();
}
