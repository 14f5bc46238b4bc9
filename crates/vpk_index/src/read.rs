use binrw::BinRead;
use camino::Utf8Path;
use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Cursor, Read},
};

use crate::{
    entry::{build_path, EntryRecord, VpkEntry, ENTRY_TERMINATOR},
    error::{FormatError, Result, VpkError},
    Vpk, VpkHeader,
};

impl Vpk {
    /// Open a `*_dir.vpk` file and index its directory tree.
    ///
    /// The file is closed before this returns.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening VPK {}", path);

        let file = File::open(path.as_std_path()).map_err(|source| VpkError::NotFound {
            path: path.to_path_buf(),
            source,
        })?;

        Self::mount_from_reader(file)
    }

    pub fn mount_from_reader<R: Read>(source: R) -> Result<Self> {
        let mut reader = BufReader::new(source);

        let header = VpkHeader::read(&mut reader)?;

        let mut tree = Vec::new();
        (&mut reader)
            .take(u64::from(header.tree_size))
            .read_to_end(&mut tree)?;
        if tree.len() < header.tree_size as usize {
            return Err(FormatError::Truncated {
                context: "directory tree",
                offset: header.size() + tree.len(),
            }
            .into());
        }

        let (entries, lookup) = read_tree(&tree, header.size())?;

        tracing::debug!(
            "Indexed {} entries (VPK v{}, tree size {})",
            entries.len(),
            header.version,
            header.tree_size
        );

        Ok(Self {
            header,
            entries,
            lookup,
        })
    }
}

/// Entries in tree order plus a path -> position lookup.
type TreeIndex = (Vec<VpkEntry>, HashMap<String, usize>);

/// Walk the extension -> directory -> file name tables of a directory tree.
///
/// Each table ends with an empty string. `base_offset` only feeds error messages.
/// A path listed more than once keeps its first entry.
fn read_tree(tree: &[u8], base_offset: usize) -> Result<TreeIndex> {
    let mut cursor = TreeCursor::new(tree, base_offset);
    let mut entries = Vec::new();
    let mut lookup = HashMap::new();

    loop {
        let extension = cursor.read_str()?;
        if extension.is_empty() {
            break;
        }

        loop {
            let directory = cursor.read_str()?;
            if directory.is_empty() {
                break;
            }

            loop {
                let file_name = cursor.read_str()?;
                if file_name.is_empty() {
                    break;
                }

                let record = cursor.read_record()?;
                if record.terminator != ENTRY_TERMINATOR {
                    return Err(FormatError::InvalidTerminator {
                        path: build_path(directory, file_name, extension),
                        value: record.terminator,
                    }
                    .into());
                }

                let preload = cursor
                    .take(record.preload_length as usize, "preload data")?
                    .to_vec();
                let entry = VpkEntry::new(extension, directory, file_name, &record, preload);

                if lookup.contains_key(entry.path()) {
                    tracing::warn!("Ignoring duplicate entry {}", entry.path());
                    continue;
                }
                lookup.insert(entry.path().to_string(), entries.len());
                entries.push(entry);
            }
        }
    }

    if cursor.remaining() > 0 {
        tracing::trace!("{} trailing bytes after directory tree", cursor.remaining());
    }

    Ok((entries, lookup))
}

/// Bounds-checked reader over the in-memory directory tree.
struct TreeCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base_offset: usize,
}

impl<'a> TreeCursor<'a> {
    fn new(data: &'a [u8], base_offset: usize) -> Self {
        Self {
            data,
            pos: 0,
            base_offset,
        }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn offset(&self) -> usize {
        self.base_offset + self.pos
    }

    fn read_str(&mut self) -> Result<&'a str> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(FormatError::Truncated {
                context: "tree string",
                offset: self.offset(),
            })?;
        let value = std::str::from_utf8(&rest[..len]).map_err(|_| FormatError::InvalidString {
            offset: self.offset(),
        })?;
        self.pos += len + 1;
        Ok(value)
    }

    fn read_record(&mut self) -> Result<EntryRecord> {
        let offset = self.offset();
        let bytes = self.take(EntryRecord::SIZE, "entry record")?;
        EntryRecord::read(&mut Cursor::new(bytes)).map_err(|_| {
            FormatError::Truncated {
                context: "entry record",
                offset,
            }
            .into()
        })
    }

    fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(FormatError::Truncated {
                context,
                offset: self.offset(),
            }
            .into());
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{FixtureEntry, VpkFixture};
    use crate::DataLocation;
    use camino::Utf8PathBuf;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mount(bytes: Vec<u8>) -> Result<Vpk> {
        Vpk::mount_from_reader(Cursor::new(bytes))
    }

    fn paths(vpk: &Vpk) -> Vec<&str> {
        vpk.paths().collect()
    }

    #[test]
    fn test_mount_lists_every_entry() {
        let bytes = VpkFixture::new()
            .with_path("maps/c1m1_hotel.bsp")
            .with_path("maps/c1m2_streets.bsp")
            .with_path("sound/ambient.wav")
            .to_bytes();

        let vpk = mount(bytes).unwrap();

        assert_eq!(vpk.len(), 3);
        let mut listed = paths(&vpk);
        listed.sort_unstable();
        assert_eq!(
            listed,
            vec![
                "maps/c1m1_hotel.bsp",
                "maps/c1m2_streets.bsp",
                "sound/ambient.wav"
            ]
        );
    }

    #[test]
    fn test_root_directory_is_normalized() {
        let bytes = VpkFixture::new().with_path("foo.txt").to_bytes();
        let vpk = mount(bytes).unwrap();

        assert_eq!(paths(&vpk), vec!["foo.txt"]);
        let entry = &vpk.entries()[0];
        assert_eq!(entry.directory, " ");
        assert_eq!(entry.file_name, "foo");
        assert_eq!(entry.extension, "txt");
    }

    #[test]
    fn test_entries_keep_their_own_directory_and_extension() {
        // Several extensions, each with several directories, each with several files.
        // A reader that ignores the empty-string terminators would shift names between tables.
        let bytes = VpkFixture::new()
            .with_path("materials/a/one.vmt")
            .with_path("materials/a/two.vmt")
            .with_path("materials/b/three.vmt")
            .with_path("materials/a/one.vtf")
            .with_path("root.vtf")
            .with_path("scripts/vscripts/custom.nut")
            .to_bytes();

        let vpk = mount(bytes).unwrap();

        let listed = paths(&vpk);
        assert_eq!(
            listed,
            vec![
                "materials/a/one.vmt",
                "materials/a/two.vmt",
                "materials/b/three.vmt",
                "materials/a/one.vtf",
                "root.vtf",
                "scripts/vscripts/custom.nut",
            ]
        );

        let three = vpk.get("materials/b/three.vmt").unwrap();
        assert_eq!(three.directory, "materials/b");
        assert_eq!(three.extension, "vmt");
        let root = vpk.get("root.vtf").unwrap();
        assert_eq!(root.directory, " ");
        assert_eq!(root.extension, "vtf");
    }

    #[test]
    fn test_empty_tree() {
        let vpk = mount(VpkFixture::new().to_bytes()).unwrap();
        assert!(vpk.is_empty());
        assert_eq!(vpk.paths().count(), 0);
    }

    #[test]
    fn test_preload_and_metadata() {
        let bytes = VpkFixture::new()
            .with_entry(FixtureEntry::new("scripts/config.cfg").with_preload(b"exec x".to_vec()))
            .with_entry(
                FixtureEntry::new("models/props/crate.mdl")
                    .with_archive(2, 1024, 4096)
                    .with_crc(0xCAFEBABE),
            )
            .to_bytes();

        let vpk = mount(bytes).unwrap();

        let cfg = vpk.get("scripts/config.cfg").unwrap();
        assert_eq!(cfg.preload, b"exec x");
        assert!(matches!(
            cfg.location(vpk.header().tree_end()),
            DataLocation::Embedded { .. }
        ));

        let mdl = vpk.get("models/props/crate.mdl").unwrap();
        assert_eq!(mdl.crc32, 0xCAFEBABE);
        assert_eq!(mdl.length, 4096);
        assert_eq!(
            mdl.location(vpk.header().tree_end()),
            DataLocation::Archive {
                index: 2,
                offset: 1024
            }
        );
    }

    #[test]
    fn test_version_2_header() {
        let bytes = VpkFixture::new()
            .version(2)
            .with_path("maps/c1m1_hotel.bsp")
            .to_bytes();

        let vpk = mount(bytes).unwrap();
        assert_eq!(vpk.header().version, 2);
        assert_eq!(paths(&vpk), vec!["maps/c1m1_hotel.bsp"]);
    }

    #[test]
    fn test_invalid_terminator() {
        let bytes = VpkFixture::new()
            .with_entry(FixtureEntry::new("maps/c1m1_hotel.bsp").with_terminator(0x1234))
            .to_bytes();

        match mount(bytes) {
            Err(VpkError::Format(FormatError::InvalidTerminator { path, value })) => {
                assert_eq!(path, "maps/c1m1_hotel.bsp");
                assert_eq!(value, 0x1234);
            }
            other => panic!("expected InvalidTerminator, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_tree() {
        let mut bytes = VpkFixture::new()
            .with_path("maps/c1m1_hotel.bsp")
            .with_path("sound/ambient.wav")
            .to_bytes();
        bytes.truncate(bytes.len() - 5);

        let result = mount(bytes);
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::Truncated {
                context: "directory tree",
                ..
            }))
        ));
    }

    #[test]
    fn test_tree_missing_terminators() {
        // Header claims a tree that stops in the middle of the directory table.
        let mut tree = Vec::new();
        tree.extend_from_slice(b"bsp\0maps\0");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::VPK_SIGNATURE.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&(tree.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&tree);

        let result = mount(bytes);
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::Truncated {
                context: "tree string",
                offset: 21
            }))
        ));
    }

    #[test]
    fn test_truncated_mid_header() {
        let bytes = VpkFixture::new().with_path("foo.txt").to_bytes();
        let result = mount(bytes[..6].to_vec());
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::Truncated {
                context: "header",
                ..
            }))
        ));
    }

    #[test]
    fn test_duplicate_entry_keeps_first() {
        let bytes = VpkFixture::new()
            .with_entry(FixtureEntry::new("maps/c1m1_hotel.bsp").with_crc(1))
            .with_path("sound/ambient.wav")
            .with_entry(FixtureEntry::new("maps/c1m1_hotel.bsp").with_crc(2))
            .to_bytes();

        let vpk = mount(bytes).unwrap();

        assert_eq!(vpk.len(), 2);
        let mut listed = paths(&vpk);
        listed.sort_unstable();
        assert_eq!(listed, vec!["maps/c1m1_hotel.bsp", "sound/ambient.wav"]);
        assert_eq!(vpk.get("maps/c1m1_hotel.bsp").unwrap().crc32, 1);
    }

    #[test]
    fn test_invalid_utf8_string() {
        let mut tree = Vec::new();
        tree.extend_from_slice(b"t\xFFt\0");
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::VPK_SIGNATURE.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&(tree.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&tree);

        let result = mount(bytes);
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::InvalidString { offset: 12 }))
        ));
    }

    #[test]
    fn test_open_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&VpkFixture::new().with_path("sound/ambient.wav").to_bytes())
            .unwrap();
        file.flush().unwrap();

        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).unwrap();
        let vpk = Vpk::open(&path).unwrap();
        assert_eq!(paths(&vpk), vec!["sound/ambient.wav"]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing_dir.vpk")).unwrap();

        let err = Vpk::open(&path).unwrap_err();
        assert_eq!(err.kind(), "NotFoundError");
        assert!(matches!(err, VpkError::NotFound { path: ref p, .. } if *p == path));
    }
}
