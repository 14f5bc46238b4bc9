use binrw::binrw;

/// Archive index value meaning the entry's data lives in the directory file itself.
pub const EMBEDDED_ARCHIVE_INDEX: u16 = 0x7FFF;

/// Value that must follow every entry record in the directory tree.
pub const ENTRY_TERMINATOR: u16 = 0xFFFF;

/// Tree string used for "no directory" and "no extension".
pub const EMPTY_COMPONENT: &str = " ";

/// Fixed-size record stored in the tree after each file name.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryRecord {
    pub crc32: u32,
    pub preload_length: u16,
    pub archive_index: u16,
    pub offset: u32,
    pub length: u32,
    pub terminator: u16,
}

impl EntryRecord {
    pub const SIZE: usize = 18;
}

/// Where an entry's (non-preloaded) bytes are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    /// Inside the directory file, at an absolute offset.
    Embedded { offset: u64 },
    /// Inside the numbered data file `<name>_<index:03>.vpk`.
    Archive { index: u16, offset: u32 },
}

/// One file listed in a VPK directory tree.
///
/// Only metadata is held; file contents beyond the preload bytes are never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpkEntry {
    /// Extension as stored in the tree (`" "` for none).
    pub extension: String,
    /// Directory as stored in the tree (`" "` for the root).
    pub directory: String,
    pub file_name: String,
    pub crc32: u32,
    pub archive_index: u16,
    pub offset: u32,
    pub length: u32,
    /// Bytes stored inline in the tree right after the record.
    pub preload: Vec<u8>,
    path: String,
}

impl VpkEntry {
    pub(crate) fn new(
        extension: &str,
        directory: &str,
        file_name: &str,
        record: &EntryRecord,
        preload: Vec<u8>,
    ) -> Self {
        Self {
            path: build_path(directory, file_name, extension),
            extension: extension.to_string(),
            directory: directory.to_string(),
            file_name: file_name.to_string(),
            crc32: record.crc32,
            archive_index: record.archive_index,
            offset: record.offset,
            length: record.length,
            preload,
        }
    }

    /// Normalized forward-slash path, e.g. `maps/c1m1_hotel.bsp`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Total size of the file: preload bytes plus archived bytes.
    pub fn total_len(&self) -> u64 {
        self.preload.len() as u64 + u64::from(self.length)
    }

    /// Resolve where the entry's data lives.
    ///
    /// `tree_end` is [`VpkHeader::tree_end`](crate::VpkHeader::tree_end) of the owning archive.
    pub fn location(&self, tree_end: u64) -> DataLocation {
        if self.archive_index == EMBEDDED_ARCHIVE_INDEX {
            DataLocation::Embedded {
                offset: tree_end + u64::from(self.offset),
            }
        } else {
            DataLocation::Archive {
                index: self.archive_index,
                offset: self.offset,
            }
        }
    }
}

/// Join tree components into a normalized path.
///
/// The `" "` placeholder drops the directory (root) or the extension (none).
pub fn build_path(directory: &str, file_name: &str, extension: &str) -> String {
    let mut path = String::with_capacity(directory.len() + file_name.len() + extension.len() + 2);
    if directory != EMPTY_COMPONENT && !directory.is_empty() {
        path.push_str(directory.trim_end_matches('/'));
        path.push('/');
    }
    path.push_str(file_name);
    if extension != EMPTY_COMPONENT && !extension.is_empty() {
        path.push('.');
        path.push_str(extension);
    }
    path
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};

    use super::*;

    #[test]
    fn test_record_size() {
        let record = EntryRecord::default();

        let mut writer = Cursor::new(Vec::new());
        record.write(&mut writer).unwrap();

        assert_eq!(writer.position() as usize, EntryRecord::SIZE);
    }

    #[test]
    fn test_record_layout() {
        let bytes = [
            0x78, 0x56, 0x34, 0x12, // crc
            0x04, 0x00, // preload length
            0xFF, 0x7F, // archive index
            0x10, 0x00, 0x00, 0x00, // offset
            0x20, 0x00, 0x00, 0x00, // length
            0xFF, 0xFF, // terminator
        ];
        let record = EntryRecord::read(&mut Cursor::new(&bytes[..])).unwrap();

        assert_eq!(record.crc32, 0x12345678);
        assert_eq!(record.preload_length, 4);
        assert_eq!(record.archive_index, EMBEDDED_ARCHIVE_INDEX);
        assert_eq!(record.offset, 0x10);
        assert_eq!(record.length, 0x20);
        assert_eq!(record.terminator, ENTRY_TERMINATOR);
    }

    #[test]
    fn test_build_path_root_directory() {
        assert_eq!(build_path(" ", "foo", "txt"), "foo.txt");
    }

    #[test]
    fn test_build_path_nested() {
        assert_eq!(
            build_path("scripts/vscripts", "custom", "nut"),
            "scripts/vscripts/custom.nut"
        );
    }

    #[test]
    fn test_build_path_no_extension() {
        assert_eq!(build_path("materials", "README", " "), "materials/README");
        assert_eq!(build_path(" ", "README", " "), "README");
    }

    #[test]
    fn test_location() {
        let embedded = VpkEntry::new(
            "txt",
            " ",
            "foo",
            &EntryRecord {
                archive_index: EMBEDDED_ARCHIVE_INDEX,
                offset: 8,
                ..Default::default()
            },
            Vec::new(),
        );
        assert_eq!(
            embedded.location(100),
            DataLocation::Embedded { offset: 108 }
        );

        let archived = VpkEntry::new(
            "txt",
            " ",
            "foo",
            &EntryRecord {
                archive_index: 3,
                offset: 8,
                length: 5,
                ..Default::default()
            },
            vec![1, 2],
        );
        assert_eq!(
            archived.location(100),
            DataLocation::Archive { index: 3, offset: 8 }
        );
        assert_eq!(archived.total_len(), 7);
    }
}
