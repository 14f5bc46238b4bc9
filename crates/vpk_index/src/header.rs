use byteorder::{ReadBytesExt, LE};
use std::io::Read;

use crate::error::{eof_as_truncated, FormatError, Result};

/// Signature every VPK directory file starts with.
pub const VPK_SIGNATURE: u32 = 0x55AA_1234;

/// Fixed header at the start of a `*_dir.vpk` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VpkHeader {
    pub version: u32,
    /// Size in bytes of the directory tree that follows the header.
    pub tree_size: u32,
    /// Extra section sizes, present only in version 2 headers.
    pub v2: Option<VpkHeaderV2>,
}

/// Trailing section sizes of a version 2 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VpkHeaderV2 {
    pub file_data_section_size: u32,
    pub archive_md5_section_size: u32,
    pub other_md5_section_size: u32,
    pub signature_section_size: u32,
}

impl VpkHeader {
    const V1_SIZE: usize = 12;
    const V2_SIZE: usize = 28;

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader
            .read_u32::<LE>()
            .map_err(|e| eof_as_truncated(e, "header", 0))?;
        if magic != VPK_SIGNATURE {
            return Err(FormatError::InvalidMagic(magic).into());
        }

        let version = reader
            .read_u32::<LE>()
            .map_err(|e| eof_as_truncated(e, "header", 4))?;
        let tree_size = reader
            .read_u32::<LE>()
            .map_err(|e| eof_as_truncated(e, "header", 8))?;

        let v2 = match version {
            1 => None,
            2 => {
                let mut fields = [0u32; 4];
                for (i, field) in fields.iter_mut().enumerate() {
                    *field = reader
                        .read_u32::<LE>()
                        .map_err(|e| eof_as_truncated(e, "header", Self::V1_SIZE + i * 4))?;
                }
                Some(VpkHeaderV2 {
                    file_data_section_size: fields[0],
                    archive_md5_section_size: fields[1],
                    other_md5_section_size: fields[2],
                    signature_section_size: fields[3],
                })
            }
            other => return Err(FormatError::UnsupportedVersion(other).into()),
        };

        Ok(Self {
            version,
            tree_size,
            v2,
        })
    }

    /// Size of the header itself in bytes.
    pub fn size(&self) -> usize {
        if self.v2.is_some() {
            Self::V2_SIZE
        } else {
            Self::V1_SIZE
        }
    }

    /// Absolute offset of the first byte after the directory tree.
    ///
    /// Data embedded in the directory file is addressed relative to this point.
    pub fn tree_end(&self) -> u64 {
        self.size() as u64 + u64::from(self.tree_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VpkError;
    use std::io::Cursor;

    fn header_bytes(fields: &[u32]) -> Vec<u8> {
        fields.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    #[test]
    fn test_read_v1() {
        let bytes = header_bytes(&[VPK_SIGNATURE, 1, 42]);
        let header = VpkHeader::read(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(header.version, 1);
        assert_eq!(header.tree_size, 42);
        assert!(header.v2.is_none());
        assert_eq!(header.size(), 12);
        assert_eq!(header.tree_end(), 54);
    }

    #[test]
    fn test_read_v2() {
        let bytes = header_bytes(&[VPK_SIGNATURE, 2, 10, 100, 0, 48, 296]);
        let header = VpkHeader::read(&mut Cursor::new(bytes)).unwrap();

        assert_eq!(header.size(), 28);
        assert_eq!(header.tree_end(), 38);
        let v2 = header.v2.unwrap();
        assert_eq!(v2.file_data_section_size, 100);
        assert_eq!(v2.other_md5_section_size, 48);
        assert_eq!(v2.signature_section_size, 296);
    }

    #[test]
    fn test_bad_magic() {
        let bytes = header_bytes(&[0xDEADBEEF, 1, 0]);
        let result = VpkHeader::read(&mut Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::InvalidMagic(0xDEADBEEF)))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let bytes = header_bytes(&[VPK_SIGNATURE, 3, 0]);
        let result = VpkHeader::read(&mut Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::UnsupportedVersion(3)))
        ));
    }

    #[test]
    fn test_truncated_header() {
        let mut bytes = header_bytes(&[VPK_SIGNATURE, 2, 10, 100]);
        bytes.truncate(14);
        let result = VpkHeader::read(&mut Cursor::new(bytes));
        assert!(matches!(
            result,
            Err(VpkError::Format(FormatError::Truncated {
                context: "header",
                offset: 12
            }))
        ));
    }
}
