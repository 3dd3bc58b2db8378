//! Configuration constants for the on-disk DBF layout.
//! These constants define the stable legacy file format this crate mirrors.

/// Byte length of the fixed table descriptor at the start of the file.
pub const TABLE_DESCRIPTOR_LENGTH: usize = 32;

/// Byte length of one field descriptor slot.
pub const FIELD_DESCRIPTOR_LENGTH: usize = 32;

/// Byte length of the field name region inside a descriptor slot.
pub const FIELD_NAME_LENGTH: usize = 11;

/// Byte length of the embedded catalog region in catalog-variant tables.
pub const CATALOG_LENGTH: usize = 263;

/// Byte length of the terminator that closes the field descriptor array.
pub const TERMINATOR_LENGTH: usize = 1;

/// Offset of the version/variant byte within the table descriptor.
pub const VERSION_OFFSET: usize = 0;

/// Offset of the 4-byte little-endian record count.
pub const RECORDS_COUNT_OFFSET: usize = 4;

/// Offset of the 2-byte little-endian header length.
pub const HEADER_LENGTH_OFFSET: usize = 8;

/// Offset of the 2-byte little-endian record length.
pub const RECORD_LENGTH_OFFSET: usize = 10;

/// Offset of the code-page (language driver) byte.
pub const CODEPAGE_OFFSET: usize = 29;

/// Offset of the field length byte within a descriptor slot.
pub const FIELD_LENGTH_OFFSET: usize = 16;

/// Offset of the field decimal precision byte within a descriptor slot.
pub const FIELD_PRECISION_OFFSET: usize = 17;

/// First byte of every record; `'*'` marks the record logically deleted.
pub const DELETION_MARKER: u8 = b'*';

/// Marker byte for an active (non-deleted) record.
pub const ACTIVE_MARKER: u8 = b' ';

/// Trailing byte written after the last physical record on append.
pub const END_OF_FILE_MARK: u8 = 0x1A;

/// Table variant selected by the header version byte.
///
/// The variant decides how much of the header region holds field descriptors
/// versus reserved embedded-catalog bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableVariant {
    /// Plain table: descriptor array runs up to the terminator byte.
    Simple,
    /// Table with an embedded catalog region of [`CATALOG_LENGTH`] bytes.
    WithCatalog,
}

/// Map a header version byte to its table variant.
///
/// Returns `None` for version bytes outside the known legacy set; callers
/// reject such files as unrecognized.
pub fn variant_for_version(version: u8) -> Option<TableVariant> {
    match version {
        2 | 3 | 4 | 5 | 7 => Some(TableVariant::Simple),
        48 | 49 => Some(TableVariant::WithCatalog),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_versions_map_to_variants() {
        for v in [2u8, 3, 4, 5, 7] {
            assert_eq!(variant_for_version(v), Some(TableVariant::Simple));
        }
        for v in [48u8, 49] {
            assert_eq!(variant_for_version(v), Some(TableVariant::WithCatalog));
        }
    }

    #[test]
    fn unknown_versions_are_rejected() {
        for v in [0u8, 1, 6, 8, 47, 50, 131, 255] {
            assert_eq!(variant_for_version(v), None);
        }
    }
}
