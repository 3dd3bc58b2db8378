//! Table descriptor and field descriptor parsing/encoding.

use encoding_rs::Encoding;

use crate::codepage::Codepage;
use crate::config::{
    self, TableVariant, CODEPAGE_OFFSET, FIELD_DESCRIPTOR_LENGTH, FIELD_LENGTH_OFFSET,
    FIELD_NAME_LENGTH, FIELD_PRECISION_OFFSET, HEADER_LENGTH_OFFSET, RECORDS_COUNT_OFFSET,
    RECORD_LENGTH_OFFSET, TABLE_DESCRIPTOR_LENGTH, TERMINATOR_LENGTH, VERSION_OFFSET,
};
use crate::error::{DbfError, DbfResult};
use crate::field::{DbfField, FieldType};

/// Parsed table descriptor: variant, geometry, and code page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableHeader {
    /// Variant selected by the version byte.
    pub variant: TableVariant,
    /// Number of records stored in the header.
    pub records_count: u32,
    /// Byte offset where the record area begins.
    pub header_length: usize,
    /// Fixed byte length of one record, including the deletion marker.
    pub record_length: usize,
    /// Code page resolved from the language-driver byte.
    pub codepage: Codepage,
}

impl TableHeader {
    /// Parse the fixed 32-byte table descriptor.
    ///
    /// A version byte outside the known legacy set rejects the file.
    pub fn parse(raw: &[u8; TABLE_DESCRIPTOR_LENGTH]) -> DbfResult<Self> {
        let version = raw[VERSION_OFFSET];
        let variant = config::variant_for_version(version)
            .ok_or_else(|| DbfError::format(format!("unknown version byte {}", version)))?;

        let records_count = u32::from_le_bytes([
            raw[RECORDS_COUNT_OFFSET],
            raw[RECORDS_COUNT_OFFSET + 1],
            raw[RECORDS_COUNT_OFFSET + 2],
            raw[RECORDS_COUNT_OFFSET + 3],
        ]);
        let header_length =
            u16::from_le_bytes([raw[HEADER_LENGTH_OFFSET], raw[HEADER_LENGTH_OFFSET + 1]]) as usize;
        let record_length =
            u16::from_le_bytes([raw[RECORD_LENGTH_OFFSET], raw[RECORD_LENGTH_OFFSET + 1]]) as usize;
        let codepage = Codepage::from_storage_byte(raw[CODEPAGE_OFFSET]);

        Ok(Self {
            variant,
            records_count,
            header_length,
            record_length,
            codepage,
        })
    }

    /// Byte length of the field-descriptor region implied by the header.
    ///
    /// Fails with an unrecognized-format error when the stated header length
    /// cannot hold the descriptor plus terminator (plus catalog bytes for the
    /// catalog variant).
    pub fn descriptor_region_length(&self) -> DbfResult<usize> {
        let mut fixed = TABLE_DESCRIPTOR_LENGTH + TERMINATOR_LENGTH;
        if self.variant == TableVariant::WithCatalog {
            fixed += config::CATALOG_LENGTH;
        }
        self.header_length.checked_sub(fixed).ok_or_else(|| {
            DbfError::format(format!(
                "header length {} too small for descriptor region",
                self.header_length
            ))
        })
    }

    /// Number of field descriptors implied by the header.
    pub fn fields_count(&self) -> DbfResult<usize> {
        Ok(self.descriptor_region_length()? / FIELD_DESCRIPTOR_LENGTH)
    }
}

/// Re-encode the 4-byte little-endian record count for header writeback.
///
/// Only these four bytes are ever rewritten; the rest of the header is left
/// untouched.
pub fn encode_records_count(count: u32) -> [u8; 4] {
    count.to_le_bytes()
}

/// Parse the field-descriptor array.
///
/// Each 32-byte slot yields one descriptor: name (11 bytes, NUL bytes
/// skipped, decoded through the active code page), type byte, length, and
/// precision. Byte offsets within a record are assigned cumulatively
/// starting at 1, after the deletion marker.
pub fn parse_descriptors(raw: &[u8], encoding: &'static Encoding) -> Vec<DbfField> {
    let mut fields = Vec::with_capacity(raw.len() / FIELD_DESCRIPTOR_LENGTH);
    let mut offset = 1;

    for slot in raw.chunks_exact(FIELD_DESCRIPTOR_LENGTH) {
        let name_bytes: Vec<u8> = slot[..FIELD_NAME_LENGTH]
            .iter()
            .copied()
            .filter(|&b| b != 0)
            .collect();
        let (name, _, _) = encoding.decode(&name_bytes);

        let field_type = FieldType::from_type_byte(slot[FIELD_NAME_LENGTH]);
        let length = slot[FIELD_LENGTH_OFFSET] as usize;
        let precision = slot[FIELD_PRECISION_OFFSET] as usize;

        fields.push(DbfField::new(
            name.into_owned(),
            field_type,
            length,
            precision,
            offset,
        ));
        offset += length;
    }

    fields
}
