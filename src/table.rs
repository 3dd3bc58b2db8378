//! Table engine: open, cursor navigation, and record mutations.

use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::codec::{decode_record, encode_record, record_byte_length};
use crate::codepage::Codepage;
use crate::config::{
    TableVariant, CODEPAGE_OFFSET, DELETION_MARKER, RECORDS_COUNT_OFFSET, TABLE_DESCRIPTOR_LENGTH,
};
use crate::error::{DbfError, DbfResult, TableError};
use crate::field::DbfField;
use crate::file::{OpenMode, TableFile};
use crate::header::{encode_records_count, parse_descriptors, TableHeader};
use crate::record::{DbfRecord, Value};

/// Cursor position before the first record.
const BEFORE_FIRST: i64 = -1;

/// Handle over one legacy table file.
///
/// The handle owns its file descriptor, cursor position, and one-slot decode
/// cache exclusively; it is never implicitly shared. [`DbfTable::try_clone`]
/// duplicates the state over an independent descriptor on the same path —
/// clones do not observe each other's position, and interleaved writers over
/// clones are not coordinated in any way.
#[derive(Debug)]
pub struct DbfTable {
    file: TableFile,
    variant: TableVariant,
    codepage: Codepage,
    encoding: &'static Encoding,
    header_length: usize,
    record_length: usize,
    records_count: u32,
    fields: Vec<DbfField>,
    current_index: i64,
    cache: Option<(usize, DbfRecord)>,
    last_error: TableError,
}

impl DbfTable {
    /// Open a table file and parse its descriptor and field schema.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> DbfResult<Self> {
        let mut file = TableFile::open(path.as_ref(), mode)?;

        let mut descriptor = [0u8; TABLE_DESCRIPTOR_LENGTH];
        let n = file.read_at(0, &mut descriptor)?;
        if n != TABLE_DESCRIPTOR_LENGTH {
            return Err(DbfError::format(format!(
                "table descriptor truncated: {} of {} bytes",
                n, TABLE_DESCRIPTOR_LENGTH
            )));
        }

        let header = TableHeader::parse(&descriptor)?;
        let encoding = header.codepage.encoding();

        let region_length = header.descriptor_region_length()?;
        let mut region = vec![0u8; region_length];
        let n = file.read_at(TABLE_DESCRIPTOR_LENGTH as u64, &mut region)?;
        if n != region_length {
            return Err(DbfError::format(format!(
                "field descriptor region truncated: {} of {} bytes",
                n, region_length
            )));
        }

        let fields = parse_descriptors(&region, encoding);
        if record_byte_length(&fields) != header.record_length {
            warn!(
                path = %path.as_ref().display(),
                stated = header.record_length,
                derived = record_byte_length(&fields),
                "record length in header disagrees with field schema"
            );
        }

        debug!(
            path = %path.as_ref().display(),
            ?header.variant,
            ?header.codepage,
            fields = fields.len(),
            records = header.records_count,
            "opened table"
        );

        Ok(Self {
            file,
            variant: header.variant,
            codepage: header.codepage,
            encoding,
            header_length: header.header_length,
            record_length: header.record_length,
            records_count: header.records_count,
            fields,
            current_index: BEFORE_FIRST,
            cache: None,
            last_error: TableError::None,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Access mode the table was opened with.
    pub fn open_mode(&self) -> OpenMode {
        self.file.mode()
    }

    /// Table variant selected by the header version byte.
    pub fn variant(&self) -> TableVariant {
        self.variant
    }

    /// Currently active code page.
    pub fn codepage(&self) -> Codepage {
        self.codepage
    }

    /// Number of records, including soft-deleted ones.
    pub fn size(&self) -> usize {
        self.records_count as usize
    }

    /// Current cursor position; −1 when before the first record.
    pub fn at(&self) -> i64 {
        self.current_index
    }

    /// Number of fields in the schema.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field descriptors in schema order.
    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    /// Field descriptor at `index`.
    pub fn field(&self, index: usize) -> Option<&DbfField> {
        self.fields.get(index)
    }

    /// Error kind recorded by the most recent fallible call.
    pub fn last_error(&self) -> TableError {
        self.last_error
    }

    /// A fresh template record over this table's schema: all values null,
    /// not deleted, no persisted index.
    pub fn blank_record(&self) -> DbfRecord {
        DbfRecord::template(self.fields.clone())
    }

    /// Duplicate this handle: independent descriptor on the same path, with
    /// cursor position, cache, and metadata copied.
    pub fn try_clone(&self) -> DbfResult<Self> {
        Ok(Self {
            file: self.file.reopen()?,
            variant: self.variant,
            codepage: self.codepage,
            encoding: self.encoding,
            header_length: self.header_length,
            record_length: self.record_length,
            records_count: self.records_count,
            fields: self.fields.clone(),
            current_index: self.current_index,
            cache: self.cache.clone(),
            last_error: self.last_error,
        })
    }

    // === Cursor ===

    /// Move the cursor to `index`, clamped into `[-1, size - 1]`.
    ///
    /// Navigation cannot fail structurally; failures surface lazily on
    /// dereference. Returns true unconditionally.
    pub fn seek(&mut self, index: i64) -> bool {
        let last = self.records_count as i64 - 1;
        let clamped = index.clamp(BEFORE_FIRST, last.max(BEFORE_FIRST));
        if clamped != self.current_index {
            self.current_index = clamped;
            self.cache = None;
        }
        true
    }

    /// Move to the first record.
    pub fn first(&mut self) -> bool {
        self.seek(0)
    }

    /// Move to the last record.
    pub fn last(&mut self) -> bool {
        self.seek(self.records_count as i64 - 1)
    }

    /// Advance by one record.
    ///
    /// From before-first this is [`first`](Self::first); at or past the last
    /// index it returns false without moving.
    pub fn next(&mut self) -> bool {
        if self.current_index < 0 {
            return self.first();
        }
        if self.current_index >= self.records_count as i64 - 1 {
            return false;
        }
        self.seek(self.current_index + 1)
    }

    /// Retreat by one record.
    ///
    /// At or before the first index it returns false without moving; parked
    /// past the last valid index it resets to [`last`](Self::last).
    pub fn previous(&mut self) -> bool {
        if self.current_index <= 0 {
            return false;
        }
        if self.current_index > self.records_count as i64 - 1 {
            return self.last();
        }
        self.seek(self.current_index - 1)
    }

    /// Decode the record at the current cursor position.
    ///
    /// Before the first record this yields a template record without
    /// touching storage. The decoded record is cached for the current
    /// position; moving the cursor or mutating the table invalidates the
    /// cache.
    pub fn record(&mut self) -> DbfResult<DbfRecord> {
        if self.current_index < 0 {
            self.last_error = TableError::None;
            return Ok(self.blank_record());
        }
        let index = self.current_index as usize;

        if let Some((cached_index, cached)) = &self.cache {
            if *cached_index == index {
                self.last_error = TableError::None;
                return Ok(cached.clone());
            }
        }

        let raw = match self.read_record_bytes(index) {
            Ok(raw) => raw,
            Err(e) => return Err(self.fail(e)),
        };
        let mut record = decode_record(&raw, &self.fields, self.encoding);
        record.set_index(Some(index));

        self.cache = Some((index, record.clone()));
        self.last_error = TableError::None;
        Ok(record)
    }

    /// Decode the current record and project the value at field `index`.
    pub fn value(&mut self, index: usize) -> DbfResult<Value> {
        let record = self.record()?;
        Ok(record.value(index).cloned().unwrap_or(Value::Null))
    }

    // === Mutations ===

    /// Append a record at the logical end of the record area.
    ///
    /// The write always targets `header_length + record_length * size()`,
    /// even when trailing soft-deleted records exist; deleted slots are
    /// never reused. On success the header's 4-byte record count is
    /// rewritten. A failed count rewrite after a successful data write
    /// leaves the file recoverable but inconsistent; it is surfaced, not
    /// retried, and the in-memory count is left unchanged.
    pub fn append_record(&mut self, record: &DbfRecord) -> DbfResult<()> {
        if let Err(e) = self.require_writable("append_record") {
            return Err(self.fail(e));
        }

        let data = match encode_record(record, &self.fields, self.encoding, true) {
            Ok(data) => data,
            Err(e) => return Err(self.fail(e)),
        };

        let offset = self.record_offset(self.records_count as usize);
        if let Err(e) = self.file.write_all_at("append_record", offset, &data) {
            return Err(self.fail(e));
        }

        let count_bytes = encode_records_count(self.records_count + 1);
        if let Err(e) = self.file.write_all_at(
            "append_record.count",
            RECORDS_COUNT_OFFSET as u64,
            &count_bytes,
        ) {
            warn!(
                path = %self.file.path().display(),
                "record data written but header count update failed"
            );
            return Err(self.fail(e));
        }

        self.records_count += 1;
        self.last_error = TableError::None;
        Ok(())
    }

    /// Append a blank, non-deleted record.
    pub fn append_blank_record(&mut self) -> DbfResult<()> {
        let record = self.blank_record();
        self.append_record(&record)
    }

    /// Overwrite the record at the index carried by `record`.
    ///
    /// Encodes without the end-of-file mark and rewrites exactly
    /// `record_length` bytes; the record count is untouched.
    pub fn update_record(&mut self, record: &DbfRecord) -> DbfResult<()> {
        if let Err(e) = self.require_writable("update_record") {
            return Err(self.fail(e));
        }

        let index = match record.index() {
            Some(i) if i < self.records_count as usize => i,
            other => {
                let e = DbfError::OutOfRange {
                    index: other.map_or(-1, |i| i as i64),
                    count: self.records_count,
                };
                return Err(self.fail(e));
            }
        };

        let data = match encode_record(record, &self.fields, self.encoding, false) {
            Ok(data) => data,
            Err(e) => return Err(self.fail(e)),
        };

        let offset = self.record_offset(index);
        if let Err(e) = self.file.write_all_at("update_record", offset, &data) {
            return Err(self.fail(e));
        }

        self.invalidate_cached(index);
        self.last_error = TableError::None;
        Ok(())
    }

    /// Soft-delete the record at `index` by flipping its deletion marker.
    ///
    /// Only byte 0 of the record is rewritten; storage is never reclaimed or
    /// compacted.
    pub fn remove_record(&mut self, index: usize) -> DbfResult<()> {
        if let Err(e) = self.require_writable("remove_record") {
            return Err(self.fail(e));
        }

        if index >= self.records_count as usize {
            let e = DbfError::OutOfRange {
                index: index as i64,
                count: self.records_count,
            };
            return Err(self.fail(e));
        }

        // Validate the slot is fully readable before touching it.
        if let Err(e) = self.read_record_bytes(index) {
            return Err(self.fail(e));
        }

        let offset = self.record_offset(index);
        if let Err(e) = self
            .file
            .write_all_at("remove_record", offset, &[DELETION_MARKER])
        {
            return Err(self.fail(e));
        }

        self.invalidate_cached(index);
        self.last_error = TableError::None;
        Ok(())
    }

    /// Change the table's code page: rewrite the header byte and re-resolve
    /// the active text encoding.
    ///
    /// Subsequent text decodes and encodes use the new encoding; bytes
    /// already on disk are not re-encoded.
    pub fn set_codepage(&mut self, codepage: Codepage) -> DbfResult<()> {
        if let Err(e) = self.require_writable("set_codepage") {
            return Err(self.fail(e));
        }

        let byte = match codepage.storage_byte() {
            Some(byte) => byte,
            None => {
                let e = DbfError::write("set_codepage", format!("{:?} cannot be stored", codepage));
                return Err(self.fail(e));
            }
        };

        if let Err(e) = self
            .file
            .write_all_at("set_codepage", CODEPAGE_OFFSET as u64, &[byte])
        {
            return Err(self.fail(e));
        }

        self.codepage = codepage;
        self.encoding = codepage.encoding();
        self.cache = None;
        self.last_error = TableError::None;
        Ok(())
    }

    // === Internals ===

    fn record_offset(&self, index: usize) -> u64 {
        self.header_length as u64 + self.record_length as u64 * index as u64
    }

    fn read_record_bytes(&mut self, index: usize) -> DbfResult<Vec<u8>> {
        let mut raw = vec![0u8; self.record_length];
        let offset = self.record_offset(index);
        let n = self.file.read_at(offset, &mut raw)?;
        if n != self.record_length {
            return Err(DbfError::ShortRead {
                index,
                wanted: self.record_length,
                got: n,
            });
        }
        Ok(raw)
    }

    fn require_writable(&self, action: &'static str) -> DbfResult<()> {
        if self.file.is_writable() {
            Ok(())
        } else {
            Err(DbfError::write(action, "handle is read-only"))
        }
    }

    fn invalidate_cached(&mut self, index: usize) {
        if matches!(self.cache, Some((cached, _)) if cached == index) {
            self.cache = None;
        }
    }

    fn fail(&mut self, e: DbfError) -> DbfError {
        self.last_error = e.table_error();
        e
    }
}

impl PartialEq for DbfTable {
    /// Tables compare equal when their path and parsed metadata agree;
    /// cursor position and cache are deliberately excluded.
    fn eq(&self, other: &Self) -> bool {
        self.file.path() == other.file.path()
            && self.variant == other.variant
            && self.codepage == other.codepage
            && self.header_length == other.header_length
            && self.record_length == other.record_length
            && self.fields.len() == other.fields.len()
            && self.records_count == other.records_count
    }
}

impl std::fmt::Display for DbfTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DbfTable({}, {} fields x {} records)",
            self.file.path().display(),
            self.fields.len(),
            self.records_count
        )
    }
}
