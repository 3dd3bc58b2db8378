//! Field descriptors: one per column, ordered, immutable after open.

/// Logical type of a column, taken from the descriptor's type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    /// `'C'`: text, decoded through the active code page.
    Character,
    /// `'D'`: calendar date stored as eight ASCII digits `YYYYMMDD`.
    Date,
    /// `'F'`: floating-point numeric literal.
    FloatingPoint,
    /// `'N'`: numeric literal with fixed decimal precision.
    Number,
    /// `'L'`: single-byte logical flag.
    Logical,
    /// Any other type byte; values decode to null, encode to spaces.
    Unknown,
}

impl FieldType {
    /// Map a descriptor type byte onto a logical field type.
    pub fn from_type_byte(byte: u8) -> Self {
        match byte {
            b'C' => FieldType::Character,
            b'D' => FieldType::Date,
            b'F' => FieldType::FloatingPoint,
            b'N' => FieldType::Number,
            b'L' => FieldType::Logical,
            _ => FieldType::Unknown,
        }
    }

    /// Returns true for the two numeric subkinds.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::FloatingPoint | FieldType::Number)
    }
}

/// Descriptor for a single column of the table.
///
/// `offset` is the byte position of the field's value within a record,
/// assigned cumulatively starting at 1 (after the deletion marker).
#[derive(Clone, Debug, PartialEq)]
pub struct DbfField {
    name: String,
    field_type: FieldType,
    length: usize,
    precision: usize,
    offset: usize,
}

impl DbfField {
    /// Construct a field descriptor.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        length: usize,
        precision: usize,
        offset: usize,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            length,
            precision,
            offset,
        }
    }

    /// Column name, decoded through the code page active at open time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Logical column type.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Byte length of the field's value within a record.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Decimal precision; meaningful for numeric fields only.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Byte offset of the field's value within a record.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_bytes_map_to_field_types() {
        assert_eq!(FieldType::from_type_byte(b'C'), FieldType::Character);
        assert_eq!(FieldType::from_type_byte(b'D'), FieldType::Date);
        assert_eq!(FieldType::from_type_byte(b'F'), FieldType::FloatingPoint);
        assert_eq!(FieldType::from_type_byte(b'N'), FieldType::Number);
        assert_eq!(FieldType::from_type_byte(b'L'), FieldType::Logical);
        assert_eq!(FieldType::from_type_byte(b'M'), FieldType::Unknown);
        assert_eq!(FieldType::from_type_byte(0), FieldType::Unknown);
    }

    #[test]
    fn numeric_subkinds() {
        assert!(FieldType::Number.is_numeric());
        assert!(FieldType::FloatingPoint.is_numeric());
        assert!(!FieldType::Character.is_numeric());
        assert!(!FieldType::Logical.is_numeric());
    }

    #[test]
    fn descriptor_accessors() {
        let f = DbfField::new("PRICE", FieldType::Number, 10, 2, 21);
        assert_eq!(f.name(), "PRICE");
        assert_eq!(f.field_type(), FieldType::Number);
        assert_eq!(f.length(), 10);
        assert_eq!(f.precision(), 2);
        assert_eq!(f.offset(), 21);
    }
}
