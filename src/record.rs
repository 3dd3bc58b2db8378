//! Record container: ordered typed values plus deletion flag and index.

use chrono::NaiveDate;

use crate::field::DbfField;

/// A single typed field value.
///
/// The variant is resolved once per field from the schema's logical type,
/// never inferred from the bytes at decode time.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Missing or unrecognized value.
    Null,
    /// Character field content.
    Text(String),
    /// Date field content; `None` when the stored digits form no valid date.
    Date(Option<NaiveDate>),
    /// Numeric field content (both numeric subkinds).
    Number(f64),
    /// Logical field content.
    Boolean(bool),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// A transient record: values mirroring the table schema, a deletion flag,
/// and the absolute index of the record within the table (if persisted).
///
/// Records are created fresh on every cursor dereference, or constructed by a
/// caller for append/update. They are never shared between table handles.
#[derive(Clone, Debug, PartialEq)]
pub struct DbfRecord {
    fields: Vec<DbfField>,
    values: Vec<Value>,
    deleted: bool,
    index: Option<usize>,
}

impl DbfRecord {
    /// Build a template record over a schema: all values null, not deleted,
    /// no persisted index.
    pub fn template(fields: Vec<DbfField>) -> Self {
        let values = vec![Value::Null; fields.len()];
        Self {
            fields,
            values,
            deleted: false,
            index: None,
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field descriptor at `index`.
    pub fn field(&self, index: usize) -> Option<&DbfField> {
        self.fields.get(index)
    }

    /// All field descriptors in schema order.
    pub fn fields(&self) -> &[DbfField] {
        &self.fields
    }

    /// Position of the field named `name`, if any.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Value at field position `index`.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the field named `name`.
    pub fn value_by_name(&self, name: &str) -> Option<&Value> {
        self.field_index(name).and_then(|i| self.value(i))
    }

    /// All values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Replace the value at field position `index`.
    ///
    /// Returns false when the index is out of range.
    pub fn set_value(&mut self, index: usize, value: Value) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Replace the value of the field named `name`.
    pub fn set_value_by_name(&mut self, name: &str, value: Value) -> bool {
        match self.field_index(name) {
            Some(i) => self.set_value(i, value),
            None => false,
        }
    }

    /// Reset every value to null.
    pub fn clear_values(&mut self) {
        for v in &mut self.values {
            *v = Value::Null;
        }
    }

    /// Logical deletion flag.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Set the logical deletion flag.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Absolute record index within the table, when the record came from or
    /// targets a persisted slot.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Tag the record with its absolute index.
    pub fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn sample_fields() -> Vec<DbfField> {
        vec![
            DbfField::new("NAME", FieldType::Character, 20, 0, 1),
            DbfField::new("PRICE", FieldType::Number, 10, 2, 21),
        ]
    }

    #[test]
    fn template_is_null_and_active() {
        let rec = DbfRecord::template(sample_fields());
        assert_eq!(rec.len(), 2);
        assert!(!rec.is_deleted());
        assert_eq!(rec.index(), None);
        assert!(rec.values().iter().all(Value::is_null));
    }

    #[test]
    fn value_access_by_name() {
        let mut rec = DbfRecord::template(sample_fields());
        assert!(rec.set_value_by_name("PRICE", Value::Number(9.5)));
        assert_eq!(rec.value_by_name("PRICE"), Some(&Value::Number(9.5)));
        assert_eq!(rec.value_by_name("MISSING"), None);
        assert!(!rec.set_value_by_name("MISSING", Value::Null));
    }

    #[test]
    fn set_value_bounds() {
        let mut rec = DbfRecord::template(sample_fields());
        assert!(rec.set_value(0, Value::Text("X".to_string())));
        assert!(!rec.set_value(5, Value::Null));
    }

    #[test]
    fn clear_values_resets_to_null() {
        let mut rec = DbfRecord::template(sample_fields());
        rec.set_value(0, Value::Text("X".to_string()));
        rec.set_value(1, Value::Number(1.0));
        rec.clear_values();
        assert!(rec.values().iter().all(Value::is_null));
    }
}
