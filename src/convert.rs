/*!
Typed conversion of parsed fields.

Parsing only ever produces text. This module turns that text into
[`Value`]s with a [`TypeRegistry`] of conversion functions keyed by a type
id, and a [`Schema`] that says which type id applies to which column.

There is no process wide registry: build one and pass it around.

```
use fastcsv::convert::{Schema, TypeRegistry, Value};
use fastcsv::Reader;

let registry = TypeRegistry::with_primitives();
let schema = Schema::new(&registry)
    .column("bool")
    .column("i32")
    .column("f64?");

let mut rdr = Reader::from_text("true,42,\n");
let record = rdr.read_record()?.unwrap();
assert_eq!(
    schema.convert(&record)?,
    vec![Value::Bool(true), Value::I32(42), Value::Null],
);
# Ok::<(), fastcsv::Error>(())
```
*/

use std::collections::HashMap;
use std::error;
use std::fmt;
use std::result;
use std::sync::Arc;

use fastcsv_core::Record;

/// The separator between the items of a [`Value::List`] when it is rendered
/// as a single field.
pub const LIST_SEPARATOR: char = '|';

/// A typed field value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// An absent value. Nullable type ids produce it for empty fields.
    Null,
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    I8(i8),
    /// A 16-bit signed integer.
    I16(i16),
    /// A 32-bit signed integer.
    I32(i32),
    /// A 64-bit signed integer.
    I64(i64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// A single character.
    Char(char),
    /// Text, unchanged.
    Str(String),
    /// A list of values packed into one field.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    /// Render this value the way it is written to a field.
    ///
    /// `Null` renders as nothing and list items are separated by
    /// [`LIST_SEPARATOR`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Null => Ok(()),
            Value::Bool(b) => f.write_str(if b { "true" } else { "false" }),
            Value::I8(n) => f.write_str(itoa::Buffer::new().format(n)),
            Value::I16(n) => f.write_str(itoa::Buffer::new().format(n)),
            Value::I32(n) => f.write_str(itoa::Buffer::new().format(n)),
            Value::I64(n) => f.write_str(itoa::Buffer::new().format(n)),
            Value::F32(n) => f.write_str(ryu::Buffer::new().format(n)),
            Value::F64(n) => f.write_str(ryu::Buffer::new().format(n)),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(ref s) => f.write_str(s),
            Value::List(ref items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", LIST_SEPARATOR)?;
                    }
                    item.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

/// The reason a conversion failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConvertErrorKind {
    /// No converter is registered under the type id.
    UnknownType,
    /// The converter rejected the text, with its explanation.
    Invalid(String),
}

/// An error converting a field to a typed value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConvertError {
    column: Option<usize>,
    type_id: String,
    text: String,
    kind: ConvertErrorKind,
}

impl ConvertError {
    /// The column of the offending field, when converting a whole record.
    pub fn column(&self) -> Option<usize> {
        self.column
    }

    /// The type id that was requested.
    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// The text that failed to convert.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Why the conversion failed.
    pub fn kind(&self) -> &ConvertErrorKind {
        &self.kind
    }

    fn at_column(self, column: usize) -> ConvertError {
        ConvertError { column: Some(column), ..self }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conversion error")?;
        if let Some(column) = self.column {
            write!(f, ": column {}", column)?;
        }
        match self.kind {
            ConvertErrorKind::UnknownType => {
                write!(f, ": no converter for type {:?}", self.type_id)
            }
            ConvertErrorKind::Invalid(ref why) => write!(
                f,
                ": {:?} is not a valid {}: {}",
                self.text, self.type_id, why
            ),
        }
    }
}

impl error::Error for ConvertError {}

type Converter =
    Arc<dyn Fn(&str) -> result::Result<Value, String> + Send + Sync>;

/// A set of conversion functions keyed by type id.
pub struct TypeRegistry {
    converters: HashMap<String, Converter>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> =
            self.converters.keys().map(|id| &**id).collect();
        ids.sort();
        f.debug_struct("TypeRegistry").field("types", &ids).finish()
    }
}

impl Default for TypeRegistry {
    fn default() -> TypeRegistry {
        TypeRegistry::new()
    }
}

macro_rules! primitive {
    ($registry:expr, $id:expr, $ty:ty, $variant:ident) => {{
        $registry.register($id, |text: &str| {
            text.parse::<$ty>().map(Value::$variant).map_err(|e| e.to_string())
        });
        $registry.register(concat!($id, "?"), |text: &str| {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            text.parse::<$ty>().map(Value::$variant).map_err(|e| e.to_string())
        });
    }};
}

impl TypeRegistry {
    /// Create a registry with no converters.
    pub fn new() -> TypeRegistry {
        TypeRegistry { converters: HashMap::new() }
    }

    /// Create a registry that knows the primitive types.
    ///
    /// The type ids are `bool`, `i8`, `i16`, `i32`, `i64`, `f32`, `f64`,
    /// `char` and `string`. Each also has a nullable variant with a `?`
    /// suffix (such as `i32?`) that converts an empty field to
    /// [`Value::Null`].
    ///
    /// Text is parsed with Rust's own `FromStr` rules and is never trimmed.
    pub fn with_primitives() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        primitive!(registry, "bool", bool, Bool);
        primitive!(registry, "i8", i8, I8);
        primitive!(registry, "i16", i16, I16);
        primitive!(registry, "i32", i32, I32);
        primitive!(registry, "i64", i64, I64);
        primitive!(registry, "f32", f32, F32);
        primitive!(registry, "f64", f64, F64);
        primitive!(registry, "char", char, Char);
        registry.register("string", |text: &str| {
            Ok(Value::Str(text.to_string()))
        });
        registry.register("string?", |text: &str| {
            if text.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Str(text.to_string()))
            }
        });
        registry
    }

    /// Register `convert` under `id`, replacing any converter already
    /// registered under it.
    ///
    /// A converter reports failure with a short explanation.
    pub fn register<F>(&mut self, id: &str, convert: F) -> &mut TypeRegistry
    where
        F: Fn(&str) -> result::Result<Value, String> + Send + Sync + 'static,
    {
        self.converters.insert(id.to_string(), Arc::new(convert));
        self
    }

    /// Register a converter for lists packed into one field, where each item
    /// is converted with the converter registered under `item_id`.
    ///
    /// Items are separated by [`LIST_SEPARATOR`]. An empty field is an empty
    /// list.
    pub fn register_list(
        &mut self,
        id: &str,
        item_id: &str,
    ) -> result::Result<&mut TypeRegistry, ConvertError> {
        let item = Arc::clone(self.lookup(item_id, "")?);
        Ok(self.register(id, move |text: &str| {
            if text.is_empty() {
                return Ok(Value::List(vec![]));
            }
            text.split(LIST_SEPARATOR)
                .map(|piece| item(piece))
                .collect::<result::Result<Vec<Value>, String>>()
                .map(Value::List)
        }))
    }

    /// Returns true if a converter is registered under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.converters.contains_key(id)
    }

    /// Convert `text` with the converter registered under `id`.
    pub fn convert(
        &self,
        id: &str,
        text: &str,
    ) -> result::Result<Value, ConvertError> {
        let convert = self.lookup(id, text)?;
        convert(text).map_err(|why| ConvertError {
            column: None,
            type_id: id.to_string(),
            text: text.to_string(),
            kind: ConvertErrorKind::Invalid(why),
        })
    }

    fn lookup(
        &self,
        id: &str,
        text: &str,
    ) -> result::Result<&Converter, ConvertError> {
        self.converters.get(id).ok_or_else(|| unknown(id, text))
    }
}

fn unknown(id: &str, text: &str) -> ConvertError {
    ConvertError {
        column: None,
        type_id: id.to_string(),
        text: text.to_string(),
        kind: ConvertErrorKind::UnknownType,
    }
}

/// An ordered list of type ids applied to the fields of a record, one per
/// column.
///
/// Fields past the last typed column are kept as [`Value::Str`].
#[derive(Clone, Debug)]
pub struct Schema<'r> {
    registry: &'r TypeRegistry,
    columns: Vec<String>,
}

impl<'r> Schema<'r> {
    /// Create a schema with no typed columns.
    pub fn new(registry: &'r TypeRegistry) -> Schema<'r> {
        Schema { registry, columns: vec![] }
    }

    /// Append a column converted with the type registered under `id`.
    pub fn column(mut self, id: &str) -> Schema<'r> {
        self.columns.push(id.to_string());
        self
    }

    /// Append one column per type id.
    pub fn columns<I, T>(mut self, ids: I) -> Schema<'r>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.columns.extend(ids.into_iter().map(|id| id.as_ref().to_string()));
        self
    }

    /// The number of typed columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no column is typed.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Convert every field of `record`.
    ///
    /// The first field that fails to convert aborts the conversion.
    pub fn convert(
        &self,
        record: &Record,
    ) -> result::Result<Vec<Value>, ConvertError> {
        let mut values = Vec::with_capacity(record.len());
        for (i, field) in record.iter().enumerate() {
            let value = match self.columns.get(i) {
                Some(id) => self
                    .registry
                    .convert(id, field)
                    .map_err(|err| err.at_column(i))?,
                None => Value::Str(field.to_string()),
            };
            values.push(value);
        }
        Ok(values)
    }
}
