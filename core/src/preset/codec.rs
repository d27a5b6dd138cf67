//! Preset codec
//!
//! A preset is one JSON object with a section per rule category:
//!
//! ```json
//! {
//!   "Menu":     { "MapMenu": [ { "effectName": "Bloom", "state": false, "menuName": "MapMenu", "uniforms": [] } ] },
//!   "Time":     { "0000003C|Tamriel|Skyrim.esm": [ { "effectName": "Night", "startTime": 20.0, "stopTime": 23.59, ... } ] },
//!   "Weather":  { ... },
//!   "Interior": { ... }
//! }
//! ```
//!
//! Sections carry no type tag; which rule shape a section holds is fixed by
//! its key. Categories are encoded and decoded independently so one broken
//! section does not cost the others.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use toggler_types::{Category, MAX_UNIFORM_ELEMENTS, RuleBook, RuleSet, ToggleRule};

use super::{DOCUMENT_KEY, PresetError};

/// One category that could not be encoded or decoded
#[derive(Debug)]
pub struct CategoryFailure {
    pub category: Category,
    pub error: PresetError,
}

/// Output of [`encode`]: the document plus any categories left out of it
#[derive(Debug)]
pub struct Encoded {
    pub document: String,
    pub failures: Vec<CategoryFailure>,
}

impl Encoded {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

type EncodeFn = fn(&RuleBook) -> Result<Value, PresetError>;
type DecodeFn = fn(&Value, &mut RuleBook) -> Result<(), PresetError>;

struct SectionCodec {
    category: Category,
    encode: EncodeFn,
    decode: DecodeFn,
}

const SECTIONS: [SectionCodec; 4] = [
    SectionCodec {
        category: Category::Menu,
        encode: encode_menu,
        decode: decode_menu,
    },
    SectionCodec {
        category: Category::Time,
        encode: encode_time,
        decode: decode_time,
    },
    SectionCodec {
        category: Category::Weather,
        encode: encode_weather,
        decode: decode_weather,
    },
    SectionCodec {
        category: Category::Interior,
        encode: encode_interior,
        decode: decode_interior,
    },
];

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Serialize the rule book, best effort.
///
/// A category that fails to encode is left out of the document and reported
/// in [`Encoded::failures`]; the rest are still written.
pub fn encode(book: &RuleBook) -> Result<Encoded, PresetError> {
    let mut document = Map::new();
    let mut failures = Vec::new();

    for section in &SECTIONS {
        match (section.encode)(book) {
            Ok(value) => {
                document.insert(section.category.name().to_string(), value);
            }
            Err(error) => {
                tracing::error!(
                    category = %section.category,
                    error = %error,
                    "Failed to encode rules"
                );
                failures.push(CategoryFailure {
                    category: section.category,
                    error,
                });
            }
        }
    }

    let document = serde_json::to_string_pretty(&Value::Object(document)).map_err(|source| {
        PresetError::Serialization {
            key: DOCUMENT_KEY.to_string(),
            source,
        }
    })?;

    Ok(Encoded { document, failures })
}

/// Parse a preset document into `book`.
///
/// If the document is not a JSON object nothing changes. Otherwise each
/// category is replaced only when its section decodes cleanly; the others
/// keep their previous rules. Returns [`PresetError::Incomplete`] unless all
/// four sections succeeded.
pub fn decode(text: &str, book: &mut RuleBook) -> Result<(), PresetError> {
    let document: Map<String, Value> =
        serde_json::from_str(text).map_err(|source| PresetError::Serialization {
            key: DOCUMENT_KEY.to_string(),
            source,
        })?;

    let mut failures = Vec::new();
    for section in &SECTIONS {
        let key = section.category.name();
        let result = match document.get(key) {
            Some(value) => (section.decode)(value, book),
            None => Err(PresetError::MissingKey(key.to_string())),
        };

        if let Err(error) = result {
            tracing::warn!(category = %section.category, error = %error, "Rules not loaded");
            failures.push(CategoryFailure {
                category: section.category,
                error,
            });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(PresetError::Incomplete(failures))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Reject rules the document cannot carry or a later decode would refuse.
fn check_set<R: ToggleRule>(category: Category, set: &RuleSet<R>) -> Result<(), PresetError> {
    for (context, rules) in set {
        let key = || format!("{}/{}", category.name(), context);
        for rule in rules {
            // serde_json writes NaN and infinities as null
            if let Some(field) = rule.non_finite_field() {
                return Err(PresetError::NonFinite { key: key(), field });
            }
            for uniform in &rule.base().uniforms {
                let len = uniform.max_len();
                if len > MAX_UNIFORM_ELEMENTS {
                    return Err(PresetError::InvalidUniform {
                        key: key(),
                        uniform: uniform.name.clone(),
                        len,
                    });
                }
            }
        }
    }
    Ok(())
}

fn encode_set<R>(category: Category, set: &RuleSet<R>) -> Result<Value, PresetError>
where
    R: ToggleRule + Serialize,
{
    check_set(category, set)?;
    serde_json::to_value(set).map_err(|source| PresetError::Serialization {
        key: category.name().to_string(),
        source,
    })
}

/// Decode a section into a fresh rule set, rejecting oversized uniforms.
fn decode_set<R>(category: Category, value: &Value) -> Result<RuleSet<R>, PresetError>
where
    R: ToggleRule + DeserializeOwned,
{
    let set: RuleSet<R> =
        serde_json::from_value(value.clone()).map_err(|source| PresetError::Serialization {
            key: category.name().to_string(),
            source,
        })?;

    check_set(category, &set)?;
    Ok(set)
}

fn encode_menu(book: &RuleBook) -> Result<Value, PresetError> {
    encode_set(Category::Menu, &book.menu)
}

fn encode_time(book: &RuleBook) -> Result<Value, PresetError> {
    encode_set(Category::Time, &book.time)
}

fn encode_weather(book: &RuleBook) -> Result<Value, PresetError> {
    encode_set(Category::Weather, &book.weather)
}

fn encode_interior(book: &RuleBook) -> Result<Value, PresetError> {
    encode_set(Category::Interior, &book.interior)
}

fn decode_menu(value: &Value, book: &mut RuleBook) -> Result<(), PresetError> {
    book.menu = decode_set(Category::Menu, value)?;
    Ok(())
}

fn decode_time(value: &Value, book: &mut RuleBook) -> Result<(), PresetError> {
    book.time = decode_set(Category::Time, value)?;
    Ok(())
}

fn decode_weather(value: &Value, book: &mut RuleBook) -> Result<(), PresetError> {
    book.weather = decode_set(Category::Weather, value)?;
    Ok(())
}

fn decode_interior(value: &Value, book: &mut RuleBook) -> Result<(), PresetError> {
    book.interior = decode_set(Category::Interior, value)?;
    Ok(())
}
