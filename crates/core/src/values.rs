//! Heuristic typing of symbolic object payloads.
//!
//! The engine only records raw bytes per object. To build readable test cases
//! each payload is classified by an ordered list of rules; the first rule that
//! matches decides the type:
//!
//! 1. exactly 1 byte: `char`
//! 2. exactly 4 bytes: `int` (little-endian, signed)
//! 3. all bytes ASCII and length not a multiple of 4: `string`
//! 4. anything else: `int array` (little-endian signed 32-bit words)

use serde::{Deserialize, Serialize};

use crate::ktest::{trim_trailing_zeros, KTestObject};

/// Type assigned to an object payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    #[serde(rename = "char")]
    Char,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int array")]
    IntArray,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Char => "char",
            ValueType::Int => "int",
            ValueType::String => "string",
            ValueType::IntArray => "int array",
        }
    }
}

/// A payload interpreted under its classified type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Char(char),
    Int(i32),
    String(String),
    IntArray(Vec<i32>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Char(_) => ValueType::Char,
            Value::Int(_) => ValueType::Int,
            Value::String(_) => ValueType::String,
            Value::IntArray(_) => ValueType::IntArray,
        }
    }

    /// Textual form stored in the test-suite document.
    pub fn render(&self) -> String {
        match self {
            Value::Char(c) => c.to_string(),
            Value::Int(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::IntArray(items) => {
                let parts: Vec<String> = items.iter().map(i32::to_string).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

/// A named object after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedValue {
    pub name: String,
    pub value: Value,
}

impl TypedValue {
    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    pub fn rendered(&self) -> String {
        self.value.render()
    }
}

/// One classification rule: a guard on the payload and the decoder used when
/// the guard holds.
struct Rule {
    value_type: ValueType,
    applies: fn(&[u8]) -> bool,
    decode: fn(&[u8]) -> Value,
}

/// Classification rules in priority order.
static RULES: [Rule; 4] = [
    Rule { value_type: ValueType::Char, applies: |b| b.len() == 1, decode: decode_char },
    Rule { value_type: ValueType::Int, applies: |b| b.len() == 4, decode: decode_int },
    Rule {
        value_type: ValueType::String,
        applies: |b| b.is_ascii() && b.len() % 4 != 0,
        decode: decode_string,
    },
    Rule { value_type: ValueType::IntArray, applies: |_| true, decode: decode_int_array },
];

/// Type the first matching rule assigns to `bytes`.
pub fn classify(bytes: &[u8]) -> ValueType {
    rule_for(bytes).value_type
}

/// Interpret `bytes` under the first matching rule.
pub fn interpret(bytes: &[u8]) -> Value {
    (rule_for(bytes).decode)(bytes)
}

/// Interpret one record object, keeping its name.
pub fn interpret_object(object: &KTestObject) -> TypedValue {
    TypedValue { name: object.name.clone(), value: interpret(&object.bytes) }
}

fn rule_for(bytes: &[u8]) -> &'static Rule {
    // The last rule accepts everything, so the search always succeeds.
    RULES.iter().find(|rule| (rule.applies)(bytes)).unwrap_or(&RULES[RULES.len() - 1])
}

fn decode_char(bytes: &[u8]) -> Value {
    Value::Char(char::from(bytes[0]))
}

fn decode_int(bytes: &[u8]) -> Value {
    Value::Int(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn decode_string(bytes: &[u8]) -> Value {
    Value::String(trim_trailing_zeros(bytes).iter().map(|&b| char::from(b)).collect())
}

fn decode_int_array(bytes: &[u8]) -> Value {
    Value::IntArray(bytes.chunks(4).map(word_le).collect())
}

/// Little-endian signed word; a short final chunk is read at its own width and
/// sign-extended.
fn word_le(chunk: &[u8]) -> i32 {
    let fill = match chunk.last() {
        Some(&last) if last & 0x80 != 0 => 0xFF,
        _ => 0x00,
    };
    let mut raw = [fill; 4];
    raw[..chunk.len()].copy_from_slice(chunk);
    i32::from_le_bytes(raw)
}
