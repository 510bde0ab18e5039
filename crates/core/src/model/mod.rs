//! Test-suite document model.
//!
//! Field names follow the JSON document consumed by the downstream test
//! reuse tooling (`funcName`, `srcFile`, `testCases`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::values::{TypedValue, ValueType};

/// One typed input of a test case.
///
/// `data` is always the textual rendering, whatever the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVar {
    pub name: String,
    pub data: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl From<&TypedValue> for InputVar {
    fn from(value: &TypedValue) -> Self {
        Self { name: value.name.clone(), data: value.rendered(), value_type: value.value_type() }
    }
}

/// One generated test case (one surviving record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub inputs: Vec<InputVar>,
    /// Never populated by the generator.
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    pub description: String,
    #[serde(default)]
    pub reserved: bool,
}

impl TestCase {
    pub fn new(inputs: Vec<InputVar>, ordinal: usize) -> Self {
        Self {
            inputs,
            outputs: BTreeMap::new(),
            description: format!("test case {ordinal} generated"),
            reserved: false,
        }
    }
}

/// Suite-level metadata that is constant for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteMetadata {
    pub description: String,
    pub func_name: String,
    pub src_file: String,
}

impl Default for SuiteMetadata {
    fn default() -> Self {
        Self {
            description: "new test suite generated".to_string(),
            func_name: "test".to_string(),
            src_file: "./test.c".to_string(),
        }
    }
}

/// The persisted test-suite document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub coverage: f64,
    pub description: String,
    pub executed: bool,
    #[serde(rename = "funcName")]
    pub func_name: String,
    #[serde(rename = "srcFile")]
    pub src_file: String,
    #[serde(rename = "testCases")]
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(metadata: &SuiteMetadata, test_cases: Vec<TestCase>) -> Self {
        Self {
            coverage: 0.0,
            description: metadata.description.clone(),
            executed: false,
            func_name: metadata.func_name.clone(),
            src_file: metadata.src_file.clone(),
            test_cases,
        }
    }
}
