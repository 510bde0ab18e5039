#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ktest_core::ktest::{KTest, KTestObject};

/// Engine stand-in: copies `<unit stem>.fixtures/*` into the `-output-dir`.
/// Units named `hang*` then block until killed.
const FAKE_ENGINE: &str = r#"
out=""
unit=""
for arg in "$@"; do
  case "$arg" in
    -output-dir=*) out="${arg#-output-dir=}" ;;
  esac
  unit="$arg"
done
mkdir -p "$out"
fixtures="${unit%.ll}.fixtures"
if [ -d "$fixtures" ]; then
  cp "$fixtures"/* "$out"/
fi
case "${unit##*/}" in
  hang*) exec sleep 30 ;;
esac
"#;

pub fn int_record(name: &str, value: i32) -> KTest {
    KTest::new(3, vec![], 0, 0, vec![KTestObject::new(name, value.to_le_bytes().to_vec())])
}

/// Write `<name>.ll` and the records the fake engine will emit for it.
pub fn write_unit(root: &Path, name: &str, records: &[KTest]) -> PathBuf {
    let unit = root.join(format!("{name}.ll"));
    fs::write(&unit, "; ModuleID = 'fixture'\n").expect("write unit");
    let fixtures = root.join(format!("{name}.fixtures"));
    fs::create_dir_all(&fixtures).expect("fixtures dir");
    for (i, record) in records.iter().enumerate() {
        fs::write(fixtures.join(format!("test{:06}.ktest", i + 1)), record.to_bytes())
            .expect("write ktest");
    }
    unit
}

/// Write the fake engine plus a JSON config pointing at it; returns the config path.
pub fn write_fake_engine_config(root: &Path) -> PathBuf {
    write_fake_engine_config_with_timeout(root, 30.0)
}

pub fn write_fake_engine_config_with_timeout(root: &Path, timeout_secs: f64) -> PathBuf {
    let script = root.join("fake-engine.sh");
    fs::write(&script, FAKE_ENGINE).expect("write engine script");
    let config = root.join("ktest-suite.json");
    let body = serde_json::json!({
        "engine": "sh",
        "engine_args": [script],
        "timeout_secs": timeout_secs,
    });
    fs::write(&config, serde_json::to_string_pretty(&body).unwrap()).expect("write config");
    config
}

pub fn leftover_output_dirs(root: &Path) -> Vec<PathBuf> {
    fs::read_dir(root)
        .expect("read root")
        .map(|e| e.expect("entry").path())
        .filter(|p| p.file_name().is_some_and(|n| n.to_string_lossy().starts_with("klee-out")))
        .collect()
}
