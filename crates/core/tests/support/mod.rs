//! Fixtures shared by the integration tests: KTest builders and a shell
//! script that stands in for the symbolic-execution engine.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ktest_core::config::ToolConfig;
use ktest_core::ktest::{KTest, KTestObject};

/// Fake engine. Copies `<unit stem>.fixtures/*` into the output dir; units
/// whose name contains `hang` then block until killed, units whose name
/// contains `crash` exit non-zero without creating anything. For `linger`
/// units a helper process touches `<output dir>.late` after one second.
const FAKE_ENGINE: &str = r#"
out=""
unit=""
for arg in "$@"; do
  case "$arg" in
    -output-dir=*) out="${arg#-output-dir=}" ;;
  esac
  unit="$arg"
done
base="${unit##*/}"
case "$base" in
  *crash*) exit 3 ;;
esac
mkdir -p "$out"
fixtures="${unit%.ll}.fixtures"
if [ -d "$fixtures" ]; then
  cp "$fixtures"/* "$out"/
fi
case "$base" in
  *hang*) exec sleep 30 ;;
  *linger*) sh -c 'sleep 1; touch "$1"' linger "$out.late" ;;
esac
exit 0
"#;

pub fn record(objects: &[(&str, &[u8])]) -> KTest {
    let objects = objects.iter().map(|(n, b)| KTestObject::new(*n, b.to_vec())).collect();
    KTest::new(3, vec!["prog.bc".into()], 0, 0, objects)
}

/// Scratch workspace with an engine script and helpers to lay out units.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("fake-engine.sh"), FAKE_ENGINE).expect("write engine script");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<name>.ll` plus the records the fake engine will "discover".
    pub fn unit(&self, name: &str, records: &[KTest]) -> PathBuf {
        let unit = self.path().join(format!("{name}.ll"));
        fs::write(&unit, "; ModuleID = 'fixture'\n").expect("write unit");
        let fixtures = self.path().join(format!("{name}.fixtures"));
        fs::create_dir_all(&fixtures).expect("fixtures dir");
        for (i, record) in records.iter().enumerate() {
            let file = fixtures.join(format!("test{:06}.ktest", i + 1));
            fs::write(file, record.to_bytes()).expect("write ktest");
        }
        unit
    }

    /// Drop an extra file next to a unit's records.
    pub fn extra_file(&self, unit_name: &str, file_name: &str, body: &[u8]) {
        let path = self.path().join(format!("{unit_name}.fixtures")).join(file_name);
        fs::write(path, body).expect("write extra fixture");
    }

    pub fn config(&self) -> ToolConfig {
        let script = self.path().join("fake-engine.sh");
        ToolConfig {
            engine: PathBuf::from("sh"),
            engine_args: vec![script.display().to_string()],
            output: self.path().join("test_suite_generated.json"),
            ..ToolConfig::default()
        }
        .with_timeout(Duration::from_secs(30))
    }

    /// Output directories (`klee-out-*`) currently present in the workspace.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(self.path())
            .expect("read workspace")
            .map(|e| e.expect("entry").path())
            .filter(|p| {
                p.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with("klee-out"))
            })
            .collect();
        dirs.sort();
        dirs
    }
}
