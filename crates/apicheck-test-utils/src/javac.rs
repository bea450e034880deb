use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::sync::OnceLock;

use tempfile::TempDir;

#[derive(Debug)]
pub struct JavacOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl JavacOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Classes compiled into a temporary directory that lives as long as this value.
#[derive(Debug)]
pub struct CompiledClasses {
    dir: TempDir,
    pub output: JavacOutput,
}

impl CompiledClasses {
    /// Root of the compiled class tree (suitable as a classpath entry).
    pub fn classes_dir(&self) -> PathBuf {
        self.dir.path().join("out")
    }
}

/// Compiles the given `(relative path, source)` pairs with `javac -d out`.
///
/// The classpath is always set explicitly so `javac` doesn't inherit `CLASSPATH` from the
/// environment.
pub fn compile_java(files: &[(&str, &str)]) -> io::Result<CompiledClasses> {
    let dir = TempDir::new()?;
    for (name, src) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, src)?;
    }

    let mut cmd = Command::new("javac");
    cmd.current_dir(dir.path());
    cmd.args(["-encoding", "UTF-8", "-classpath", "."]);
    cmd.arg("-d");
    cmd.arg(dir.path().join("out"));
    for (name, _) in files {
        cmd.arg(name);
    }

    let out = cmd.output()?;
    let output = JavacOutput {
        status: out.status,
        stdout: String::from_utf8_lossy(&out.stdout).to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).to_string(),
    };
    Ok(CompiledClasses { dir, output })
}

/// Convenience helper for tests: locate whether `javac` is available.
pub fn javac_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| match Command::new("javac").arg("-version").output() {
        Ok(out) => out.status.success(),
        Err(err) => {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::debug!(
                    target: "apicheck.test_utils",
                    error = %err,
                    "failed to run `javac -version`"
                );
            }
            false
        }
    })
}
