//! Introspection over compiled classes: class directories and jars.

mod translate;

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use apicheck_classfile::{internal_name_to_binary, ClassFile};
use apicheck_core::{IntrospectionProvider, LoadError, TypeDescriptor};

pub use translate::translate_class;

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("classfile error: {0}")]
    ClassFile(#[from] apicheck_classfile::Error),
    #[error("{path} declares {found}, expected {expected}")]
    WrongName {
        path: String,
        expected: String,
        found: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClasspathEntry {
    ClassDir(PathBuf),
    Jar(PathBuf),
}

impl ClasspathEntry {
    /// `.jar` files are archives, anything else is treated as a class directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_jar = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"));
        if is_jar {
            ClasspathEntry::Jar(path)
        } else {
            ClasspathEntry::ClassDir(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ClasspathEntry::ClassDir(p) | ClasspathEntry::Jar(p) => p,
        }
    }

    /// Raw bytes of `<internal name>.class`, or `None` if this entry doesn't contain it.
    fn read_class(&self, internal_name: &str) -> Result<Option<Vec<u8>>, ClasspathError> {
        let relative = format!("{internal_name}.class");
        match self {
            ClasspathEntry::ClassDir(dir) => {
                let path = dir.join(&relative);
                if !path.is_file() {
                    return Ok(None);
                }
                Ok(Some(std::fs::read(path)?))
            }
            ClasspathEntry::Jar(path) => {
                if !path.is_file() {
                    return Ok(None);
                }
                let file = std::fs::File::open(path)?;
                let mut archive = zip::ZipArchive::new(file)?;
                let mut entry = match archive.by_name(&relative) {
                    Ok(entry) => entry,
                    Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                    Err(err) => return Err(err.into()),
                };
                let mut bytes = Vec::with_capacity(entry.size() as usize);
                entry.read_to_end(&mut bytes)?;
                Ok(Some(bytes))
            }
        }
    }

    /// Internal names of every class file in this entry.
    fn class_names(&self) -> Result<Vec<String>, ClasspathError> {
        match self {
            ClasspathEntry::ClassDir(dir) => {
                let mut out = Vec::new();
                for entry in walkdir::WalkDir::new(dir)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(Result::ok)
                {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if entry.path().extension() != Some(OsStr::new("class")) {
                        continue;
                    }
                    let Ok(relative) = entry.path().strip_prefix(dir) else {
                        continue;
                    };
                    let internal = relative
                        .with_extension("")
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect::<Vec<_>>()
                        .join("/");
                    out.push(internal);
                }
                Ok(out)
            }
            ClasspathEntry::Jar(path) => {
                let file = std::fs::File::open(path)?;
                let archive = zip::ZipArchive::new(file)?;
                Ok(archive
                    .file_names()
                    .filter_map(|name| name.strip_suffix(".class"))
                    .filter(|name| !name.starts_with("META-INF/"))
                    .map(str::to_string)
                    .collect())
            }
        }
    }
}

/// An [`IntrospectionProvider`] reading class files from an ordered list of entries. The
/// first entry containing a class wins.
#[derive(Debug, Clone, Default)]
pub struct ClasspathProvider {
    entries: Vec<ClasspathEntry>,
}

impl ClasspathProvider {
    pub fn new(entries: Vec<ClasspathEntry>) -> Self {
        Self { entries }
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(paths.into_iter().map(ClasspathEntry::from_path).collect())
    }

    pub fn entries(&self) -> &[ClasspathEntry] {
        &self.entries
    }

    /// Parses the class with the given binary name, or `Ok(None)` if no entry has it.
    pub fn load_class_file(&self, binary_name: &str) -> Result<Option<ClassFile>, ClasspathError> {
        let internal = binary_name.replace('.', "/");
        for entry in &self.entries {
            let Some(bytes) = entry.read_class(&internal)? else {
                continue;
            };
            let class = ClassFile::parse(&bytes)?;
            if class.this_class != internal {
                return Err(ClasspathError::WrongName {
                    path: entry.path().display().to_string(),
                    expected: internal,
                    found: class.this_class,
                });
            }
            tracing::debug!(
                target: "apicheck.classpath",
                class = binary_name,
                entry = %entry.path().display(),
                "loaded class file"
            );
            return Ok(Some(class));
        }
        Ok(None)
    }

    /// Candidate names for every top-level reference class on the classpath, i.e. every class
    /// whose simple name is `marker` followed by at least one character.
    pub fn discover_candidates(&self, marker: &str) -> Result<BTreeSet<String>, ClasspathError> {
        let mut out = BTreeSet::new();
        if marker.is_empty() {
            return Ok(out);
        }
        for entry in &self.entries {
            if !entry.path().exists() {
                continue;
            }
            for internal in entry.class_names()? {
                if internal.contains('$') {
                    continue;
                }
                let (package, simple) = match internal.rsplit_once('/') {
                    Some((package, simple)) => (Some(package), simple),
                    None => (None, internal.as_str()),
                };
                let Some(rest) = simple.strip_prefix(marker) else {
                    continue;
                };
                if rest.is_empty() {
                    continue;
                }
                let candidate = match package {
                    Some(package) => format!("{package}/{rest}"),
                    None => rest.to_string(),
                };
                out.insert(internal_name_to_binary(&candidate));
            }
        }
        Ok(out)
    }
}

impl IntrospectionProvider for ClasspathProvider {
    fn load_type(&self, name: &str) -> Result<TypeDescriptor, LoadError> {
        let malformed = |message: String| LoadError::Malformed {
            name: name.to_string(),
            message,
        };
        let class = self
            .load_class_file(name)
            .map_err(|err| malformed(err.to_string()))?
            .ok_or_else(|| LoadError::NotFound(name.to_string()))?;
        translate_class(&class).map_err(|err| malformed(err.to_string()))
    }
}
