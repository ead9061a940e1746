//! Template stores.
//!
//! A store maps a class name to raw template text. It does not parse or
//! validate anything; the text is opaque until activation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::runner::ds::error::ConstructionError;

/// File extension of templates in a [`DirTemplateStore`].
pub const TEMPLATE_EXTENSION: &str = "class";

pub trait TemplateStore {
    /// Raw template text for `class_name`, or `TemplateNotFound`.
    fn load(&self, class_name: &str) -> Result<String, ConstructionError>;

    /// Where the template for `class_name` is expected (for diagnostics).
    fn location(&self, class_name: &str) -> String;
}

/// Templates stored as `<root>/<class>.class` files.
#[derive(Debug, Clone)]
pub struct DirTemplateStore {
    root: PathBuf,
}

impl DirTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirTemplateStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, class_name: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", class_name, TEMPLATE_EXTENSION))
    }
}

impl TemplateStore for DirTemplateStore {
    fn load(&self, class_name: &str) -> Result<String, ConstructionError> {
        let path = self.path_for(class_name);
        debug!(class = class_name, path = %path.display(), "reading template");
        match fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ConstructionError::TemplateNotFound {
                    class: class_name.to_string(),
                    location: path.display().to_string(),
                })
            }
            Err(source) => Err(ConstructionError::TemplateUnreadable {
                class: class_name.to_string(),
                location: path,
                source,
            }),
        }
    }

    fn location(&self, class_name: &str) -> String {
        self.path_for(class_name).display().to_string()
    }
}

/// Templates held in memory, keyed by class name.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    templates: HashMap<String, String>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        MemoryTemplateStore {
            templates: HashMap::new(),
        }
    }

    pub fn with_template(mut self, class_name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(class_name, text);
        self
    }

    pub fn insert(&mut self, class_name: impl Into<String>, text: impl Into<String>) {
        self.templates.insert(class_name.into(), text.into());
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self, class_name: &str) -> Result<String, ConstructionError> {
        self.templates
            .get(class_name)
            .cloned()
            .ok_or_else(|| ConstructionError::TemplateNotFound {
                class: class_name.to_string(),
                location: self.location(class_name),
            })
    }

    fn location(&self, class_name: &str) -> String {
        format!("memory:{}", class_name)
    }
}

/// Wraps another store and keeps every template it has loaded.
///
/// Misses are not cached; a template added later is still found.
pub struct CachedTemplateStore<S: TemplateStore> {
    inner: S,
    cache: RefCell<HashMap<String, String>>,
}

impl<S: TemplateStore> CachedTemplateStore<S> {
    pub fn new(inner: S) -> Self {
        CachedTemplateStore {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_classes(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn invalidate(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<S: TemplateStore> TemplateStore for CachedTemplateStore<S> {
    fn load(&self, class_name: &str) -> Result<String, ConstructionError> {
        if let Some(text) = self.cache.borrow().get(class_name) {
            return Ok(text.clone());
        }
        let text = self.inner.load(class_name)?;
        self.cache
            .borrow_mut()
            .insert(class_name.to_string(), text.clone());
        Ok(text)
    }

    fn location(&self, class_name: &str) -> String {
        self.inner.location(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_store_reads_class_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("menu.class"), "class menu for __MENU__ {}").unwrap();
        let store = DirTemplateStore::new(dir.path());
        assert_eq!(store.load("menu").unwrap(), "class menu for __MENU__ {}");
    }

    #[test]
    fn test_dir_store_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirTemplateStore::new(dir.path());
        match store.load("filelist").unwrap_err() {
            ConstructionError::TemplateNotFound { class, location } => {
                assert_eq!(class, "filelist");
                assert!(location.ends_with("filelist.class"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_memory_store_missing_template() {
        let store = MemoryTemplateStore::new().with_template("menu", "x");
        assert!(store.load("menu").is_ok());
        assert!(matches!(
            store.load("statusbar"),
            Err(ConstructionError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn test_cache_keeps_first_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.class");
        fs::write(&path, "first").unwrap();
        let store = CachedTemplateStore::new(DirTemplateStore::new(dir.path()));
        assert_eq!(store.load("menu").unwrap(), "first");
        fs::write(&path, "second").unwrap();
        assert_eq!(store.load("menu").unwrap(), "first");
        assert_eq!(store.cached_classes(), 1);
        store.invalidate();
        assert_eq!(store.load("menu").unwrap(), "second");
    }

    #[test]
    fn test_cache_does_not_remember_misses() {
        let dir = tempfile::tempdir().unwrap();
        let store = CachedTemplateStore::new(DirTemplateStore::new(dir.path()));
        assert!(store.load("menu").is_err());
        fs::write(dir.path().join("menu.class"), "late").unwrap();
        assert_eq!(store.load("menu").unwrap(), "late");
    }
}
