//! The class table: a hierarchical namespace of class descriptors, resolved
//! segment by segment from a dotted path.

use crate::class::ClassDescriptor;
use crate::error::AtriumError;
use crate::id::ClassName;
use std::collections::BTreeMap;
use std::sync::Arc;

enum Node {
    Namespace(Namespace),
    Class(Arc<ClassDescriptor>),
}

#[derive(Default)]
struct Namespace {
    children: BTreeMap<String, Node>,
}

/// Registration table of every class the application defines.
///
/// Populated once at start-up and then shared read-only. A path such as
/// `app.model.Greeting` walks the namespaces `app` and `model` and ends at
/// the class `Greeting`; a path that stops at a namespace does not resolve.
#[derive(Default)]
pub struct ClassTable {
    root: Namespace,
    len: usize,
}

fn split(path: &str) -> Result<Vec<&str>, AtriumError> {
    let segments: Vec<&str> = path.split('.').collect();
    if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(AtriumError::ClassNotFound(path.to_owned()));
    }
    Ok(segments)
}

impl ClassTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a class under its dotted path, creating namespaces on the way.
    pub fn define(&mut self, descriptor: ClassDescriptor) -> Result<Arc<ClassDescriptor>, AtriumError> {
        let path = descriptor.name().as_str().to_owned();
        let segments =
            split(&path).map_err(|_| AtriumError::NamespaceConflict(path.clone()))?;
        let (last, namespaces) = segments
            .split_last()
            .ok_or_else(|| AtriumError::NamespaceConflict(path.clone()))?;

        let mut current = &mut self.root;
        for segment in namespaces {
            let node = current
                .children
                .entry((*segment).to_owned())
                .or_insert_with(|| Node::Namespace(Namespace::default()));
            current = match node {
                Node::Namespace(ns) => ns,
                Node::Class(_) => return Err(AtriumError::NamespaceConflict(path)),
            };
        }
        if current.children.contains_key(*last) {
            return Err(AtriumError::NamespaceConflict(path));
        }
        let descriptor = Arc::new(descriptor);
        current
            .children
            .insert((*last).to_owned(), Node::Class(Arc::clone(&descriptor)));
        self.len += 1;
        tracing::debug!(class = %path, "class defined");
        Ok(descriptor)
    }

    /// Builder-style [`define`](Self::define).
    pub fn with(mut self, descriptor: ClassDescriptor) -> Result<Self, AtriumError> {
        self.define(descriptor)?;
        Ok(self)
    }

    /// Resolve a dotted path to its descriptor.
    pub fn resolve(&self, path: &str) -> Result<Arc<ClassDescriptor>, AtriumError> {
        let not_found = || AtriumError::ClassNotFound(path.to_owned());
        let segments = split(path)?;
        let mut current = &self.root;
        let mut found = None;
        for (i, segment) in segments.iter().enumerate() {
            match current.children.get(*segment).ok_or_else(not_found)? {
                Node::Namespace(ns) => current = ns,
                Node::Class(descriptor) if i + 1 == segments.len() => {
                    found = Some(Arc::clone(descriptor));
                }
                Node::Class(_) => return Err(not_found()),
            }
        }
        found.ok_or_else(not_found)
    }

    /// Whether `path` resolves to a class.
    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_ok()
    }

    /// Number of classes defined.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no class is defined.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every defined class path, sorted.
    pub fn class_names(&self) -> Vec<ClassName> {
        fn walk(ns: &Namespace, prefix: &str, out: &mut Vec<ClassName>) {
            for (name, node) in &ns.children {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                match node {
                    Node::Namespace(child) => walk(child, &path, out),
                    Node::Class(_) => out.push(ClassName::new(path)),
                }
            }
        }
        let mut out = Vec::with_capacity(self.len);
        walk(&self.root, "", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;

    struct Plain;
    impl Class for Plain {}

    fn table() -> ClassTable {
        ClassTable::new()
            .with(ClassDescriptor::new("app.model.Hi", |_| Plain))
            .unwrap()
            .with(ClassDescriptor::new("app.page.Home", |_| Plain))
            .unwrap()
    }

    #[test]
    fn resolves_nested_paths() {
        let t = table();
        assert_eq!(t.resolve("app.model.Hi").unwrap().name().as_str(), "app.model.Hi");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn missing_segment_is_not_found() {
        let t = table();
        assert!(matches!(t.resolve("app.model.Bye"), Err(AtriumError::ClassNotFound(_))));
        assert!(matches!(t.resolve("nope.model.Hi"), Err(AtriumError::ClassNotFound(_))));
    }

    #[test]
    fn namespace_is_not_a_class() {
        let t = table();
        assert!(matches!(t.resolve("app.model"), Err(AtriumError::ClassNotFound(_))));
    }

    #[test]
    fn path_through_a_class_is_not_found() {
        let t = table();
        assert!(matches!(t.resolve("app.model.Hi.Inner"), Err(AtriumError::ClassNotFound(_))));
    }

    #[test]
    fn malformed_paths_are_not_found() {
        let t = table();
        for path in ["", ".", "app..Hi", "app.model.", ".app"] {
            assert!(
                matches!(t.resolve(path), Err(AtriumError::ClassNotFound(p)) if p == path),
                "{path:?}"
            );
        }
    }

    #[test]
    fn redefinition_conflicts() {
        let mut t = table();
        let err = t.define(ClassDescriptor::new("app.model.Hi", |_| Plain)).unwrap_err();
        assert!(matches!(err, AtriumError::NamespaceConflict(_)));
        let err = t.define(ClassDescriptor::new("app.model", |_| Plain)).unwrap_err();
        assert!(matches!(err, AtriumError::NamespaceConflict(_)));
        let err = t.define(ClassDescriptor::new("app.model.Hi.X", |_| Plain)).unwrap_err();
        assert!(matches!(err, AtriumError::NamespaceConflict(_)));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn class_names_are_sorted_paths() {
        let names: Vec<String> = table().class_names().into_iter().map(|c| c.0).collect();
        assert_eq!(names, vec!["app.model.Hi", "app.page.Home"]);
    }
}
