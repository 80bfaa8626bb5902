//! Notify category - one node of the diagnostic channel tree

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;

use knobs_types::Severity;

use super::registry::default_severity;
use super::stream::CategoryStream;

/// Separator between levels of a category's full name
pub const CATEGORY_SEPARATOR: char = ':';

/// A named diagnostic channel with its own severity threshold
///
/// Categories are interned by full name and never freed, so they are
/// always handed out as `&'static Category`. A category refers to its
/// parent but does not own it.
pub struct Category {
    fullname: String,
    basename: String,
    parent: Option<&'static Category>,
    /// Explicit threshold, `Unspecified` to inherit from the parent
    severity: AtomicU8,
    children: RwLock<Vec<&'static Category>>,
}

impl Category {
    pub(crate) fn new(
        fullname: &str,
        parent: Option<&'static Category>,
        severity: Severity,
    ) -> Self {
        let basename = fullname
            .rsplit(CATEGORY_SEPARATOR)
            .next()
            .unwrap_or(fullname)
            .to_string();
        Self {
            fullname: fullname.to_string(),
            basename,
            parent,
            severity: AtomicU8::new(severity as u8),
            children: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_child(&self, child: &'static Category) {
        self.children.write().push(child);
    }

    /// Full colon-separated name; empty for the root
    pub fn fullname(&self) -> &str {
        &self.fullname
    }

    /// Last component of the full name
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Parent category, `None` for the root
    pub fn parent(&self) -> Option<&'static Category> {
        self.parent
    }

    /// Direct children, in creation order
    pub fn children(&self) -> Vec<&'static Category> {
        self.children.read().clone()
    }

    /// Check if this is the root category
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Explicitly set threshold, `Unspecified` if inherited
    pub fn explicit_severity(&self) -> Severity {
        Severity::from_u8(self.severity.load(Ordering::Relaxed))
    }

    /// Effective threshold, following the parent chain for inherited values
    pub fn severity(&self) -> Severity {
        let mut category = self;
        loop {
            let severity = category.explicit_severity();
            if !severity.is_unspecified() {
                return severity;
            }
            match category.parent {
                Some(parent) => category = parent,
                None => return default_severity(),
            }
        }
    }

    /// Override the threshold; `Unspecified` reverts to inheriting
    pub fn set_severity(&self, severity: Severity) {
        self.severity.store(severity as u8, Ordering::Relaxed);
    }

    /// Revert to the parent's threshold
    pub fn clear_severity(&self) {
        self.set_severity(Severity::Unspecified);
    }

    /// Check if messages of `severity` would be reported
    pub fn is_on(&self, severity: Severity) -> bool {
        !severity.is_unspecified() && severity >= self.severity()
    }

    pub fn is_spam(&self) -> bool {
        self.is_on(Severity::Spam)
    }

    pub fn is_debug(&self) -> bool {
        self.is_on(Severity::Debug)
    }

    pub fn is_info(&self) -> bool {
        self.is_on(Severity::Info)
    }

    pub fn is_warning(&self) -> bool {
        self.is_on(Severity::Warning)
    }

    pub fn is_error(&self) -> bool {
        self.is_on(Severity::Error)
    }

    pub fn is_fatal(&self) -> bool {
        self.is_on(Severity::Fatal)
    }

    // ==================== OUTPUT SINKS ====================

    /// Sink for a message of `severity`
    ///
    /// The sink discards everything if the category is not on for that
    /// severity. With `prefix`, the text starts with `name(severity): `.
    pub fn out(&'static self, severity: Severity, prefix: bool) -> CategoryStream {
        CategoryStream::new(self, severity, prefix)
    }

    pub fn spam(&'static self, prefix: bool) -> CategoryStream {
        self.out(Severity::Spam, prefix)
    }

    pub fn debug(&'static self, prefix: bool) -> CategoryStream {
        self.out(Severity::Debug, prefix)
    }

    pub fn info(&'static self, prefix: bool) -> CategoryStream {
        self.out(Severity::Info, prefix)
    }

    pub fn warning(&'static self, prefix: bool) -> CategoryStream {
        self.out(Severity::Warning, prefix)
    }

    pub fn error(&'static self, prefix: bool) -> CategoryStream {
        self.out(Severity::Error, prefix)
    }

    /// Sink for fatal messages
    ///
    /// Reporting a fatal message never terminates the process.
    pub fn fatal(&'static self, prefix: bool) -> CategoryStream {
        self.out(Severity::Fatal, prefix)
    }
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("fullname", &self.fullname)
            .field("severity", &self.explicit_severity())
            .field("children", &self.children.read().len())
            .finish()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leak(category: Category) -> &'static Category {
        Box::leak(Box::new(category))
    }

    #[test]
    fn test_names() {
        let parent = leak(Category::new("display", None, Severity::Info));
        let child = leak(Category::new("display:gsg", Some(parent), Severity::Unspecified));
        assert_eq!(child.fullname(), "display:gsg");
        assert_eq!(child.basename(), "gsg");
        assert_eq!(parent.basename(), "display");
        assert!(std::ptr::eq(child.parent().unwrap(), parent));
    }

    #[test]
    fn test_inherits_until_overridden() {
        let parent = leak(Category::new("inherit", None, Severity::Warning));
        let child = leak(Category::new("inherit:child", Some(parent), Severity::Unspecified));

        assert_eq!(child.severity(), Severity::Warning);
        assert!(!child.is_info());
        assert!(child.is_error());

        child.set_severity(Severity::Debug);
        assert!(child.is_debug());
        assert!(!child.is_spam());
        assert!(!parent.is_debug());

        child.clear_severity();
        assert_eq!(child.severity(), Severity::Warning);

        // Parent changes are seen by inheriting children
        parent.set_severity(Severity::Spam);
        assert!(child.is_spam());
    }

    #[test]
    fn test_unspecified_is_never_on() {
        let category = leak(Category::new("never", None, Severity::Spam));
        assert!(!category.is_on(Severity::Unspecified));
        assert!(category.is_on(Severity::Fatal));
    }
}
