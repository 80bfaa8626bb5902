//! Output sink for one notify message

use std::fmt::{self, Write};

use knobs_types::Severity;

use super::category::Category;

/// Text sink returned by [`Category::out`] and friends
///
/// Complete lines are forwarded to `tracing` as they are written, with the
/// category's full name in the `category` field. Any unterminated tail is
/// forwarded when the stream is dropped. A stream whose category is not on
/// for its severity discards everything without formatting it.
pub struct CategoryStream {
    category: &'static Category,
    severity: Severity,
    enabled: bool,
    prefix: Option<String>,
    buffer: String,
}

impl CategoryStream {
    pub(crate) fn new(category: &'static Category, severity: Severity, prefix: bool) -> Self {
        let enabled = category.is_on(severity);
        let prefix = (enabled && prefix).then(|| format!("{}({}): ", category.fullname(), severity));
        Self {
            category,
            severity,
            enabled,
            prefix,
            buffer: String::new(),
        }
    }

    /// Check if written text will be reported
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> &'static Category {
        self.category
    }

    /// Text written since the last complete line
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Forward any unterminated text now
    pub fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.emit(&line);
        }
    }

    fn emit(&self, line: &str) {
        let prefix = self.prefix.as_deref().unwrap_or("");
        let category = self.category.fullname();
        match self.severity {
            Severity::Unspecified => {}
            Severity::Spam => tracing::trace!(category, "{}{}", prefix, line),
            Severity::Debug => tracing::debug!(category, "{}{}", prefix, line),
            Severity::Info => tracing::info!(category, "{}{}", prefix, line),
            Severity::Warning => tracing::warn!(category, "{}{}", prefix, line),
            Severity::Error => tracing::error!(category, "{}{}", prefix, line),
            Severity::Fatal => tracing::error!(category, fatal = true, "{}{}", prefix, line),
        }
    }
}

impl Write for CategoryStream {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if !self.enabled {
            return Ok(());
        }
        self.buffer.push_str(s);
        while let Some(end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=end).collect();
            self.emit(line.trim_end_matches('\n'));
        }
        Ok(())
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        if !self.enabled {
            return Ok(());
        }
        fmt::write(self, args)
    }
}

impl Drop for CategoryStream {
    fn drop(&mut self) {
        self.flush();
    }
}

impl fmt::Debug for CategoryStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryStream")
            .field("category", &self.category.fullname())
            .field("severity", &self.severity)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::registry::{get_category, CategoryParent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted(&'static AtomicUsize);

    impl fmt::Display for Counted {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.fetch_add(1, Ordering::Relaxed);
            f.write_str("counted")
        }
    }

    #[test]
    fn test_disabled_stream_skips_formatting() {
        static FORMATTED: AtomicUsize = AtomicUsize::new(0);

        let category = get_category("stream-test-quiet", CategoryParent::Root);
        category.set_severity(Severity::Error);

        let mut out = category.debug(true);
        assert!(!out.is_enabled());
        write!(out, "value {}", Counted(&FORMATTED)).unwrap();
        assert_eq!(FORMATTED.load(Ordering::Relaxed), 0);
        assert_eq!(out.pending(), "");
    }

    #[test]
    fn test_enabled_stream_buffers_partial_line() {
        let category = get_category("stream-test-loud", CategoryParent::Root);
        category.set_severity(Severity::Spam);

        let mut out = category.info(false);
        assert!(out.is_enabled());
        write!(out, "first line\nsecond").unwrap();
        assert_eq!(out.pending(), "second");
        out.flush();
        assert_eq!(out.pending(), "");
    }

    #[test]
    fn test_fatal_follows_threshold() {
        let category = get_category("stream-test-fatal", CategoryParent::Root);
        category.set_severity(Severity::Fatal);
        assert!(category.fatal(true).is_enabled());
        assert!(!category.error(true).is_enabled());
    }
}
