//! Global category registry
//!
//! Categories are interned by full name. Requesting the same name twice
//! returns the same `&'static Category`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::LazyLock;

use parking_lot::RwLock;

use knobs_types::Severity;

use super::category::{Category, CATEGORY_SEPARATOR};
use crate::variables::find_variable;

/// Name of the variable holding the root threshold
pub const NOTIFY_LEVEL: &str = "notify-level";

/// Threshold used when nothing in a category's chain sets one
static DEFAULT_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

static ROOT: LazyLock<&'static Category> = LazyLock::new(|| {
    let severity = configured_severity(NOTIFY_LEVEL);
    let root: &'static Category = Box::leak(Box::new(Category::new("", None, severity)));
    root
});

static CATEGORIES: LazyLock<RwLock<HashMap<String, &'static Category>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Where a new category hangs in the tree
#[derive(Debug, Clone, Copy)]
pub enum CategoryParent<'a> {
    /// Directly under the root
    Root,
    /// Under an existing category
    Category(&'static Category),
    /// Under the category with this full name, created if needed
    Name(&'a str),
}

impl From<&'static Category> for CategoryParent<'_> {
    fn from(category: &'static Category) -> Self {
        CategoryParent::Category(category)
    }
}

impl<'a> From<&'a str> for CategoryParent<'a> {
    fn from(name: &'a str) -> Self {
        if name.is_empty() {
            CategoryParent::Root
        } else {
            CategoryParent::Name(name)
        }
    }
}

impl<'a> From<Option<&'a str>> for CategoryParent<'a> {
    fn from(name: Option<&'a str>) -> Self {
        name.map_or(CategoryParent::Root, CategoryParent::from)
    }
}

/// Name of the variable holding a category's threshold
pub fn level_variable_name(fullname: &str) -> String {
    if fullname.is_empty() {
        NOTIFY_LEVEL.to_string()
    } else {
        format!("{}-{}", NOTIFY_LEVEL, fullname)
    }
}

/// Threshold configured for a category, `Unspecified` if none
///
/// Reads the variable registry only; never touches the category lock.
fn configured_severity(variable: &str) -> Severity {
    let Some(core) = find_variable(variable) else {
        return Severity::Unspecified;
    };
    let word = core.string_value();
    match word.parse::<Severity>() {
        Ok(severity) => severity,
        Err(err) => {
            tracing::warn!(variable, error = %err, "Ignoring invalid notify level");
            Severity::Unspecified
        }
    }
}

/// Full name of a category called `basename` under a parent named `parent`
///
/// A name already qualified with the parent's prefix is taken as-is.
fn qualify(parent: &str, basename: &str) -> String {
    if parent.is_empty() || basename.starts_with(&format!("{}{}", parent, CATEGORY_SEPARATOR)) {
        basename.to_string()
    } else {
        format!("{}{}{}", parent, CATEGORY_SEPARATOR, basename)
    }
}

/// The root category
pub fn root_category() -> &'static Category {
    *ROOT
}

/// Look up an existing category by full name
pub fn find_category(fullname: &str) -> Option<&'static Category> {
    if fullname.is_empty() {
        return Some(root_category());
    }
    CATEGORIES.read().get(fullname).copied()
}

/// Get or create the category `basename` under `parent`
///
/// Returns the same instance for the same resulting full name. A name
/// containing `:` without an explicit parent creates its ancestors.
pub fn get_category<'a>(basename: &str, parent: impl Into<CategoryParent<'a>>) -> &'static Category {
    let parent = match parent.into() {
        CategoryParent::Root => {
            // "a:b" under the root means "b" under "a"
            match basename.rsplit_once(CATEGORY_SEPARATOR) {
                Some((ancestor, _)) if !ancestor.is_empty() => {
                    get_category(ancestor, CategoryParent::Root)
                }
                _ => root_category(),
            }
        }
        CategoryParent::Category(category) => category,
        CategoryParent::Name(name) => get_category(name, CategoryParent::Root),
    };

    let fullname = qualify(parent.fullname(), basename);
    if fullname.is_empty() {
        return root_category();
    }
    if let Some(existing) = find_category(&fullname) {
        return existing;
    }

    // Resolve the configured level before taking the category lock
    let severity = configured_severity(&level_variable_name(&fullname));

    let mut categories = CATEGORIES.write();
    if let Some(existing) = categories.get(&fullname) {
        return *existing;
    }

    let category: &'static Category =
        Box::leak(Box::new(Category::new(&fullname, Some(parent), severity)));
    parent.add_child(category);
    categories.insert(fullname, category);
    drop(categories);

    tracing::trace!(category = category.fullname(), "Created notify category");
    category
}

/// Number of categories created so far, excluding the root
pub fn category_count() -> usize {
    CATEGORIES.read().len()
}

/// Full names of every created category, sorted
pub fn category_names() -> Vec<String> {
    let mut names: Vec<String> = CATEGORIES.read().keys().cloned().collect();
    names.sort();
    names
}

/// Set the threshold used when no category in a chain sets one
pub fn set_default_severity(severity: Severity) {
    let severity = if severity.is_unspecified() {
        Severity::Info
    } else {
        severity
    };
    DEFAULT_SEVERITY.store(severity as u8, Ordering::Relaxed);
}

/// Threshold used when no category in a chain sets one
pub fn default_severity() -> Severity {
    Severity::from_u8(DEFAULT_SEVERITY.load(Ordering::Relaxed))
}

/// Re-read `notify-level` and `notify-level-<name>` for every category
///
/// Categories whose variable is absent keep their current threshold.
pub fn apply_config_levels() {
    let mut categories: Vec<&'static Category> = CATEGORIES.read().values().copied().collect();
    categories.push(root_category());

    for category in categories {
        let severity = configured_severity(&level_variable_name(category.fullname()));
        if !severity.is_unspecified() {
            category.set_severity(severity);
        }
    }
}
