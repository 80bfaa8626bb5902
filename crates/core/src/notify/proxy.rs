//! Lazily resolved category handles for statics

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::OnceLock;

use super::category::Category;

/// Knows how to find or create one category
///
/// Implemented by the policy types generated by `declare_category!`.
pub trait CategoryPolicy {
    fn get_category() -> &'static Category;
}

/// Static handle to a category that is resolved on first use
///
/// Usable from any initialization context: the category is looked up the
/// first time the proxy is dereferenced, after which every access is a
/// single atomic load.
pub struct CategoryProxy<T: CategoryPolicy> {
    category: OnceLock<&'static Category>,
    _policy: PhantomData<fn() -> T>,
}

impl<T: CategoryPolicy> CategoryProxy<T> {
    pub const fn new() -> Self {
        Self {
            category: OnceLock::new(),
            _policy: PhantomData,
        }
    }

    /// Resolve the category now
    pub fn init(&self) -> &'static Category {
        self.category.get_or_init(T::get_category)
    }

    /// The category, resolving it if needed
    pub fn get(&self) -> &'static Category {
        self.init()
    }

    /// Check if the category has been resolved
    pub fn is_initialized(&self) -> bool {
        self.category.get().is_some()
    }
}

impl<T: CategoryPolicy> Default for CategoryProxy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CategoryPolicy> Deref for CategoryProxy<T> {
    type Target = Category;

    fn deref(&self) -> &Category {
        self.get()
    }
}

/// Anything that resolves to a category: a `&'static Category` or a proxy
///
/// Lets the notify macros accept either form.
pub trait CategoryRef {
    fn category(&self) -> &'static Category;
}

impl CategoryRef for &'static Category {
    fn category(&self) -> &'static Category {
        *self
    }
}

impl<T: CategoryPolicy> CategoryRef for CategoryProxy<T> {
    fn category(&self) -> &'static Category {
        self.get()
    }
}

impl<T: CategoryPolicy> std::fmt::Debug for CategoryProxy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.category.get() {
            Some(category) => f.debug_tuple("CategoryProxy").field(category).finish(),
            None => f.write_str("CategoryProxy(<unresolved>)"),
        }
    }
}
