//! Notify - hierarchical diagnostic categories with severity thresholds
//!
//! Each category has a colon-separated full name (`display:gsg`), an
//! optional explicit threshold, and inherits its parent's threshold when
//! none is set. Thresholds come from `notify-level` and
//! `notify-level-<fullname>` variables at creation time and can be changed
//! at runtime.
//!
//! # Example
//!
//! ```ignore
//! use knobs_core::{declare_category, knobs_info};
//!
//! declare_category!(pub DISPLAY, "display");
//! declare_category!(pub GSG, "gsg", parent = DISPLAY);
//!
//! knobs_info!(GSG, "opened window {}x{}", 800, 600);
//!
//! if GSG.is_debug() {
//!     // expensive diagnostics
//! }
//! ```

mod category;
mod proxy;
mod registry;
mod stream;

pub use self::category::{Category, CATEGORY_SEPARATOR};
pub use self::proxy::{CategoryPolicy, CategoryProxy, CategoryRef};
pub use self::registry::{
    apply_config_levels, category_count, category_names, default_severity, find_category,
    get_category, level_variable_name, root_category, set_default_severity, CategoryParent,
    NOTIFY_LEVEL,
};
pub use self::stream::CategoryStream;
