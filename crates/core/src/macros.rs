//! Declaration and notify macros

/// Define an idempotent startup function
///
/// The body runs the first time the function is called; later calls
/// return immediately, including calls racing the first one.
///
/// ```ignore
/// knobs_core::configure!(pub fn config_display() {
///     knobs_core::variables::set_strict_defaults(true);
/// });
/// ```
#[macro_export]
macro_rules! configure {
    ($vis:vis fn $name:ident() $body:block) => {
        $vis fn $name() {
            static ONCE: ::std::sync::Once = ::std::sync::Once::new();
            ONCE.call_once(|| $body);
        }
    };
}

/// Declare a category proxy static and its policy type
///
/// The category is created on first use, so the static can be touched
/// from any initializer. The parent is either another category (proxy or
/// `&'static Category`) or a full name that may not exist yet.
///
/// ```ignore
/// knobs_core::declare_category!(pub DISPLAY, "display");
/// knobs_core::declare_category!(pub GSG, "gsg", parent = DISPLAY);
/// knobs_core::declare_category!(pub LOADER, "loader", parent_name = "pgraph");
/// ```
#[macro_export]
macro_rules! declare_category {
    (@define $vis:vis $ident:ident, $name:expr, $parent:expr) => {
        $crate::paste::paste! {
            #[doc(hidden)]
            $vis struct [<$ident:camel Category>];

            impl $crate::notify::CategoryPolicy for [<$ident:camel Category>] {
                fn get_category() -> &'static $crate::notify::Category {
                    $crate::notify::get_category($name, $parent)
                }
            }

            $vis static $ident: $crate::notify::CategoryProxy<[<$ident:camel Category>]> =
                $crate::notify::CategoryProxy::new();
        }
    };
    ($vis:vis $ident:ident, $name:expr, parent = $parent:expr) => {
        $crate::declare_category!(
            @define $vis $ident,
            $name,
            $crate::notify::CategoryParent::Category($crate::notify::CategoryRef::category(&$parent))
        );
    };
    ($vis:vis $ident:ident, $name:expr, parent_name = $parent:expr) => {
        $crate::declare_category!(
            @define $vis $ident,
            $name,
            $crate::notify::CategoryParent::from($parent)
        );
    };
    ($vis:vis $ident:ident, $name:expr) => {
        $crate::declare_category!(@define $vis $ident, $name, $crate::notify::CategoryParent::Root);
    };
}

/// Declare a lazily constructed variable wrapper static
///
/// ```ignore
/// knobs_core::declare_variable!(pub RETRIES: ConfigInt = ("net-retries", 3, "Connection attempts"));
/// knobs_core::declare_variable!(SYNC_VIDEO: ConfigBool = ("sync-video"));
/// ```
#[macro_export]
macro_rules! declare_variable {
    ($vis:vis $ident:ident: $ty:ty = ($name:expr, $default:expr, $description:expr)) => {
        $vis static $ident: ::std::sync::LazyLock<$ty> =
            ::std::sync::LazyLock::new(|| <$ty>::new($name, $default, $description));
    };
    ($vis:vis $ident:ident: $ty:ty = ($name:expr)) => {
        $vis static $ident: ::std::sync::LazyLock<$ty> =
            ::std::sync::LazyLock::new(|| <$ty>::bind($name));
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __knobs_notify {
    ($cat:expr, $severity:expr, $($arg:tt)+) => {{
        let category = $crate::notify::CategoryRef::category(&$cat);
        let severity = $severity;
        if category.is_on(severity) {
            let mut out = category.out(severity, false);
            let _ = ::std::fmt::Write::write_fmt(&mut out, format_args!($($arg)+));
        }
    }};
}

/// Report a spam-level message on a category
#[macro_export]
macro_rules! knobs_spam {
    ($cat:expr, $($arg:tt)+) => {
        $crate::__knobs_notify!($cat, $crate::Severity::Spam, $($arg)+)
    };
}

/// Report a debug-level message on a category
#[macro_export]
macro_rules! knobs_debug {
    ($cat:expr, $($arg:tt)+) => {
        $crate::__knobs_notify!($cat, $crate::Severity::Debug, $($arg)+)
    };
}

/// Report an info-level message on a category
#[macro_export]
macro_rules! knobs_info {
    ($cat:expr, $($arg:tt)+) => {
        $crate::__knobs_notify!($cat, $crate::Severity::Info, $($arg)+)
    };
}

/// Report a warning on a category
#[macro_export]
macro_rules! knobs_warning {
    ($cat:expr, $($arg:tt)+) => {
        $crate::__knobs_notify!($cat, $crate::Severity::Warning, $($arg)+)
    };
}

/// Report an error on a category
#[macro_export]
macro_rules! knobs_error {
    ($cat:expr, $($arg:tt)+) => {
        $crate::__knobs_notify!($cat, $crate::Severity::Error, $($arg)+)
    };
}

/// Report a fatal condition on a category
///
/// Logged at error level; the process keeps running.
#[macro_export]
macro_rules! knobs_fatal {
    ($cat:expr, $($arg:tt)+) => {
        $crate::__knobs_notify!($cat, $crate::Severity::Fatal, $($arg)+)
    };
}
