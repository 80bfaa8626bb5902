//! Value codecs - per-type parse/format glue
//!
//! A codec turns the word list stored on a core into a typed value and
//! back. Each typed wrapper is a [`ConfigVariable`](super::ConfigVariable)
//! parameterized by one of these codecs.

use std::fmt::Display;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;

use knobs_types::VariableType;

use super::cache::{PlainReloadLock, ReentrantReloadLock, ReloadLock};
use crate::error::{ParseError, ParseResult};

/// Parse/format capability for one variable type
pub trait ValueCodec: Send + Sync + 'static {
    /// Parsed value type
    type Value: Clone + Send + Sync + 'static;

    /// Lock taken while a cache reparses its value
    type Lock: ReloadLock;

    /// Type recorded on the core when a default is declared
    const TYPE: VariableType;

    /// Value returned when nothing (or nothing valid) is available
    fn zero() -> Self::Value;

    /// Parse a single word
    fn parse(word: &str) -> ParseResult<Self::Value>;

    /// Format a value as a single word
    fn format(value: &Self::Value) -> String;

    /// Parse a whole word list
    ///
    /// Scalar types read the first word; an empty list is the zero value.
    fn parse_words(words: &[String]) -> ParseResult<Self::Value> {
        match words.first() {
            Some(word) => Self::parse(word),
            None => Ok(Self::zero()),
        }
    }

    /// Format a value as a whole word list
    fn format_words(value: &Self::Value) -> Vec<String> {
        vec![Self::format(value)]
    }
}

// ============================================================================
// Scalar parsing helpers
// ============================================================================

/// Parse a boolean word
///
/// Accepts `1/0`, `true/false`, `#t/#f`, `yes/no` and `on/off` in any case.
/// An empty word is `false`.
pub fn parse_bool(word: &str) -> ParseResult<bool> {
    match word.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "#t" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "#f" | "no" | "off" => Ok(false),
        _ => Err(ParseError::InvalidBool(word.to_string())),
    }
}

/// Parse an integer word in decimal or `0x` hexadecimal, with optional sign
pub fn parse_int(word: &str) -> ParseResult<i64> {
    let trimmed = word.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let (negative, digits) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (digits, radix) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (digits, 10),
    };
    // One sign only, and only before the `0x` prefix
    if digits.starts_with(['+', '-']) {
        return Err(ParseError::InvalidInt(word.to_string()));
    }
    let parsed = u64::from_str_radix(digits, radix);
    let magnitude = parsed.map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => ParseError::IntOutOfRange(word.to_string()),
        _ => ParseError::InvalidInt(word.to_string()),
    })?;

    if negative {
        if magnitude == i64::MIN.unsigned_abs() {
            Ok(i64::MIN)
        } else {
            i64::try_from(magnitude)
                .map(|v| -v)
                .map_err(|_| ParseError::IntOutOfRange(word.to_string()))
        }
    } else {
        i64::try_from(magnitude).map_err(|_| ParseError::IntOutOfRange(word.to_string()))
    }
}

/// Parse a floating-point word; an empty word is `0.0`
pub fn parse_double(word: &str) -> ParseResult<f64> {
    let trimmed = word.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse()
        .map_err(|_| ParseError::InvalidDouble(word.to_string()))
}

// ============================================================================
// Codecs
// ============================================================================

/// Codec for [`ConfigBool`](super::ConfigBool)
///
/// Uses a reentrant reload lock: a bool read may happen on the same thread
/// while that bool's cache is reloading.
pub struct BoolCodec;

impl ValueCodec for BoolCodec {
    type Value = bool;
    type Lock = ReentrantReloadLock;
    const TYPE: VariableType = VariableType::Bool;

    fn zero() -> bool {
        false
    }

    fn parse(word: &str) -> ParseResult<bool> {
        parse_bool(word)
    }

    fn format(value: &bool) -> String {
        let word = if *value { "1" } else { "0" };
        word.to_string()
    }
}

/// Codec for [`ConfigInt`](super::ConfigInt)
pub struct IntCodec;

impl ValueCodec for IntCodec {
    type Value = i32;
    type Lock = PlainReloadLock;
    const TYPE: VariableType = VariableType::Int;

    fn zero() -> i32 {
        0
    }

    fn parse(word: &str) -> ParseResult<i32> {
        let wide = parse_int(word)?;
        i32::try_from(wide).map_err(|_| ParseError::IntOutOfRange(word.to_string()))
    }

    fn format(value: &i32) -> String {
        value.to_string()
    }
}

/// Codec for [`ConfigInt64`](super::ConfigInt64)
pub struct Int64Codec;

impl ValueCodec for Int64Codec {
    type Value = i64;
    type Lock = PlainReloadLock;
    const TYPE: VariableType = VariableType::Int64;

    fn zero() -> i64 {
        0
    }

    fn parse(word: &str) -> ParseResult<i64> {
        parse_int(word)
    }

    fn format(value: &i64) -> String {
        value.to_string()
    }
}

/// Codec for [`ConfigDouble`](super::ConfigDouble)
///
/// Formatting uses the shortest representation that parses back to the
/// same value, so `-0.0` and extreme magnitudes round-trip.
pub struct DoubleCodec;

impl ValueCodec for DoubleCodec {
    type Value = f64;
    type Lock = PlainReloadLock;
    const TYPE: VariableType = VariableType::Double;

    fn zero() -> f64 {
        0.0
    }

    fn parse(word: &str) -> ParseResult<f64> {
        parse_double(word)
    }

    fn format(value: &f64) -> String {
        format!("{:?}", value)
    }
}

/// Codec for [`ConfigString`](super::ConfigString)
///
/// The value is the whole word list joined by spaces. A value is written as
/// a single word so embedded whitespace survives.
pub struct StringCodec;

impl ValueCodec for StringCodec {
    type Value = String;
    type Lock = PlainReloadLock;
    const TYPE: VariableType = VariableType::String;

    fn zero() -> String {
        String::new()
    }

    fn parse(word: &str) -> ParseResult<String> {
        Ok(word.to_string())
    }

    fn format(value: &String) -> String {
        value.clone()
    }

    fn parse_words(words: &[String]) -> ParseResult<String> {
        Ok(words.join(" "))
    }
}

/// Codec for [`ConfigFilename`](super::ConfigFilename)
pub struct FilenameCodec;

impl ValueCodec for FilenameCodec {
    type Value = PathBuf;
    type Lock = PlainReloadLock;
    const TYPE: VariableType = VariableType::Filename;

    fn zero() -> PathBuf {
        PathBuf::new()
    }

    fn parse(word: &str) -> ParseResult<PathBuf> {
        Ok(PathBuf::from(word))
    }

    fn format(value: &PathBuf) -> String {
        value.to_string_lossy().into_owned()
    }

    fn parse_words(words: &[String]) -> ParseResult<PathBuf> {
        Ok(PathBuf::from(words.join(" ")))
    }
}

/// Codec for [`ConfigList`](super::ConfigList)
///
/// The value is the word list itself.
pub struct ListCodec;

impl ValueCodec for ListCodec {
    type Value = Vec<String>;
    type Lock = PlainReloadLock;
    const TYPE: VariableType = VariableType::List;

    fn zero() -> Vec<String> {
        Vec::new()
    }

    fn parse(word: &str) -> ParseResult<Vec<String>> {
        Ok(vec![word.to_string()])
    }

    fn format(value: &Vec<String>) -> String {
        value.join(" ")
    }

    fn parse_words(words: &[String]) -> ParseResult<Vec<String>> {
        Ok(words.to_vec())
    }

    fn format_words(value: &Vec<String>) -> Vec<String> {
        value.clone()
    }
}

/// Codec for [`ConfigEnum<T>`](super::ConfigEnum)
///
/// Any `FromStr + Display` type works; `#[derive(ConfigEnum)]` generates
/// both for fieldless enums. The zero value is `T::default()`. Parsing runs
/// user code, so the reload lock is reentrant.
pub struct EnumCodec<T>(PhantomData<fn() -> T>);

impl<T> ValueCodec for EnumCodec<T>
where
    T: FromStr + Display + Clone + Default + Send + Sync + 'static,
    T::Err: Display,
{
    type Value = T;
    type Lock = ReentrantReloadLock;
    const TYPE: VariableType = VariableType::Enum;

    fn zero() -> T {
        T::default()
    }

    fn parse(word: &str) -> ParseResult<T> {
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return Ok(T::default());
        }
        trimmed.parse().map_err(|e: T::Err| ParseError::InvalidEnum {
            value: word.to_string(),
            type_name: std::any::type_name::<T>(),
            reason: e.to_string(),
        })
    }

    fn format(value: &T) -> String {
        value.to_string()
    }
}
