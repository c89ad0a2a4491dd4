//! Fragment classification rules
//!
//! Each OCR fragment is classified by the first rule in [`RULES`] that
//! matches it; a fragment no rule claims starts a new item. The order of
//! the table is significant:
//!
//! 1. embedded price, so "Burger 22" is split instead of becoming a bare name
//! 2. standalone price
//! 3. section header, ahead of description and item name so short all-caps
//!    headers are not read as items
//! 4. description, ahead of the default so a continuation line attaches to
//!    the item above it
//!
//! The thresholds and the section vocabulary are tuning constants. Changing
//! them changes how real menus are split, so they are fixed here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Price token at the end of a line, separated from the name by whitespace
static EMBEDDED_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(\$?\d+(\.\d{2})?)$").expect("static regex"));

/// A line that is nothing but a price
static STANDALONE_PRICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?\d+(\.\d{2})?$").expect("static regex"));

/// A single Unicode decimal digit (general category Nd)
static DECIMAL_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d$").expect("static regex"));

/// Lower-case section names recognized regardless of casing
pub const SECTION_VOCABULARY: [&str; 9] = [
    "mains",
    "starters",
    "desserts",
    "drinks",
    "beverages",
    "entrees",
    "sides",
    "salads",
    "appetizers",
];

/// Headers are shorter than this; descriptions longer
pub const SHORT_TEXT_LIMIT: usize = 30;

/// All-caps lines must be longer than this to count as a header
pub const MIN_CAPS_HEADER_LEN: usize = 3;

/// What the merger knows about the item it could still attach to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingItem {
    pub has_price: bool,
    pub has_description: bool,
}

/// Outcome of classifying one trimmed fragment
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Name and price on one line
    EmbeddedPrice { name: String, price: Option<f64> },
    /// Price on its own line; attaches to the pending item if it has none
    StandalonePrice { price: Option<f64> },
    /// Starts a new section
    SectionHeader,
    /// Describes the pending item
    Description,
    /// Name of a new item
    NewItem,
}

/// A named classification rule
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&str, Option<PendingItem>) -> Option<Classification>,
}

/// Classification rules in priority order
pub const RULES: [Rule; 4] = [
    Rule {
        name: "embedded_price",
        matches: embedded_price,
    },
    Rule {
        name: "standalone_price",
        matches: standalone_price,
    },
    Rule {
        name: "section_header",
        matches: section_header,
    },
    Rule {
        name: "description",
        matches: description,
    },
];

/// Classify a trimmed fragment given the current pending item, if any
pub fn classify(text: &str, pending: Option<PendingItem>) -> Classification {
    RULES
        .iter()
        .find_map(|rule| (rule.matches)(text, pending))
        .unwrap_or(Classification::NewItem)
}

/// Parse a price token, ignoring currency symbols and separators.
///
/// Digits from any script are accepted, so Arabic-Indic "٢٢" parses as 22.
pub fn parse_price(token: &str) -> Option<f64> {
    let cleaned: String = token
        .chars()
        .filter_map(|c| match c {
            '.' => Some('.'),
            _ => decimal_digit_value(c).and_then(|d| char::from_digit(d, 10)),
        })
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Whether `c` is a decimal digit in any script.
///
/// Fractions, Roman numerals and other numeric symbols are not digits.
pub fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a decimal digit in any script.
///
/// Unicode encodes every decimal digit set as a contiguous run from zero to
/// nine, and adjacent sets are whole runs of ten, so the value is the offset
/// from the start of the surrounding run of digits, modulo ten.
fn decimal_digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut run_start = c as u32;
    while let Some(previous) = run_start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(previous) {
            break;
        }
        run_start -= 1;
    }
    Some((c as u32 - run_start) % 10)
}

pub fn is_standalone_price(text: &str) -> bool {
    STANDALONE_PRICE.is_match(text)
}

fn embedded_price(text: &str, _pending: Option<PendingItem>) -> Option<Classification> {
    let caps = EMBEDDED_PRICE.captures(text)?;
    let whole = caps.get(0)?;
    let token = caps.get(1)?;

    Some(Classification::EmbeddedPrice {
        name: text[..whole.start()].trim().to_string(),
        price: parse_price(token.as_str()),
    })
}

fn standalone_price(text: &str, _pending: Option<PendingItem>) -> Option<Classification> {
    is_standalone_price(text).then(|| Classification::StandalonePrice {
        price: parse_price(text),
    })
}

fn section_header(text: &str, _pending: Option<PendingItem>) -> Option<Classification> {
    looks_like_section_header(text).then_some(Classification::SectionHeader)
}

fn description(text: &str, pending: Option<PendingItem>) -> Option<Classification> {
    let pending = pending?;
    (!pending.has_description && looks_like_description(text)).then_some(Classification::Description)
}

/// Short, digit-free, and either a known section name or an all-caps word
pub fn looks_like_section_header(text: &str) -> bool {
    let len = text.chars().count();
    if is_standalone_price(text) || len >= SHORT_TEXT_LIMIT || text.chars().any(is_decimal_digit) {
        return false;
    }

    let lowered = text.to_lowercase();
    SECTION_VOCABULARY.contains(&lowered.as_str()) || (is_upper(text) && len > MIN_CAPS_HEADER_LEN)
}

/// Long, comma separated, or running lower-case prose
pub fn looks_like_description(text: &str) -> bool {
    text.chars().count() > SHORT_TEXT_LIMIT
        || text.contains(',')
        || (text.chars().any(char::is_lowercase) && !is_title(text))
}

/// At least one cased character and no lower-case ones
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// Every word starts upper-case and continues lower-case
fn is_title(text: &str) -> bool {
    let mut cased = false;
    let mut previous_cased = false;

    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            cased = true;
        } else {
            previous_cased = false;
        }
    }

    cased
}
