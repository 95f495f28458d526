//! Display formatting for currency, plain numbers and ratios.
//!
//! All functions are pure and deterministic for a given [`NumberLocale`].
//! The default locale is Vietnamese (`vi-VN`), matching the Dong amounts the
//! engine is used with:
//!
//! ```
//! use rust_decimal::Decimal;
//! use salary_engine::format::{NumberLocale, format_currency, format_number};
//!
//! let salary = Decimal::from(21_875_000);
//! assert_eq!(format_currency(salary, &NumberLocale::VI_VN), "21.875.000\u{a0}₫");
//! assert_eq!(format_number(salary, &NumberLocale::EN_US), "21,875,000");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Where the currency symbol goes relative to the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// Before the digits, after any minus sign (`-₫1,000`).
    Prefix,
    /// After the digits, separated by a no-break space (`1.000 ₫`).
    Suffix,
}

/// Separators and currency symbol placement for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    /// BCP 47 tag, for display only.
    pub tag: &'static str,
    /// Thousands separator.
    pub group_separator: char,
    /// Decimal separator.
    pub decimal_separator: char,
    /// Currency symbol.
    pub currency_symbol: &'static str,
    /// Currency symbol placement.
    pub symbol_position: SymbolPosition,
}

impl NumberLocale {
    /// Vietnamese formatting of Vietnamese Dong.
    pub const VI_VN: NumberLocale = NumberLocale {
        tag: "vi-VN",
        group_separator: '.',
        decimal_separator: ',',
        currency_symbol: "₫",
        symbol_position: SymbolPosition::Suffix,
    };

    /// US English formatting of Vietnamese Dong.
    pub const EN_US: NumberLocale = NumberLocale {
        tag: "en-US",
        group_separator: ',',
        decimal_separator: '.',
        currency_symbol: "₫",
        symbol_position: SymbolPosition::Prefix,
    };

    /// Looks up a supported locale by tag, case-insensitively.
    pub fn from_tag(tag: &str) -> Option<NumberLocale> {
        [Self::VI_VN, Self::EN_US]
            .into_iter()
            .find(|locale| locale.tag.eq_ignore_ascii_case(tag))
    }
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self::VI_VN
    }
}

const NO_BREAK_SPACE: char = '\u{a0}';

/// Maximum fraction digits shown by [`format_number`].
pub const NUMBER_MAX_FRACTION_DIGITS: u32 = 3;

/// Formats an amount as currency with no decimal places.
///
/// Halves round away from zero.
pub fn format_currency(amount: Decimal, locale: &NumberLocale) -> String {
    let (negative, digits) = grouped(amount, 0, locale);
    let sign = if negative { "-" } else { "" };
    match locale.symbol_position {
        SymbolPosition::Prefix => format!("{}{}{}", sign, locale.currency_symbol, digits),
        SymbolPosition::Suffix => {
            format!("{}{}{}{}", sign, digits, NO_BREAK_SPACE, locale.currency_symbol)
        }
    }
}

/// Formats a number with thousands separators.
///
/// Up to three fraction digits are kept, trailing zeros trimmed.
pub fn format_number(value: Decimal, locale: &NumberLocale) -> String {
    let (negative, digits) = grouped(value, NUMBER_MAX_FRACTION_DIGITS, locale);
    if negative {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Formats a ratio as a percentage with a fixed number of decimals.
///
/// ```
/// use rust_decimal::Decimal;
/// use salary_engine::format::format_percent;
///
/// assert_eq!(format_percent(Decimal::new(875, 3), 2), "87.50%");
/// ```
pub fn format_percent(ratio: Decimal, decimals: u32) -> String {
    let percent = ratio
        .saturating_mul(Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}%", decimals as usize, percent)
}

/// Rounds `value`, then returns its sign and grouped absolute digits.
fn grouped(value: Decimal, max_fraction: u32, locale: &NumberLocale) -> (bool, String) {
    let rounded = value
        .round_dp_with_strategy(max_fraction, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = group_digits(integer, locale.group_separator);
    if let Some(fraction) = fraction {
        out.push(locale.decimal_separator);
        out.push_str(fraction);
    }
    (negative, out)
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
