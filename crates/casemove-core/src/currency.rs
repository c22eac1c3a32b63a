//! # Currencies
//!
//! Steam wallet currency ids and display formatting.
//!
//! ## Locale Styles
//! ```text
//! ┌──────────────┬────────────────────────┬──────────────────────────────┐
//! │ Style        │ Languages              │ 1234.5 EUR                   │
//! ├──────────────┼────────────────────────┼──────────────────────────────┤
//! │ Prefix       │ en, ja, zh, ko, th, he │ €1,234.50                    │
//! │ Dot group    │ de, es, it, nl, pt...  │ 1.234,50 €                   │
//! │ Space group  │ fr, pl, ru, sv, cs...  │ 1 234,50 €                   │
//! └──────────────┴────────────────────────┴──────────────────────────────┘
//! ```
//!
//! Unknown languages use the prefix style. Unknown currency codes render
//! the code itself as the symbol.

use crate::pricing::arith::round_to_cents;

/// ISO codes indexed by Steam wallet currency id minus one.
pub const WALLET_CURRENCIES: [&str; 47] = [
    "USD", "GBP", "EUR", "CHF", "RUB", "PLN", "BRL", "JPY", "NOK", "IDR", "MYR", "PHP", "SGD",
    "THB", "VND", "KRW", "TRY", "UAH", "MXN", "CAD", "AUD", "NZD", "CNY", "INR", "CLP", "PEN",
    "COP", "ZAR", "HKD", "TWD", "SAR", "AED", "SEK", "ARS", "ILS", "BYN", "KZT", "KWD", "QAR",
    "CRC", "UYU", "BGN", "HRK", "CZK", "DKK", "HUF", "RON",
];

/// Currencies displayed without minor units.
const ZERO_DECIMAL: &[&str] = &["JPY", "KRW", "VND", "CLP"];

/// Maps a Steam wallet currency id (1-based) to its ISO code.
///
/// ```rust
/// use casemove_core::currency::currency_for_wallet;
///
/// assert_eq!(currency_for_wallet(3), Some("EUR"));
/// assert_eq!(currency_for_wallet(0), None);
/// ```
pub fn currency_for_wallet(wallet_id: u32) -> Option<&'static str> {
    let index = usize::try_from(wallet_id).ok()?.checked_sub(1)?;
    WALLET_CURRENCIES.get(index).copied()
}

/// Display symbol for an ISO code.
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "GBP" => "£",
        "EUR" => "€",
        "RUB" => "₽",
        "PLN" => "zł",
        "BRL" => "R$",
        "JPY" => "¥",
        "NOK" | "SEK" | "DKK" => "kr",
        "IDR" => "Rp",
        "MYR" => "RM",
        "PHP" => "₱",
        "SGD" => "S$",
        "THB" => "฿",
        "VND" => "₫",
        "KRW" => "₩",
        "TRY" => "₺",
        "UAH" => "₴",
        "MXN" => "MX$",
        "CAD" => "CA$",
        "AUD" => "A$",
        "NZD" => "NZ$",
        "CNY" => "CN¥",
        "INR" => "₹",
        "HKD" => "HK$",
        "TWD" => "NT$",
        "ILS" => "₪",
        "CZK" => "Kč",
        "HUF" => "Ft",
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocaleStyle {
    Prefix,
    DotGroup,
    SpaceGroup,
}

impl LocaleStyle {
    fn for_locale(locale: &str) -> Self {
        let language = locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "tr" | "id" | "da" | "ro" | "hr" | "el" => {
                LocaleStyle::DotGroup
            }
            "fr" | "pl" | "ru" | "sv" | "cs" | "uk" | "no" | "nb" | "fi" | "bg" | "hu" | "sk" => {
                LocaleStyle::SpaceGroup
            }
            _ => LocaleStyle::Prefix,
        }
    }

    fn separators(self) -> (&'static str, char) {
        match self {
            LocaleStyle::Prefix => (",", '.'),
            LocaleStyle::DotGroup => (".", ','),
            LocaleStyle::SpaceGroup => ("\u{a0}", ','),
        }
    }
}

/// Formats `amount` as a currency string for `locale`.
///
/// ```rust
/// use casemove_core::currency::format_currency;
///
/// assert_eq!(format_currency(1234.5, "USD", "EN-GB"), "$1,234.50");
/// assert_eq!(format_currency(-5.0, "GBP", "en-GB"), "-£5.00");
/// ```
pub fn format_currency(amount: f64, code: &str, locale: &str) -> String {
    let style = LocaleStyle::for_locale(locale);
    let symbol = currency_symbol(code);

    if !amount.is_finite() {
        return place_symbol(style, symbol, "NaN");
    }

    let decimals = if ZERO_DECIMAL.contains(&code) { 0 } else { 2 };
    let rounded = if decimals == 0 {
        amount.round()
    } else {
        round_to_cents(amount)
    };
    let negative = rounded < 0.0;
    let text = format!("{:.*}", decimals, rounded.abs());

    let (group, decimal) = style.separators();
    let number = match text.split_once('.') {
        Some((int_part, frac)) => format!("{}{}{}", group_digits(int_part, group), decimal, frac),
        None => group_digits(&text, group),
    };

    let body = place_symbol(style, symbol, &number);
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

fn place_symbol(style: LocaleStyle, symbol: &str, number: &str) -> String {
    match style {
        LocaleStyle::Prefix => format!("{}{}", symbol, number),
        LocaleStyle::DotGroup | LocaleStyle::SpaceGroup => format!("{}\u{a0}{}", number, symbol),
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_table_bounds() {
        assert_eq!(currency_for_wallet(1), Some("USD"));
        assert_eq!(currency_for_wallet(47), Some("RON"));
        assert_eq!(currency_for_wallet(48), None);
    }

    #[test]
    fn test_prefix_style() {
        assert_eq!(format_currency(1234567.891, "USD", "EN-GB"), "$1,234,567.89");
        assert_eq!(format_currency(0.0, "USD", "EN-GB"), "$0.00");
        assert_eq!(format_currency(999.0, "CHF", "en-US"), "CHF999.00");
    }

    #[test]
    fn test_dot_group_style() {
        assert_eq!(format_currency(1234.5, "EUR", "de-DE"), "1.234,50\u{a0}€");
    }

    #[test]
    fn test_space_group_style() {
        assert_eq!(format_currency(1234.5, "PLN", "pl-PL"), "1\u{a0}234,50\u{a0}zł");
    }

    #[test]
    fn test_zero_decimal_currency() {
        assert_eq!(format_currency(1234.6, "JPY", "EN-GB"), "¥1,235");
    }

    #[test]
    fn test_nan_is_rendered_not_hidden() {
        assert_eq!(format_currency(f64::NAN, "USD", "EN-GB"), "$NaN");
    }
}
