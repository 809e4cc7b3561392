//! Locale-aware price formatting.
//!
//! Prices always carry exactly two fraction digits. The separators come
//! from a small CLDR-derived table keyed by locale; unknown regional
//! variants fall back on their language and then on `en-US`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOCALE: &str = "de-CH";
pub const DEFAULT_CURRENCY: &str = "CHF";

/// Options for [`format_price`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatPriceOptions {
    pub value: f64,
    /// Treat `value` as cents and divide it by 100.
    pub is_value_cent_amount: bool,
    pub currency_before: bool,
    pub currency_after: bool,
    pub locale: String,
    pub currency: String,
}

impl Default for FormatPriceOptions {
    fn default() -> Self {
        Self {
            value: 0.0,
            is_value_cent_amount: false,
            currency_before: false,
            currency_after: false,
            locale: DEFAULT_LOCALE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl FormatPriceOptions {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn cents(mut self) -> Self {
        self.is_value_cent_amount = true;
        self
    }

    pub fn currency_before(mut self) -> Self {
        self.currency_before = true;
        self
    }

    pub fn currency_after(mut self) -> Self {
        self.currency_after = true;
        self
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_string();
        self
    }
}

/// Separators used when rendering a number for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    pub group: &'static str,
    pub decimal: &'static str,
    /// Integer digits beyond the first group needed before grouping kicks in.
    pub min_grouping: usize,
}

const fn symbols(group: &'static str, decimal: &'static str) -> NumberSymbols {
    NumberSymbols {
        group,
        decimal,
        min_grouping: 1,
    }
}

const APOSTROPHE: &str = "\u{2019}";
const NBSP: &str = "\u{a0}";
const NARROW_NBSP: &str = "\u{202f}";

const EN: NumberSymbols = symbols(",", ".");

static LOCALES: &[(&str, NumberSymbols)] = &[
    ("de-ch", symbols(APOSTROPHE, ".")),
    ("de-li", symbols(APOSTROPHE, ".")),
    ("it-ch", symbols(APOSTROPHE, ".")),
    ("fr-ch", symbols(NARROW_NBSP, ",")),
    ("de-at", symbols(NBSP, ",")),
    ("de", symbols(".", ",")),
    ("fr", symbols(NARROW_NBSP, ",")),
    ("it", symbols(".", ",")),
    ("nl", symbols(".", ",")),
    ("pt", symbols(".", ",")),
    (
        "es",
        NumberSymbols {
            group: ".",
            decimal: ",",
            min_grouping: 2,
        },
    ),
    ("en", EN),
    ("ja", EN),
    ("zh", EN),
];

/// Look up the separators for a BCP 47 locale tag.
pub fn number_symbols(locale: &str) -> NumberSymbols {
    let tag = locale.trim().replace('_', "-").to_ascii_lowercase();
    let language = tag.split('-').next().unwrap_or_default();

    LOCALES
        .iter()
        .find(|(key, _)| *key == tag)
        .or_else(|| LOCALES.iter().find(|(key, _)| *key == language))
        .map(|(_, symbols)| *symbols)
        .unwrap_or(EN)
}

/// Format a price according to `options`.
///
/// Returns an empty string when the value is NaN.
pub fn format_price(options: &FormatPriceOptions) -> String {
    if options.value.is_nan() {
        return String::new();
    }

    let value = if options.is_value_cent_amount {
        options.value / 100.0
    } else {
        options.value
    };

    let formatted = format_decimal(value, number_symbols(&options.locale));
    let before = if options.currency_before {
        format!("{} ", options.currency)
    } else {
        String::new()
    };
    let after = if options.currency_after {
        format!(" {}", options.currency)
    } else {
        String::new()
    };

    format!("{before}{formatted}{after}")
}

/// Render `value` with two fraction digits and the given separators.
pub fn format_decimal(value: f64, symbols: NumberSymbols) -> String {
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{sign}\u{221e}");
    }

    let (integer, fraction) = round_two_places(value.abs());
    format!(
        "{sign}{}{}{fraction}",
        group_digits(&integer, symbols),
        symbols.decimal
    )
}

/// Round half away from zero on the shortest decimal form of `value`.
fn round_two_places(value: f64) -> (String, String) {
    let repr = value.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|&d| d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - 2;
    let render = |d: &[u8]| d.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    (render(&digits[..split]), render(&digits[split..]))
}

fn group_digits(integer: &str, symbols: NumberSymbols) -> String {
    if integer.len() < 3 + symbols.min_grouping {
        return integer.to_string();
    }

    let mut out = String::with_capacity(integer.len() + integer.len() / 3 * symbols.group.len());
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push_str(symbols.group);
        }
        out.push(c);
    }
    out
}
