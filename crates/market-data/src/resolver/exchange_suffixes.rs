//! Yahoo exchange suffix table.

/// A Yahoo listing suffix and the venue it identifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeSuffix {
    /// Suffix including the leading dot (e.g., ".NS").
    pub suffix: &'static str,
    /// Exchange display name stored on securities (e.g., "NSE").
    pub exchange: &'static str,
    /// Trading currency (ISO 4217).
    pub currency: &'static str,
}

const fn entry(
    suffix: &'static str,
    exchange: &'static str,
    currency: &'static str,
) -> ExchangeSuffix {
    ExchangeSuffix {
        suffix,
        exchange,
        currency,
    }
}

/// Known Yahoo suffixes. Longer suffixes that share a prefix with shorter
/// ones (".TWO" / ".TW") are listed first.
pub const YAHOO_EXCHANGE_SUFFIXES: &[ExchangeSuffix] = &[
    // India
    entry(".NS", "NSE", "INR"),
    entry(".BO", "BSE", "INR"),
    // North America
    entry(".TO", "TSX", "CAD"),
    entry(".V", "TSXV", "CAD"),
    entry(".MX", "BMV", "MXN"),
    // UK & Europe
    entry(".L", "LSE", "GBP"),
    entry(".DE", "XETRA", "EUR"),
    entry(".F", "FSX", "EUR"),
    entry(".PA", "EPA", "EUR"),
    entry(".AS", "AMS", "EUR"),
    entry(".MI", "BIT", "EUR"),
    entry(".MC", "BME", "EUR"),
    entry(".SW", "SIX", "CHF"),
    entry(".ST", "STO", "SEK"),
    entry(".OL", "OSL", "NOK"),
    entry(".CO", "CPH", "DKK"),
    // Asia
    entry(".HK", "HKEX", "HKD"),
    entry(".SS", "SSE", "CNY"),
    entry(".SZ", "SZSE", "CNY"),
    entry(".T", "TSE", "JPY"),
    entry(".KS", "KRX", "KRW"),
    entry(".SI", "SGX", "SGD"),
    entry(".TWO", "TPEX", "TWD"),
    entry(".TW", "TWSE", "TWD"),
    // Oceania
    entry(".AX", "ASX", "AUD"),
    entry(".NZ", "NZX", "NZD"),
    // South America
    entry(".SA", "B3", "BRL"),
];

/// Split a provider symbol into (base, known suffix).
///
/// Unknown suffixes are left on the base, which keeps class shares like
/// "BRK.B" intact.
pub fn split_suffix(symbol: &str) -> (&str, Option<&'static ExchangeSuffix>) {
    let upper = symbol.to_ascii_uppercase();
    YAHOO_EXCHANGE_SUFFIXES
        .iter()
        .find(|s| upper.ends_with(s.suffix) && upper.len() > s.suffix.len())
        .map(|s| (&symbol[..symbol.len() - s.suffix.len()], Some(s)))
        .unwrap_or((symbol, None))
}

/// Look up the venue of a provider symbol by its suffix.
pub fn suffix_info(symbol: &str) -> Option<&'static ExchangeSuffix> {
    split_suffix(symbol).1
}

/// Remove a known exchange suffix, if any.
pub fn strip_suffix(symbol: &str) -> &str {
    split_suffix(symbol).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_info_indian_exchanges() {
        let nse = suffix_info("RELIANCE.NS").unwrap();
        assert_eq!(nse.exchange, "NSE");
        assert_eq!(nse.currency, "INR");

        assert_eq!(suffix_info("500325.BO").map(|s| s.exchange), Some("BSE"));
        assert_eq!(suffix_info("reliance.ns").map(|s| s.exchange), Some("NSE"));
    }

    #[test]
    fn test_longer_suffix_wins() {
        assert_eq!(suffix_info("6488.TWO").map(|s| s.exchange), Some("TPEX"));
        assert_eq!(suffix_info("2330.TW").map(|s| s.exchange), Some("TWSE"));
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_suffix("SHOP.TO"), "SHOP");
        assert_eq!(strip_suffix("TCS.NS"), "TCS");
        assert_eq!(strip_suffix("BRK.B"), "BRK.B");
        assert_eq!(strip_suffix("AAPL"), "AAPL");
        // A bare suffix is not a symbol with a suffix.
        assert_eq!(strip_suffix(".NS"), ".NS");
    }
}
