//! Static currency reference table used by pickers and formatting.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    /// ISO 4217 code, uppercase.
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn c(code: &'static str, name: &'static str, symbol: &'static str) -> Currency {
    Currency { code, name, symbol }
}

/// Currencies offered in the pickers, most common first.
pub const CURRENCIES: &[Currency] = &[
    c("USD", "US Dollar", "$"),
    c("EUR", "Euro", "€"),
    c("GBP", "British Pound", "£"),
    c("JPY", "Japanese Yen", "¥"),
    c("INR", "Indian Rupee", "₹"),
    c("CNY", "Chinese Yuan", "CN¥"),
    c("AUD", "Australian Dollar", "A$"),
    c("CAD", "Canadian Dollar", "CA$"),
    c("CHF", "Swiss Franc", "CHF"),
    c("HKD", "Hong Kong Dollar", "HK$"),
    c("SGD", "Singapore Dollar", "S$"),
    c("NZD", "New Zealand Dollar", "NZ$"),
    c("SEK", "Swedish Krona", "kr"),
    c("NOK", "Norwegian Krone", "kr"),
    c("DKK", "Danish Krone", "kr"),
    c("PLN", "Polish Zloty", "zł"),
    c("CZK", "Czech Koruna", "Kč"),
    c("HUF", "Hungarian Forint", "Ft"),
    c("RUB", "Russian Ruble", "₽"),
    c("TRY", "Turkish Lira", "₺"),
    c("KRW", "South Korean Won", "₩"),
    c("THB", "Thai Baht", "฿"),
    c("MYR", "Malaysian Ringgit", "RM"),
    c("IDR", "Indonesian Rupiah", "Rp"),
    c("PHP", "Philippine Peso", "₱"),
    c("VND", "Vietnamese Dong", "₫"),
    c("PKR", "Pakistani Rupee", "₨"),
    c("BDT", "Bangladeshi Taka", "৳"),
    c("LKR", "Sri Lankan Rupee", "Rs"),
    c("NPR", "Nepalese Rupee", "Rs"),
    c("AED", "UAE Dirham", "AED"),
    c("SAR", "Saudi Riyal", "SAR"),
    c("ILS", "Israeli New Shekel", "₪"),
    c("EGP", "Egyptian Pound", "E£"),
    c("ZAR", "South African Rand", "R"),
    c("NGN", "Nigerian Naira", "₦"),
    c("KES", "Kenyan Shilling", "KSh"),
    c("BRL", "Brazilian Real", "R$"),
    c("MXN", "Mexican Peso", "MX$"),
    c("ARS", "Argentine Peso", "AR$"),
];

/// Look up a currency by code, ignoring case.
#[must_use]
pub fn find(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

/// Currencies whose code or name contains `query`, ignoring case.
///
/// An empty query matches everything.
#[must_use]
pub fn search(query: &str) -> Vec<&'static Currency> {
    let needle = query.trim().to_lowercase();
    CURRENCIES
        .iter()
        .filter(|c| {
            c.code.to_lowercase().contains(&needle) || c.name.to_lowercase().contains(&needle)
        })
        .collect()
}
