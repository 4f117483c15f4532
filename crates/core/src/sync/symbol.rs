//! Symbol normalization.
//!
//! Every user-supplied symbol has two canonical forms:
//! - the provider form, sent to the market data provider ("TCS.NS"), and
//! - the storage form, used as the security key ("TCS").
//!
//! The provider form is the trimmed, upper-cased input with the default
//! market suffix appended when the input carries no suffix. The storage form
//! is the provider form without the default suffix, so "tcs", "TCS" and
//! "TCS.NS" all land on the same security while "TCS.BO" stays distinct.
//! Yahoo index symbols ("^NSEI") never get a suffix.

use serde::Serialize;

use crate::errors::ValidationError;

/// A validated symbol in all the forms the engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSymbol {
    /// Symbol exactly as the caller supplied it; used in reports.
    pub input: String,
    /// Symbol sent to the provider.
    pub provider: String,
    /// Symbol used as the storage key.
    pub storage: String,
}

impl ResolvedSymbol {
    /// Validate and normalize `raw`.
    pub fn parse(raw: &str, default_suffix: &str) -> Result<Self, ValidationError> {
        let provider = provider_symbol(raw, default_suffix)?;
        let storage = storage_form(&provider, default_suffix);
        Ok(Self {
            input: raw.to_string(),
            provider,
            storage,
        })
    }
}

/// Provider form of `raw`. Idempotent.
pub fn provider_symbol(raw: &str, default_suffix: &str) -> Result<String, ValidationError> {
    let symbol = raw.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(ValidationError::MissingField("symbol".to_string()));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidInput(format!(
            "Symbol '{}' must not contain whitespace",
            raw.trim()
        )));
    }
    if symbol.matches('.').count() > 1 {
        return Err(ValidationError::InvalidInput(format!(
            "Symbol '{}' has more than one suffix separator",
            raw.trim()
        )));
    }
    if symbol.starts_with('.') || symbol.ends_with('.') {
        return Err(ValidationError::InvalidInput(format!(
            "Symbol '{}' has an empty base or suffix",
            raw.trim()
        )));
    }

    if symbol.contains('.') || symbol.starts_with('^') {
        Ok(symbol)
    } else {
        Ok(format!("{}{}", symbol, default_suffix.to_uppercase()))
    }
}

/// Storage form of `raw`. Idempotent.
pub fn storage_symbol(raw: &str, default_suffix: &str) -> Result<String, ValidationError> {
    provider_symbol(raw, default_suffix).map(|p| storage_form(&p, default_suffix))
}

fn storage_form(provider: &str, default_suffix: &str) -> String {
    // Index symbols never had the suffix appended, so there is nothing to strip.
    if provider.starts_with('^') {
        return provider.to_string();
    }
    let suffix = default_suffix.to_uppercase();
    match provider.strip_suffix(suffix.as_str()) {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => provider.to_string(),
    }
}
