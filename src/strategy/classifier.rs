//! Token classification by symbol.
//!
//! Symbols are classified against a fixed rule table: a set of USD-stable
//! base symbols and a set of yield-bearing prefixes (and suffixes). A token
//! is yield-bearing only when its symbol is exactly `prefix + base + suffix`.

use crate::tokens::{STABLE_BASE_SYMBOLS, YIELD_BEARING_PREFIXES, YIELD_BEARING_SUFFIXES};

/// Classification of a token symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass<'a> {
    /// A base stable currency (USDC, DAI). Earns nothing while idle.
    PlainStable { base: &'a str },
    /// A lending receipt token over a stable base (aBasUSDC, mUSDC).
    YieldBearing { prefix: &'a str, base: &'a str },
    /// Anything else.
    Other,
}

/// Rule table for recognizing stable and yield-bearing stable tokens.
#[derive(Debug, Clone)]
pub struct TokenClassifier {
    base_symbols: Vec<String>,
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new(STABLE_BASE_SYMBOLS, YIELD_BEARING_PREFIXES, YIELD_BEARING_SUFFIXES)
    }
}

impl TokenClassifier {
    pub fn new(base_symbols: &[&str], prefixes: &[&str], suffixes: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            base_symbols: owned(base_symbols),
            prefixes: owned(prefixes),
            suffixes: owned(suffixes),
        }
    }

    /// Add a yield-bearing prefix to the rule table.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefixes.push(prefix.to_string());
        self
    }

    /// Classify a symbol (case-insensitive).
    pub fn classify(&self, symbol: &str) -> TokenClass<'_> {
        if let Some(base) = self
            .base_symbols
            .iter()
            .find(|b| b.eq_ignore_ascii_case(symbol))
        {
            return TokenClass::PlainStable { base: base.as_str() };
        }

        let lower = symbol.to_lowercase();
        for prefix in &self.prefixes {
            let Some(rest) = lower.strip_prefix(&prefix.to_lowercase()) else {
                continue;
            };
            for base in &self.base_symbols {
                let base_lower = base.to_lowercase();
                let matched = self
                    .suffixes
                    .iter()
                    .any(|suffix| rest == format!("{}{}", base_lower, suffix.to_lowercase()));
                if matched {
                    return TokenClass::YieldBearing {
                        prefix: prefix.as_str(),
                        base: base.as_str(),
                    };
                }
            }
        }

        TokenClass::Other
    }

    /// Whether the symbol textually contains a recognized stable base symbol.
    pub fn contains_stable_symbol(&self, symbol: &str) -> bool {
        let upper = symbol.to_uppercase();
        self.base_symbols
            .iter()
            .any(|b| upper.contains(&b.to_uppercase()))
    }

    /// Base symbol of a yield-bearing token, `None` for anything else.
    pub fn yield_bearing_base(&self, symbol: &str) -> Option<&str> {
        match self.classify(symbol) {
            TokenClass::YieldBearing { base, .. } => Some(base),
            _ => None,
        }
    }

    /// Plain or yield-bearing USD-stable token.
    pub fn is_stable(&self, symbol: &str) -> bool {
        !matches!(self.classify(symbol), TokenClass::Other)
    }
}
