//! Static token reference tables for the Base network.

/// USD-stable base symbols. Catalog records must contain one of these,
/// and a plain holding must equal one of them (case-insensitive).
pub const STABLE_BASE_SYMBOLS: &[&str] = &["USDC", "USDT", "DAI", "USDbC"];

/// Prefixes lending protocols put in front of a base symbol when minting
/// their receipt token (aUSDC, aBasUSDC, cUSDC, mUSDC, sDAI).
pub const YIELD_BEARING_PREFIXES: &[&str] = &["a", "aBas", "c", "m", "s"];

/// Suffixes some receipt tokens carry after the base symbol (cUSDCv3).
pub const YIELD_BEARING_SUFFIXES: &[&str] = &["", "v3"];

/// Receipt token addresses keyed by `(protocol id, symbol fragment)`.
///
/// The fragment is matched case-insensitively as a substring of the feed
/// symbol, so more specific fragments must come first.
pub const YIELD_TOKEN_ADDRESSES: &[(&str, &str, &str)] = &[
    ("aave-v3", "USDBC", "0x0a1d576f3eFeF75b330424287a95A366e8281D54"),
    ("aave-v3", "USDC", "0x4e65fE4DbA92790696d040ac24Aa414708F5c0AB"),
    ("compound-v3", "USDBC", "0x9c4ec768c28520B50860ea7a15bd7213a9fF58bf"),
    ("compound-v3", "USDC", "0xb125E6687d4313864e53df431d5425969c15Eb2F"),
    ("moonwell", "USDBC", "0x703843C3379b52F9FF486c9f5892218d2a065cC8"),
    ("moonwell", "USDC", "0xEdc817A28E8B93B03976FBd4a3dDBc9f7D176c22"),
    ("moonwell", "DAI", "0x73b06D8d18De422E269645eaCe15400DE7462417"),
];

/// Resolve the receipt token address for a protocol's pool symbol.
pub fn resolve_token_address(protocol_id: &str, symbol: &str) -> Option<&'static str> {
    let symbol = symbol.to_uppercase();
    YIELD_TOKEN_ADDRESSES
        .iter()
        .find(|(protocol, fragment, _)| {
            protocol.eq_ignore_ascii_case(protocol_id) && symbol.contains(fragment)
        })
        .map(|(_, _, address)| *address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_known_pool() {
        assert_eq!(
            resolve_token_address("moonwell", "USDC"),
            Some("0xEdc817A28E8B93B03976FBd4a3dDBc9f7D176c22")
        );
    }

    #[test]
    fn test_bridged_variant_takes_precedence() {
        assert_eq!(
            resolve_token_address("aave-v3", "USDbC"),
            Some("0x0a1d576f3eFeF75b330424287a95A366e8281D54")
        );
    }

    #[test]
    fn test_unknown_protocol_is_unresolved() {
        assert_eq!(resolve_token_address("morpho-blue", "USDC"), None);
        assert_eq!(resolve_token_address("aave-v3", "EURC"), None);
    }
}
