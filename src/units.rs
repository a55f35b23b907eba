use alloy_primitives::U256;

const ETHER_DECIMALS: usize = 18;

/// 10^18
pub const WEI_PER_ETHER: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Formats a wei amount as whole ether using integer arithmetic only.
/// Trailing fractional zeros are dropped and no exponent notation is used.
pub fn format_wei_to_ether(wei: U256) -> String {
    let whole = wei / WEI_PER_ETHER;
    let fractional = wei % WEI_PER_ETHER;

    let fractional = format!("{:0>width$}", fractional.to_string(), width = ETHER_DECIMALS);
    let trimmed = fractional.trim_end_matches('0');

    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{trimmed}")
    }
}

/// Parses a hex quantity such as `0xde0b6b3a7640000`. The prefix is optional,
/// the digits are not.
pub fn parse_hex_quantity(s: &str) -> Option<U256> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    U256::from_str_radix(digits, 16).ok()
}
