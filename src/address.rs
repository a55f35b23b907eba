use alloy_primitives::Address;

pub const ADDRESS_PREFIX: &str = "0x";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Address must be 0x-prefixed and EIP-55 checksummed")]
pub struct InvalidAddress;

/// Accepts only `0x`-prefixed, EIP-55 checksummed addresses. An all-lowercase
/// address is rejected unless its checksum happens to contain no letters.
pub fn validate(raw: &str) -> Result<Address, InvalidAddress> {
    if !raw.starts_with(ADDRESS_PREFIX) {
        return Err(InvalidAddress);
    }

    Address::parse_checksummed(raw, None).map_err(|_| InvalidAddress)
}
