//! Mirror node REST access: address book and fee estimates

mod address_book;
mod fee_estimate;

pub(crate) use address_book::fetch_address_book;
pub use fee_estimate::{FeeEstimate, FeeEstimateMode, FeeEstimateQuery, FeeEstimateResponse, FeeExtra, NetworkFee};

/// Base REST URL of a mirror host
///
/// An explicit scheme is kept. Local hosts get `http`, everything else `https`.
pub(crate) fn rest_base_url(mirror: &str) -> String {
    let mirror = mirror.trim_end_matches('/');
    if mirror.starts_with("http://") || mirror.starts_with("https://") {
        return mirror.to_string();
    }
    if mirror.starts_with("localhost") || mirror.starts_with("127.0.0.1") {
        format!("http://{}", mirror)
    } else {
        format!("https://{}", mirror)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_base_url() {
        assert_eq!(rest_base_url("localhost:5551"), "http://localhost:5551");
        assert_eq!(rest_base_url("127.0.0.1:5551/"), "http://127.0.0.1:5551");
        assert_eq!(
            rest_base_url("testnet.mirrornode.hedera.com:443"),
            "https://testnet.mirrornode.hedera.com:443"
        );
        assert_eq!(rest_base_url("http://mirror.internal:8080"), "http://mirror.internal:8080");
    }
}
