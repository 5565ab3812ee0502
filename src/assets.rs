//! Static asset registry.

use crate::models::Asset;

pub static BITCOIN: Asset = Asset {
    slug: "bitcoin",
    name: "Bitcoin",
    code: "xbt",
    symbol: "฿",
};
pub static ETHER: Asset = Asset {
    slug: "ether",
    name: "Ether",
    code: "eth",
    symbol: "Ξ",
};
pub static LITECOIN: Asset = Asset {
    slug: "litecoin",
    name: "Litecoin",
    code: "ltc",
    symbol: "Ł",
};
pub static BITCOINCASH: Asset = Asset {
    slug: "bitcoincash",
    name: "BitcoinCash",
    code: "bch",
    symbol: "฿",
};
pub static RIPPLE: Asset = Asset {
    slug: "ripple",
    name: "Ripple",
    code: "xrp",
    symbol: "Ʀ",
};

pub static EURO: Asset = Asset {
    slug: "euro",
    name: "Euro",
    code: "eur",
    symbol: "€",
};
pub static RAND: Asset = Asset {
    slug: "rand",
    name: "Rand",
    code: "zar",
    symbol: "R",
};

pub fn all_crypto() -> [&'static Asset; 5] {
    [&BITCOIN, &ETHER, &LITECOIN, &BITCOINCASH, &RIPPLE]
}

pub fn all_fiat() -> [&'static Asset; 2] {
    [&EURO, &RAND]
}

/// Look up an asset by code ("xbt") or slug ("bitcoin"), ignoring case.
pub fn by_code(code: &str) -> Option<&'static Asset> {
    let code = code.trim();
    all_crypto()
        .into_iter()
        .chain(all_fiat())
        .find(|a| a.code.eq_ignore_ascii_case(code) || a.slug.eq_ignore_ascii_case(code))
}
