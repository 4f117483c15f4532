//! Provider symbol suffix handling.
//!
//! Yahoo identifies the listing venue with a dot suffix ("RELIANCE.NS",
//! "SHOP.TO"). This module knows which suffixes exist and what exchange and
//! currency they stand for.

mod exchange_suffixes;

pub use exchange_suffixes::{
    split_suffix, strip_suffix, suffix_info, ExchangeSuffix, YAHOO_EXCHANGE_SUFFIXES,
};
