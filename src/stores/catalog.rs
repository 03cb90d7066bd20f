//! Built-in retailer list, used when the config file defines no `[[stores]]`.
//!
//! Order is lookup priority. Update selectors here when a storefront changes
//! its markup, and add a fixture to the lookup tests.

use super::StoreProfile;

/// Detail-page selectors shared by WooCommerce storefronts.
const WOOCOMMERCE_DETAIL: &[&str] =
    &["meta[itemprop='price']", ".woocommerce-Price-amount", ".price .amount"];

/// Listing selectors shared by WooCommerce storefronts.
const WOOCOMMERCE_LIST: &[&str] = &[".woocommerce-Price-amount", ".price .amount"];

/// Returns the default store profiles in priority order.
pub fn default_stores() -> Vec<StoreProfile> {
    vec![
        StoreProfile::new(
            "Japan Centre",
            "https://www.japancentre.com/en/search?term={}",
            &[".price", ".product__price", "[data-test='product-price']"],
            &[
                "meta[itemprop='price']",
                "meta[property='product:price:amount']",
                ".price",
                ".product__price",
            ],
        ),
        StoreProfile::new(
            "H Mart UK",
            "https://hmart.co.uk/shop/gb/search?controller=search&s={}",
            &[".price", "[itemprop='price']"],
            &["[itemprop='price']", "meta[property='product:price:amount']", ".price"],
        ),
        StoreProfile::new(
            "Sous Chef",
            "https://www.souschef.co.uk/search?q={}",
            &[".price-item--regular", ".price", "[data-product-price]"],
            &["meta[itemprop='price']", "meta[property='product:price:amount']", ".price"],
        ),
        StoreProfile::new(
            "Yutaka Shop",
            "https://shop.yutaka.london/search?q={}",
            &[".price", ".price__regular .price-item--regular"],
            &["meta[itemprop='price']", "meta[property='product:price:amount']", ".price"],
        ),
        StoreProfile::new(
            "Wibrix",
            "https://wibrix.co.uk/?s={}&post_type=product",
            WOOCOMMERCE_LIST,
            WOOCOMMERCE_DETAIL,
        ),
        StoreProfile::new(
            "Oriental Mart",
            "https://www.orientalmart.co.uk/search?q={}",
            &[".price", ".product-price", ".woocommerce-Price-amount"],
            &["meta[itemprop='price']", ".price", ".woocommerce-Price-amount"],
        ),
        StoreProfile::new(
            "Wai Yee Hong",
            "https://www.waiyeehong.com/search?keywords={}",
            &[".price", ".product-price"],
            &["meta[itemprop='price']", ".price"],
        ),
        StoreProfile::new(
            "WaNaHong",
            "https://www.wanahong.co.uk/?s={}&post_type=product",
            WOOCOMMERCE_LIST,
            WOOCOMMERCE_DETAIL,
        ),
        StoreProfile::new(
            "Tradewinds Oriental",
            "https://tradewindsorientalshop.co.uk/?s={}&post_type=product",
            WOOCOMMERCE_LIST,
            WOOCOMMERCE_DETAIL,
        ),
        StoreProfile::new(
            "Korea Foods",
            "https://www.koreafoods.co.uk/?s={}&post_type=product",
            WOOCOMMERCE_LIST,
            WOOCOMMERCE_DETAIL,
        ),
    ]
}
