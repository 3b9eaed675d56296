//! schema.org `ItemList` describing the rendered catalog for crawlers.

use crate::catalog::{order_months, sort_products};
use crate::html::{Element, Node};
use crate::locale::LocaleDescriptor;
use crate::models::Catalog;
use crate::utils::escape_script_json;
use serde_json::{json, Value};

pub const LISTING_TYPE: &str = "application/ld+json";

/// One `ListItem` per valid product, ranked in page order starting at 1.
/// Returns `None` when nothing valid would be listed.
pub fn build_listing(catalog: &Catalog, locale: &LocaleDescriptor, source_language: &str) -> Option<Value> {
    let mut items = Vec::new();
    for month in order_months(catalog.month_labels(), source_language) {
        for product in sort_products(catalog.products(month), locale) {
            if !product.is_valid() {
                continue;
            }
            let mut item = json!({
                "@type": "ListItem",
                "position": items.len() + 1,
                "name": product.label(),
                "url": product.affiliate_link,
            });
            if let Some(icon) = product.icon.as_deref().filter(|i| !i.trim().is_empty()) {
                item["image"] = Value::String(icon.to_string());
            }
            items.push(item);
        }
    }

    if items.is_empty() {
        return None;
    }

    Some(json!({
        "@context": "https://schema.org",
        "@type": "ItemList",
        "numberOfItems": items.len(),
        "itemListElement": items,
    }))
}

/// Replaces any listing already present under `head`; a `None` listing just
/// removes the old one.
pub fn emit_listing(head: &mut Element, listing: Option<&Value>) {
    head.children.retain(|node| match node {
        Node::Element(e) => !(e.tag == "script" && e.get_attr("type") == Some(LISTING_TYPE)),
        Node::Text(_) => true,
    });

    if let Some(listing) = listing {
        let body = escape_script_json(&listing.to_string());
        head.children
            .push(Element::new("script").attr("type", LISTING_TYPE).text(body).into());
    }
}
