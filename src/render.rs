use crate::catalog::{filter_products, normalize_month_label, order_months, sort_products, translate_month_label};
use crate::html::{Element, Node};
use crate::i18n::{StaticPage, UiStrings};
use crate::locale::LocaleDescriptor;
use crate::models::{Catalog, Product};
use crate::structured_data::emit_listing;
use crate::utils::slug;
use serde_json::Value;

pub const CONTENT_ID: &str = "produtos";

/// Everything one render pass reads. Owned by the request that builds it.
#[derive(Debug, Clone)]
pub struct PageState {
    pub catalog: Catalog,
    pub ui: UiStrings,
    pub locale: LocaleDescriptor,
    pub search_term: String,
}

pub struct Renderer {
    pub source_language: String,
    pub placeholder_icon: String,
}

impl Renderer {
    pub fn new(source_language: &str, placeholder_icon: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            placeholder_icon: placeholder_icon.to_string(),
        }
    }

    /// Builds the content area from scratch. Months are omitted only when a
    /// search is active and none of their products match.
    pub fn render(&self, state: &PageState) -> Element {
        let mut content = content_root();
        let ui = &state.ui;

        if state.catalog.is_empty() {
            return content.child(message("vazio", ui.get("emptyCatalog")));
        }

        let searching = !state.search_term.trim().is_empty();
        let mut index = 0;
        for month in order_months(state.catalog.month_labels(), &self.source_language) {
            let sorted = sort_products(state.catalog.products(month), &state.locale);
            let matching = filter_products(&sorted, &state.search_term);
            if searching && matching.is_empty() {
                continue;
            }
            content = content.child(self.month_section(month, index, &matching, state));
            index += 1;
        }

        if index == 0 {
            let key = if searching { "noResults" } else { "emptyCatalog" };
            content = content.child(message("vazio", ui.get(key)));
        }
        content
    }

    /// Replaces the whole content area with one message.
    pub fn render_error(&self, ui: &UiStrings) -> Element {
        content_root().child(message("erro", ui.get("loadError")))
    }

    fn month_heading(&self, label: &str, locale: &LocaleDescriptor) -> String {
        if locale.language == self.source_language {
            label.to_string()
        } else {
            translate_month_label(label, locale)
        }
    }

    fn month_section(&self, label: &str, index: usize, products: &[&Product], state: &PageState) -> Element {
        let ui = &state.ui;
        let expanded = index == 0;
        let list_id = format!("lista-{}-{}", slug(&normalize_month_label(label)), index);

        let button = Element::new("button")
            .attr("type", "button")
            .class("toggle-mes")
            .attr("aria-expanded", expanded.to_string())
            .attr("aria-controls", list_id.clone())
            .attr("data-label-show", ui.get("show"))
            .attr("data-label-hide", ui.get("hide"))
            .text(if expanded { ui.get("hide") } else { ui.get("show") });

        let header = Element::new("div")
            .class("month-header")
            .child(Element::new("h2").text(self.month_heading(label, &state.locale)))
            .child(button);

        let mut list = Element::new("div").class("links").attr("id", list_id);
        if !expanded {
            list.set_attr("hidden", "hidden");
        }

        if products.is_empty() {
            list = list.child(message("vazio", ui.get("emptyMonth")));
        } else {
            for product in products {
                list = list.child(self.product_card(product, ui));
            }
        }

        Element::new("section")
            .class("month")
            .attr("data-month", label)
            .child(header)
            .child(list)
    }

    fn product_card(&self, product: &Product, ui: &UiStrings) -> Element {
        let label = product.label();
        let icon = product
            .icon
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .unwrap_or(&self.placeholder_icon);

        let mut content = Element::new("div")
            .class("conteudo")
            .child(Element::new("span").class("nome").text(label));

        let mut card = Element::new("a")
            .class("link-item")
            .attr("href", product.affiliate_link.as_str())
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer sponsored");

        if product.is_new {
            card.set_attr("class", "link-item link-item--novo");
            content = content.child(Element::new("span").class("badge-novo").text(ui.get("newBadge")));
        }

        card.child(
            Element::new("img")
                .class("icone")
                .attr("src", icon)
                .attr("alt", format!("{} {}", ui.get("iconAlt"), label))
                .attr("loading", "lazy"),
        )
        .child(content)
    }
}

fn content_root() -> Element {
    Element::new("main").attr("id", CONTENT_ID).attr("aria-live", "polite")
}

fn message(class: &str, text: &str) -> Element {
    Element::new("p").class(class).text(text)
}

/// Flips one month section between collapsed and expanded, the same way the
/// page script does on click. Returns the new expanded state.
pub fn toggle_section(section: &mut Element) -> bool {
    let mut expanded = false;
    for node in section.children.iter_mut() {
        let Node::Element(child) = node else { continue };
        if child.has_class("month-header") {
            for inner in child.children.iter_mut() {
                let Node::Element(button) = inner else { continue };
                if !button.has_class("toggle-mes") {
                    continue;
                }
                expanded = button.get_attr("aria-expanded") != Some("true");
                let label_attr = if expanded { "data-label-hide" } else { "data-label-show" };
                let label = button.get_attr(label_attr).unwrap_or_default().to_string();
                button.set_attr("aria-expanded", expanded.to_string());
                button.children = vec![Node::Text(label)];
            }
        }
    }
    for node in section.children.iter_mut() {
        let Node::Element(child) = node else { continue };
        if child.has_class("links") {
            if expanded {
                child.remove_attr("hidden");
            } else {
                child.set_attr("hidden", "hidden");
            }
        }
    }
    expanded
}

/// Full document around the content area: static copy, search form and the
/// structured-data listing.
pub fn render_page(
    page: &StaticPage,
    locale: &LocaleDescriptor,
    search_term: &str,
    content: Element,
    listing: Option<&Value>,
) -> Element {
    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").text(page.text("title")))
        .child(Element::new("link").attr("rel", "stylesheet").attr("href", "/static/style.css"));
    emit_listing(&mut head, listing);

    let search = Element::new("form")
        .class("busca")
        .attr("method", "get")
        .attr("action", "/")
        .attr("role", "search")
        .child(
            Element::new("label")
                .attr("for", "campo-busca")
                .text(page.text("searchLabel")),
        )
        .child(
            Element::new("input")
                .attr("id", "campo-busca")
                .attr("type", "search")
                .attr("name", "q")
                .attr("value", search_term)
                .attr("placeholder", page.text("searchPlaceholder"))
                .attr("title", page.text("searchLabel")),
        )
        .child(
            Element::new("button")
                .attr("type", "submit")
                .text(page.text("searchButton")),
        );

    let body = Element::new("body")
        .child(
            Element::new("header")
                .child(Element::new("h1").text(page.text("heading")))
                .child(Element::new("p").class("subtitulo").text(page.text("subtitle")))
                .child(search),
        )
        .child(content)
        .child(Element::new("footer").child(Element::new("p").text(page.text("footer"))))
        .child(Element::new("script").attr("src", "/static/catalog.js").attr("defer", "defer"));

    Element::new("html")
        .attr("lang", locale.locale.as_str())
        .child(head)
        .child(body)
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod render_tests;
