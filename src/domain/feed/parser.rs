use rss::extension::Extension;
use rss::{Channel, Item};

use super::error::FeedParseError;
use crate::domain::events::{FeedItem, VendorAttribute};

/// Namespace prefix of the library's event metadata elements.
pub const VENDOR_NAMESPACE_PREFIX: &str = "tpl";

/// Parse one page of an RSS feed into feed items.
///
/// Missing fields are left as `None`; only a document that is not an RSS
/// channel at all is an error.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>, FeedParseError> {
    let channel = Channel::read_from(bytes).map_err(|e| FeedParseError::Malformed(e.to_string()))?;

    let items: Vec<FeedItem> = channel.items().iter().map(feed_item).collect();

    tracing::debug!(items = items.len(), "Parsed feed page");

    Ok(items)
}

fn feed_item(item: &Item) -> FeedItem {
    FeedItem {
        title: item.title().map(str::to_string),
        link: item.link().map(str::to_string),
        description: item.description().map(str::to_string),
        content: item.content().map(str::to_string),
        attributes: vendor_attributes(item),
    }
}

/// Flatten the vendor namespace of an item into name/value pairs.
///
/// `<tpl:attr name="…">value</tpl:attr>`, the element-pair form
/// `<tpl:attr><tpl:name>…</tpl:name><tpl:value>…</tpl:value></tpl:attr>` (both
/// optionally wrapped in a `<tpl:attributes>` block) and plain
/// `<tpl:name>value</tpl:name>` leaves are recognized.
fn vendor_attributes(item: &Item) -> Vec<VendorAttribute> {
    let mut attributes = Vec::new();

    if let Some(vendor) = item.extensions().get(VENDOR_NAMESPACE_PREFIX) {
        for (name, extensions) in vendor {
            for extension in extensions {
                collect_attributes(name, extension, &mut attributes);
            }
        }
    }

    attributes
}

fn collect_attributes(key: &str, extension: &Extension, out: &mut Vec<VendorAttribute>) {
    let name = local_name(key);

    if name == "attr" {
        if let Some(attr_name) = extension.attrs().get("name") {
            let value = extension.value().unwrap_or_default().trim();
            out.push(VendorAttribute::new(attr_name.trim(), value));
        } else if let Some(attr_name) = child_text(extension, "name").filter(|n| !n.is_empty()) {
            let value = child_text(extension, "value").unwrap_or_default();
            out.push(VendorAttribute::new(attr_name, value));
        } else {
            tracing::warn!(
                value = extension.value().unwrap_or_default(),
                "Ignoring vendor attribute without a name"
            );
        }
        return;
    }

    if extension.children().is_empty() {
        if let Some(value) = extension.value() {
            out.push(VendorAttribute::new(name, value.trim()));
        }
        return;
    }

    for (child_key, children) in extension.children() {
        for child in children {
            collect_attributes(child_key, child, out);
        }
    }
}

/// Trimmed text of the first child element with the given local name.
fn child_text<'a>(extension: &'a Extension, name: &str) -> Option<&'a str> {
    extension
        .children()
        .iter()
        .filter(|(key, _)| local_name(key) == name)
        .flat_map(|(_, children)| children.iter())
        .find_map(|child| child.value())
        .map(str::trim)
}

fn local_name(key: &str) -> &str {
    key.rsplit(':').next().unwrap_or(key)
}
