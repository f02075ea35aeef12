//! Shared PDF parsing utilities used across multiple modules.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Page-tree depth after which `/Parent` chains are treated as cyclic.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Follow a single indirect reference, returning the object itself otherwise.
pub fn resolve<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Object> {
    match value.as_reference() {
        Ok(id) => document.get_object(id).ok(),
        Err(_) => Some(value),
    }
}

/// Resolve a value that might be an inline dictionary or a reference to one.
pub fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    resolve(document, value).and_then(|o| o.as_dict().ok())
}

/// Look up `key` on a page dictionary, walking up the page tree via `/Parent`
/// when the page does not carry it itself (`/Resources`, `/MediaBox`, …).
pub fn resolve_inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = page_id;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let dict = document.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// The stream's `/Filter` entry as an ordered list of filter names.
///
/// A single name becomes a one-element chain; a missing entry an empty one.
/// Returns `None` when the entry exists but is not a name or array of names.
pub fn filter_chain(document: &Document, dict: &Dictionary) -> Option<Vec<Vec<u8>>> {
    let value = match dict.get(b"Filter") {
        Ok(v) => resolve(document, v)?,
        Err(_) => return Some(Vec::new()),
    };

    match value {
        Object::Name(name) => Some(vec![name.clone()]),
        Object::Array(items) => items
            .iter()
            .map(|item| resolve(document, item)?.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => None,
    }
}

/// The `/DecodeParms` entry that applies to filter number `index` in the chain.
pub fn decode_parms<'a>(
    document: &'a Document,
    dict: &'a Dictionary,
    index: usize,
) -> Option<&'a Dictionary> {
    let value = resolve(document, dict.get(b"DecodeParms").ok()?)?;
    match value {
        Object::Dictionary(d) if index == 0 => Some(d),
        Object::Array(items) => items.get(index).and_then(|v| resolve_dict(document, v)),
        _ => None,
    }
}

/// Read a PDF name (e.g. `/Subtype`) from a dictionary.
pub fn name_of<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    dict.get(key).ok().and_then(|v| v.as_name().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn filter_chain_single_name() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! { "Filter" => "DCTDecode" };
        assert_eq!(filter_chain(&doc, &dict), Some(vec![b"DCTDecode".to_vec()]));
    }

    #[test]
    fn filter_chain_array_keeps_order() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "Filter" => vec![Object::Name(b"FlateDecode".to_vec()), Object::Name(b"DCTDecode".to_vec())],
        };
        assert_eq!(
            filter_chain(&doc, &dict),
            Some(vec![b"FlateDecode".to_vec(), b"DCTDecode".to_vec()])
        );
    }

    #[test]
    fn filter_chain_missing_is_empty() {
        let doc = Document::with_version("1.5");
        assert_eq!(filter_chain(&doc, &Dictionary::new()), Some(Vec::new()));
    }

    #[test]
    fn filter_chain_rejects_non_name() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! { "Filter" => 3 };
        assert_eq!(filter_chain(&doc, &dict), None);
    }

    #[test]
    fn decode_parms_picks_array_slot() {
        let doc = Document::with_version("1.5");
        let dict = dictionary! {
            "DecodeParms" => vec![Object::Null, Object::Dictionary(dictionary! { "Predictor" => 12 })],
        };
        assert!(decode_parms(&doc, &dict, 0).is_none());
        let parms = decode_parms(&doc, &dict, 1).unwrap();
        assert_eq!(parms.get(b"Predictor").unwrap().as_i64().unwrap(), 12);
    }

    #[test]
    fn resolve_inherited_walks_parent() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => dictionary! {},
            }),
        );
        assert!(resolve_inherited(&doc, page_id, b"Resources").is_some());
        assert!(resolve_inherited(&doc, page_id, b"MediaBox").is_none());
    }
}
