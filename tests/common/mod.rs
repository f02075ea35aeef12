// Helpers for building small PDFs in memory with lopdf.
#![allow(dead_code)]

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

pub const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0xFF, 0xD9,
];

pub const PNG: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// One entry in a page's `/Resources/XObject` dictionary.
pub enum XObject {
    /// Image XObject with the given `/Filter` chain and stored bytes.
    Image {
        filters: Vec<&'static str>,
        data: Vec<u8>,
    },
    /// Form XObject that only draws vector paths.
    Vector,
}

impl XObject {
    pub fn jpeg() -> Self {
        XObject::Image {
            filters: vec!["DCTDecode"],
            data: JPEG.to_vec(),
        }
    }

    pub fn png() -> Self {
        XObject::Image {
            filters: vec![],
            data: PNG.to_vec(),
        }
    }

    /// Uncompressed RGB pixels: a real image, but not a standalone file.
    pub fn raw_rgb() -> Self {
        XObject::Image {
            filters: vec![],
            data: vec![0xFF, 0x00, 0x00],
        }
    }
}

fn image_stream(filters: &[&'static str], data: Vec<u8>) -> Stream {
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => 1,
        "Height" => 1,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    match filters {
        [] => {}
        [single] => dict.set("Filter", *single),
        many => dict.set(
            "Filter",
            many.iter()
                .map(|f| Object::Name(f.as_bytes().to_vec()))
                .collect::<Vec<_>>(),
        ),
    }
    Stream::new(dict, data)
}

fn vector_form() -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        },
        b"0 0 m 10 10 l S".to_vec(),
    )
}

fn xobject_dict(doc: &mut Document, xobjects: Vec<XObject>) -> Dictionary {
    let mut dict = Dictionary::new();
    for (i, xobject) in xobjects.into_iter().enumerate() {
        let (name, id) = match xobject {
            XObject::Image { filters, data } => {
                (format!("Im{i}"), doc.add_object(image_stream(&filters, data)))
            }
            XObject::Vector => (format!("Fm{i}"), doc.add_object(vector_form())),
        };
        dict.set(name, id);
    }
    dict
}

fn finish(mut doc: Document, pages_id: ObjectId, kids: Vec<Object>, pages_extra: Dictionary) -> Vec<u8> {
    let mut pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
    };
    for (key, value) in pages_extra.iter() {
        pages.set(key.clone(), value.clone());
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Build a PDF with one page per element of `pages`, each page carrying the
/// listed XObjects in its own `/Resources`.
pub fn build_pdf(pages: Vec<Vec<XObject>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for xobjects in pages {
        let xobject = xobject_dict(&mut doc, xobjects);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "XObject" => xobject },
        });
        kids.push(page_id.into());
    }

    finish(doc, pages_id, kids, Dictionary::new())
}

/// Build a PDF whose pages carry no `/Resources` and inherit the ones set on
/// the `/Pages` node.
pub fn build_pdf_with_inherited_resources(page_count: usize, xobjects: Vec<XObject>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let xobject = xobject_dict(&mut doc, xobjects);

    let kids: Vec<Object> = (0..page_count)
        .map(|_| {
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            })
            .into()
        })
        .collect();

    finish(
        doc,
        pages_id,
        kids,
        dictionary! { "Resources" => dictionary! { "XObject" => xobject } },
    )
}

/// A PDF whose trailer declares an `/Encrypt` dictionary.
pub fn build_encrypted_pdf() -> Vec<u8> {
    let bytes = build_pdf(vec![vec![XObject::jpeg()]]);
    let mut doc = Document::load_mem(&bytes).expect("reload test PDF");
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0u8; 32]),
        "U" => Object::string_literal(vec![0u8; 32]),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save encrypted test PDF");
    buf
}
