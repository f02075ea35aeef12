use crate::{pdf_utils, ExtractorConfig, ImageResource};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;

/// Finds the Image XObjects a page draws.
///
/// Two sources are searched:
/// 1. The page's `/Resources/XObject` dictionary, inherited through the page
///    tree when the page does not carry its own `/Resources`.
/// 2. The `/Resources/XObject` of every Form XObject reachable from there
///    (when [`ExtractorConfig::descend_into_forms`] is set), depth-first and
///    in place, so a form's images are numbered where the form first appears.
///    A form object is expanded at most once per page, however many times it
///    is listed, so the work per page stays linear in the number of objects.
///
/// Inline images (`BI … ID … EI` in a content stream) are not resources and
/// are never reported.
pub struct ImageDiscovery<'a> {
    document: &'a Document,
    config: &'a ExtractorConfig,
}

/// Accumulator for one page walk.
struct PageWalk<'a> {
    page_number: u32,
    images: Vec<ImageResource<'a>>,
    // Form objects already expanded on this page. Also breaks /Resources cycles.
    expanded_forms: HashSet<ObjectId>,
}

impl<'a> ImageDiscovery<'a> {
    pub fn new(document: &'a Document, config: &'a ExtractorConfig) -> Self {
        Self { document, config }
    }

    /// Collect the image resources of page `page_number` (object `page_id`).
    pub fn collect_page_images(&self, page_number: u32, page_id: ObjectId) -> Vec<ImageResource<'a>> {
        let resources = match pdf_utils::resolve_inherited(self.document, page_id, b"Resources")
            .and_then(|value| pdf_utils::resolve_dict(self.document, value))
        {
            Some(dict) => dict,
            None => {
                log::debug!("page {page_number}: no usable /Resources dictionary");
                return Vec::new();
            }
        };

        let mut walk = PageWalk {
            page_number,
            images: Vec::new(),
            expanded_forms: HashSet::new(),
        };
        self.walk_resources(resources, 0, &mut walk);
        walk.images
    }

    /// Enumerate one `/Resources` dictionary's XObjects in dictionary order.
    fn walk_resources(&self, resources: &'a Dictionary, depth: usize, walk: &mut PageWalk<'a>) {
        let xobjects = match resources
            .get(b"XObject")
            .ok()
            .and_then(|value| pdf_utils::resolve_dict(self.document, value))
        {
            Some(dict) => dict,
            None => return,
        };

        for (name, value) in xobjects.iter() {
            let (object_id, stream) = match self.resolve_stream(value) {
                Some(found) => found,
                None => {
                    log::warn!(
                        "page {}: XObject /{} does not resolve to a stream",
                        walk.page_number,
                        String::from_utf8_lossy(name)
                    );
                    continue;
                }
            };

            match pdf_utils::name_of(&stream.dict, b"Subtype") {
                Some(b"Image") => {
                    let index = walk.images.len() + 1;
                    walk.images.push(ImageResource {
                        page_number: walk.page_number,
                        index,
                        object_id,
                        name,
                        stream,
                        document: self.document,
                    });
                }
                Some(b"Form") => self.descend_into_form(name, object_id, &stream.dict, depth, walk),
                _ => {}
            }
        }
    }

    fn descend_into_form(
        &self,
        name: &[u8],
        object_id: Option<ObjectId>,
        form_dict: &'a Dictionary,
        depth: usize,
        walk: &mut PageWalk<'a>,
    ) {
        if !self.config.descend_into_forms {
            return;
        }
        if depth >= self.config.max_form_depth {
            log::warn!(
                "page {}: Form XObject /{} exceeds nesting depth {}, skipped",
                walk.page_number,
                String::from_utf8_lossy(name),
                self.config.max_form_depth
            );
            return;
        }

        // Forms without their own /Resources use the enclosing ones, which
        // have already been enumerated.
        let resources = match form_dict
            .get(b"Resources")
            .ok()
            .and_then(|value| pdf_utils::resolve_dict(self.document, value))
        {
            Some(dict) => dict,
            None => return,
        };

        if let Some(id) = object_id {
            if !walk.expanded_forms.insert(id) {
                log::debug!(
                    "page {}: Form XObject /{} ({:?}) already expanded, skipped",
                    walk.page_number,
                    String::from_utf8_lossy(name),
                    id
                );
                return;
            }
        }

        self.walk_resources(resources, depth + 1, walk);
    }

    fn resolve_stream(&self, value: &'a Object) -> Option<(Option<ObjectId>, &'a lopdf::Stream)> {
        match value {
            Object::Reference(id) => {
                let stream = self.document.get_object(*id).ok()?.as_stream().ok()?;
                Some((Some(*id), stream))
            }
            Object::Stream(stream) => Some((None, stream)),
            _ => None,
        }
    }
}
