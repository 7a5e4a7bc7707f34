use lopdf::{Dictionary, Document, Object};
use tracing::debug;

/// Scanned-vs-text heuristic. Samples the first `sample_pages` pages; a page
/// counts as scanned-like when it carries at least one image XObject and no
/// `/Font` resource (nothing selectable). The document is scanned when the
/// scanned-like fraction reaches `threshold`.
///
/// This is deliberately page-local and cheap. False positives/negatives are
/// tolerated; they only change whether the OCR stage runs.
pub fn is_scanned(doc: &Document, sample_pages: u32, threshold: f32) -> bool {
    let pages = doc.get_pages();
    let sampled: Vec<_> = pages.values().take(sample_pages as usize).collect();
    if sampled.is_empty() {
        return false;
    }

    let mut scanned_cnt = 0usize;
    for &page_id in &sampled {
        let Ok(page) = doc.get_dictionary(*page_id) else {
            continue;
        };
        let resources = page_resources(doc, page);
        let has_images = resources.map(|r| has_image_xobject(doc, r)).unwrap_or(false);
        let has_fonts = resources.map(|r| r.has(b"Font")).unwrap_or(false);
        if has_images && !has_fonts {
            scanned_cnt += 1;
        }
    }

    let fraction = scanned_cnt as f32 / sampled.len() as f32;
    debug!(
        "classify sampled={} scanned_like={} fraction={:.2}",
        sampled.len(),
        scanned_cnt,
        fraction
    );
    fraction >= threshold
}

/// Resources may sit on the page itself or be inherited from an ancestor
/// Pages node.
fn page_resources<'a>(doc: &'a Document, page: &'a Dictionary) -> Option<&'a Dictionary> {
    let mut node = page;
    for _ in 0..16 {
        if let Ok(obj) = node.get(b"Resources") {
            return resolve_dict(doc, obj);
        }
        let parent = node.get(b"Parent").ok()?;
        node = resolve_dict(doc, parent)?;
    }
    None
}

fn has_image_xobject(doc: &Document, resources: &Dictionary) -> bool {
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|o| resolve_dict(doc, o))
    else {
        return false;
    };

    xobjects.iter().any(|(_, obj)| {
        let stream_dict = match obj {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Stream(s)) => &s.dict,
                _ => return false,
            },
            Object::Stream(s) => &s.dict,
            _ => return false,
        };
        matches!(stream_dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
    })
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}
