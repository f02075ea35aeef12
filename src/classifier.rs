use crate::{pdf_utils, ClassifiedImage, ExtractorConfig, ImageFormat, ImageResource};
use flate2::read::ZlibDecoder;
use std::borrow::Cow;
use std::io::Read;

const JPEG_SOI: &[u8] = &[0xFF, 0xD8];
const JPEG_SOI_MARKER: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JP2_SIGNATURE: &[u8] = &[
    0x00, 0x00, 0x00, 0x0C, b'j', b'P', b' ', b' ', 0x0D, 0x0A, 0x87, 0x0A,
];
const J2K_CODESTREAM: &[u8] = &[0xFF, 0x4F, 0xFF, 0x51];

/// Decide whether `resource` carries a complete image file, and if so return
/// its bytes and format.
///
/// Nothing is transcoded. Leading lossless transport filters (`FlateDecode`
/// without a predictor, `ASCIIHexDecode`) are undone; after that the bytes
/// must already be a JPEG, JPEG 2000 or PNG file. Everything else (raw or
/// indexed pixel data, CCITT, JBIG2, predictor-coded Flate, empty streams)
/// yields `None`, which callers treat as a silent skip.
///
/// Inflation is capped at the default
/// [`ExtractorConfig::max_decoded_bytes`]; see [`classify_with_limit`].
pub fn classify(resource: &ImageResource<'_>) -> Option<ClassifiedImage> {
    classify_with_limit(resource, ExtractorConfig::default().max_decoded_bytes)
}

/// [`classify`] with an explicit cap on how large the payload may grow while
/// `FlateDecode` layers are undone. A stream that would exceed
/// `max_decoded_bytes` is skipped.
pub fn classify_with_limit(
    resource: &ImageResource<'_>,
    max_decoded_bytes: usize,
) -> Option<ClassifiedImage> {
    match classify_stream(resource, max_decoded_bytes) {
        Ok(classified) => Some(classified),
        Err(reason) => {
            log::debug!(
                "page {} image {} (/{}): skipped, {}",
                resource.page_number,
                resource.index,
                String::from_utf8_lossy(resource.name),
                reason
            );
            None
        }
    }
}

/// The filter that produced the final payload.
enum Terminal {
    Dct,
    Jpx,
    None,
}

fn classify_stream(
    resource: &ImageResource<'_>,
    max_decoded_bytes: usize,
) -> Result<ClassifiedImage, Cow<'static, str>> {
    let document = resource.document();
    let dict = &resource.stream.dict;

    let filters = pdf_utils::filter_chain(document, dict).ok_or("malformed /Filter entry")?;

    let mut data: Cow<'_, [u8]> = Cow::Borrowed(resource.stream.content.as_slice());
    let mut terminal = Terminal::None;

    for (position, filter) in filters.iter().enumerate() {
        let is_last = position + 1 == filters.len();
        match filter.as_slice() {
            b"DCTDecode" | b"DCT" if is_last => terminal = Terminal::Dct,
            b"JPXDecode" if is_last => terminal = Terminal::Jpx,
            b"FlateDecode" | b"Fl" => {
                if has_predictor(resource, position) {
                    return Err("FlateDecode with a predictor is raw pixel data".into());
                }
                data = Cow::Owned(inflate(&data, max_decoded_bytes)?);
            }
            b"ASCIIHexDecode" | b"AHx" => data = Cow::Owned(decode_ascii_hex(&data)?),
            other => {
                return Err(format!(
                    "unsupported filter /{} in chain",
                    String::from_utf8_lossy(other)
                )
                .into())
            }
        }
    }

    if data.is_empty() {
        return Err("empty payload".into());
    }

    let format = match terminal {
        Terminal::Dct if data.starts_with(JPEG_SOI) => ImageFormat::Jpeg,
        Terminal::Dct => return Err("DCTDecode payload lacks a JPEG SOI marker".into()),
        Terminal::Jpx if data.starts_with(JP2_SIGNATURE) => ImageFormat::Jpeg2000,
        Terminal::Jpx if data.starts_with(J2K_CODESTREAM) => ImageFormat::Jpeg2000Codestream,
        Terminal::Jpx => return Err("JPXDecode payload is neither JP2 nor a codestream".into()),
        Terminal::None => sniff(&data).ok_or("payload is not a standalone image file")?,
    };

    Ok(ClassifiedImage {
        format,
        data: data.into_owned(),
    })
}

/// Recognise an image file stored without an image filter.
fn sniff(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(PNG_SIGNATURE) {
        Some(ImageFormat::Png)
    } else if data.starts_with(JPEG_SOI_MARKER) {
        Some(ImageFormat::Jpeg)
    } else {
        None
    }
}

fn has_predictor(resource: &ImageResource<'_>, position: usize) -> bool {
    pdf_utils::decode_parms(resource.document(), &resource.stream.dict, position)
        .and_then(|parms| parms.get(b"Predictor").ok())
        .and_then(|p| p.as_i64().ok())
        .is_some_and(|p| p > 1)
}

/// Inflate one zlib layer, giving up once the output passes `limit` bytes.
fn inflate(data: &[u8], limit: usize) -> Result<Vec<u8>, Cow<'static, str>> {
    let mut out = Vec::with_capacity(data.len().saturating_mul(2).min(limit));
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    ZlibDecoder::new(data)
        .take(cap)
        .read_to_end(&mut out)
        .map_err(|e| format!("FlateDecode failed: {e}"))?;
    if out.len() > limit {
        return Err(format!("FlateDecode output exceeds {limit} bytes").into());
    }
    Ok(out)
}

/// `ASCIIHexDecode`: whitespace is ignored, `>` ends the data, and an odd
/// final digit is padded with `0`.
fn decode_ascii_hex(data: &[u8]) -> Result<Vec<u8>, Cow<'static, str>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;

    for &byte in data {
        if byte == b'>' {
            break;
        }
        if byte.is_ascii_whitespace() {
            continue;
        }
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(format!("invalid ASCIIHexDecode byte 0x{byte:02x}").into()),
        };
        match high.take() {
            Some(h) => out.push((h << 4) | nibble),
            None => high = Some(nibble),
        }
    }
    if let Some(h) = high {
        out.push(h << 4);
    }
    Ok(out)
}
