use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;

/// Decode a delimited-text export into a string.
///
/// A byte-order mark selects its encoding and is stripped. Without one the
/// bytes are taken as UTF-8, falling back to Windows-1252, which is what GIS
/// desktop tools on Windows write for table exports.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("Input is not valid UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text
        }
    }
}
