use scraper::{Html, Selector};
use thiserror::Error;

/// Start of every text payload; the page number follows at this offset
pub const CALLBACK_PREFIX: &str = "window.page";
pub const CALLBACK_OPEN: &str = "_callback([\"";
pub const CALLBACK_CLOSE: &str = "\"]);";

/// Character offset of the page number in a raw payload
pub const PAGE_NUMBER_OFFSET: usize = CALLBACK_PREFIX.len();

/// Ways a payload can fail the callback wrapper grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("missing `window.page` prefix")]
    MissingPrefix,
    #[error("no page number after `window.page`")]
    MissingPageNumber,
    #[error("missing `_callback([\"` after page number")]
    MissingCallback,
    #[error("missing `\"]);` suffix")]
    MissingSuffix,
}

/// Text recovered from one page payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFragment {
    /// Page number named by the callback, not checked against dispatch order
    pub page_number: usize,

    /// Text of each `span.a`, in element order
    pub lines: Vec<String>,
}

/// Unwraps and parses a `window.page<N>_callback(["..."]);` payload
pub fn parse(payload: &str) -> Result<PageFragment, PayloadError> {
    let (page_number, body) = unwrap_payload(payload)?;
    let lines = extract_lines(&unescape_body(body));

    ::log::trace!("Page {} payload yielded {} lines", page_number, lines.len());

    Ok(PageFragment { page_number, lines })
}

/// Checks the wrapper grammar and returns the page number and the raw body
pub fn unwrap_payload(payload: &str) -> Result<(usize, &str), PayloadError> {
    let payload = payload.trim();
    if !payload.starts_with(CALLBACK_PREFIX) {
        return Err(PayloadError::MissingPrefix);
    }
    let rest = &payload[PAGE_NUMBER_OFFSET..];

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let page_number = rest[..digits]
        .parse()
        .map_err(|_| PayloadError::MissingPageNumber)?;

    let body = rest[digits..]
        .strip_prefix(CALLBACK_OPEN)
        .ok_or(PayloadError::MissingCallback)?
        .strip_suffix(CALLBACK_CLOSE)
        .ok_or(PayloadError::MissingSuffix)?;

    Ok((page_number, body))
}

/// Turns the JS string literal body back into markup
///
/// `\uXXXX` escapes are decoded to UTF-8, escaped newlines are dropped and
/// any remaining backslash is removed.
pub fn unescape_body(body: &str) -> String {
    decode_unicode_escapes(body)
        .replace("\\n", "")
        .replace('\\', "")
}

/// Decodes `\uXXXX` escapes, pairing a high surrogate with the low surrogate
/// right after it. An escape behind an escaped backslash (`\\u0041`) is text.
pub fn decode_unicode_escapes(body: &str) -> String {
    if !body.contains("\\u") {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    // High surrogate waiting for its partner, with its escape text
    let mut pending: Option<(u32, &str)> = None;
    let mut rest = body;

    while let Some(start) = rest.find('\\') {
        let run = rest[start..].bytes().take_while(|&b| b == b'\\').count();
        let escape_at = start + run - 1;
        let unit = if run % 2 == 1 {
            escape_unit(&rest[escape_at..])
        } else {
            None
        };

        let Some(unit) = unit else {
            flush_pending(&mut out, pending.take());
            out.push_str(&rest[..start + run]);
            rest = &rest[start + run..];
            continue;
        };

        if escape_at > 0 {
            flush_pending(&mut out, pending.take());
            out.push_str(&rest[..escape_at]);
        }
        let escape = &rest[escape_at..escape_at + 6];
        rest = &rest[escape_at + 6..];

        match pending.take() {
            Some((high, _)) if is_low_surrogate(unit) => {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (unit - 0xDC00);
                out.push_str(&decode_unit(combined, escape));
            }
            lone => {
                flush_pending(&mut out, lone);
                if is_high_surrogate(unit) {
                    pending = Some((unit, escape));
                } else {
                    out.push_str(&decode_unit(unit, escape));
                }
            }
        }
    }

    flush_pending(&mut out, pending);
    out.push_str(rest);
    out
}

/// Code unit of a `\uXXXX` escape at the start of `text`
fn escape_unit(text: &str) -> Option<u32> {
    let hex = text.strip_prefix("\\u")?.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn is_high_surrogate(unit: u32) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_low_surrogate(unit: u32) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

fn flush_pending(out: &mut String, pending: Option<(u32, &str)>) {
    if let Some((_, escape)) = pending {
        out.push_str(escape);
    }
}

/// Lone surrogates are left as their escape text
fn decode_unit(code: u32, original: &str) -> String {
    char::from_u32(code)
        .map(String::from)
        .unwrap_or_else(|| original.to_string())
}

/// Text of every `span.a` in a markup fragment
pub fn extract_lines(markup: &str) -> Vec<String> {
    let fragment = Html::parse_fragment(markup);
    let selector = Selector::parse("span.a").unwrap();

    fragment
        .select(&selector)
        .map(|span| span.text().collect::<String>())
        .collect()
}
