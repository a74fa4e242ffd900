use crate::results::{AssetKind, Mode, PageDescriptor};
use regex::Regex;
use scraper::{Html, Selector};

/// Non-greedy so that adjacent descriptors in one script are kept apart
pub const DESCRIPTOR_PATTERN: &str = r"https://.*?\.jsonp";

/// Everything the pipeline needs from the viewer page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerPage {
    /// Trimmed text of the `<title>` element
    pub title: Option<String>,

    /// Page count advertised by the viewer, display only
    pub total_pages: Option<usize>,

    /// `src` of every `img.absimg`, in document order
    pub image_sources: Vec<String>,

    /// `.jsonp` URLs embedded in inline scripts, in document order
    pub descriptor_urls: Vec<String>,
}

impl ViewerPage {
    /// Dispatch order for a run: direct images first (image mode only), then
    /// script descriptors. Indices start at 1 and are shared by both passes.
    pub fn descriptors(&self, mode: Mode) -> impl Iterator<Item = PageDescriptor> + '_ {
        let direct: &[String] = match mode {
            Mode::Images => &self.image_sources,
            Mode::Text => &[],
        };

        direct
            .iter()
            .chain(self.descriptor_urls.iter())
            .filter(|raw| !raw.is_empty())
            .enumerate()
            .map(move |(i, raw)| PageDescriptor::new(i + 1, raw.clone(), AssetKind::classify(raw, mode)))
    }
}

/// Parses the viewer page markup
pub fn parse(html: &str) -> ViewerPage {
    let doc = Html::parse_document(html);

    let page = ViewerPage {
        title: extract_title(&doc),
        total_pages: extract_total_pages(&doc),
        image_sources: extract_image_sources(&doc),
        descriptor_urls: extract_descriptor_urls(&doc),
    };

    ::log::debug!(
        "Viewer page: title={:?}, total={:?}, {} images, {} descriptors",
        page.title,
        page.total_pages,
        page.image_sources.len(),
        page.descriptor_urls.len()
    );

    page
}

pub fn extract_title(doc: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    let title = doc.select(&selector).next()?.text().collect::<String>();
    let title = title.trim();

    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Best-effort read of the `total-pages` span (`"/ 12"` -> 12)
pub fn extract_total_pages(doc: &Html) -> Option<usize> {
    let selector = Selector::parse(r#"span[data-e2e="total-pages"]"#).unwrap();
    let text = doc.select(&selector).next()?.text().collect::<String>();

    match text.replace('/', "").trim().parse() {
        Ok(total) => Some(total),
        Err(_) => {
            ::log::debug!("Ignoring unparsable total-pages text: {:?}", text);
            None
        }
    }
}

pub fn extract_image_sources(doc: &Html) -> Vec<String> {
    let selector = Selector::parse("img.absimg[src]").unwrap();
    doc.select(&selector)
        .filter_map(|e| e.value().attr("src"))
        .map(|s| s.to_string())
        .collect()
}

/// Scans every non-empty `text/javascript` block for descriptor URLs
pub fn extract_descriptor_urls(doc: &Html) -> Vec<String> {
    let selector = Selector::parse(r#"script[type="text/javascript"]"#).unwrap();
    let pattern = Regex::new(DESCRIPTOR_PATTERN).unwrap();

    doc.select(&selector)
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .flat_map(|text| scan_script(&pattern, &text))
        .collect()
}

/// Descriptor URLs within one script, in order of appearance
pub fn scan_script(pattern: &Regex, script: &str) -> Vec<String> {
    pattern
        .find_iter(script)
        .map(|m| m.as_str().to_string())
        .collect()
}
