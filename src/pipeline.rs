use crate::assemblers::{ImageStore, PageEncoder, Transcript};
use crate::config::DownloaderConfig;
use crate::error::{Error, Result};
use crate::fetchers::{FetchedAsset, Fetcher, fetch_asset};
use crate::parsers::{self, ViewerPage};
use crate::results::{Mode, PageDescriptor, RunSummary};
use crate::utils::sanitize_title;
use std::path::PathBuf;
use url::Url;

/// Title used when neither the page nor its URL yields one
const FALLBACK_TITLE: &str = "document";

/// Downloads one document per `run` call. Holds no per-document state.
pub struct DocumentPipeline<F, E> {
    fetcher: F,
    encoder: E,
    config: DownloaderConfig,
}

impl<F: Fetcher, E: PageEncoder> DocumentPipeline<F, E> {
    pub fn new(fetcher: F, encoder: E, config: DownloaderConfig) -> Self {
        Self {
            fetcher,
            encoder,
            config,
        }
    }

    /// Fetches the viewer page, dispatches every discovered page in order and
    /// assembles the output. The first transport or filesystem error aborts
    /// the run; malformed text pages are skipped.
    pub async fn run(&self, reference: &str, mode: Mode) -> Result<RunSummary> {
        let url = parse_document_url(reference)?;
        ::log::info!("Downloading {} as {:?}", url, mode);

        let html = self.fetcher.fetch_text(url.as_str()).await?;
        let page = parsers::html::parse(&html);
        let title = document_title(&page, &url);

        let mut run = DocumentRun::new(&self.config, mode, title, page.total_pages);
        for descriptor in page.descriptors(mode) {
            run.dispatch(&self.fetcher, &descriptor).await?;
        }

        run.finish(&self.encoder)
    }
}

/// State of a single invocation
struct DocumentRun {
    mode: Mode,
    title: String,
    total_pages: Option<usize>,
    images: ImageStore,
    transcript: Transcript,
    pdf_path: PathBuf,
    pages_written: usize,
    pages_skipped: usize,
}

impl DocumentRun {
    fn new(config: &DownloaderConfig, mode: Mode, title: String, total_pages: Option<usize>) -> Self {
        Self {
            mode,
            images: ImageStore::new(config.images_path()),
            transcript: Transcript::new(config.transcript_path(&title)),
            pdf_path: config.pdf_path(&title),
            title,
            total_pages,
            pages_written: 0,
            pages_skipped: 0,
        }
    }

    async fn dispatch<F: Fetcher>(&mut self, fetcher: &F, descriptor: &PageDescriptor) -> Result<()> {
        match fetch_asset(fetcher, descriptor).await? {
            FetchedAsset::Image(bytes) => {
                self.images.persist(&bytes, descriptor.index)?;
                self.pages_written += 1;
                println!("{}", progress_line(descriptor.index, self.total_pages));
            }
            FetchedAsset::Text(payload) => match parsers::text::parse(&payload) {
                Ok(fragment) => {
                    self.transcript.append(&fragment.lines)?;
                    self.pages_written += 1;
                }
                Err(reason) => {
                    let err = Error::MalformedPayload {
                        url: descriptor.raw.clone(),
                        reason: reason.to_string(),
                    };
                    ::log::warn!("Skipping page {}: {}", descriptor.index, err);
                    self.pages_skipped += 1;
                }
            },
        }
        Ok(())
    }

    fn finish<E: PageEncoder>(self, encoder: &E) -> Result<RunSummary> {
        let output = match self.mode {
            Mode::Images => self.images.assemble(encoder, &self.pdf_path)?,
            Mode::Text if self.transcript.fragments() > 0 => Some(self.transcript.path().to_path_buf()),
            Mode::Text => None,
        };

        Ok(RunSummary {
            title: self.title,
            mode: self.mode,
            total_pages: self.total_pages,
            pages_written: self.pages_written,
            pages_skipped: self.pages_skipped,
            output,
        })
    }
}

/// `Downloaded image <n>/<total>`, with a blank total when unknown
pub fn progress_line(index: usize, total_pages: Option<usize>) -> String {
    let total = total_pages.map(|t| t.to_string()).unwrap_or_default();
    format!("Downloaded image {index}/{total}")
}

/// Accepts absolute http(s) URLs only
pub fn parse_document_url(reference: &str) -> Result<Url> {
    match Url::parse(reference) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(Error::InvalidUrl(reference.to_string())),
    }
}

/// Sanitized page title, else the last URL path segment, else a fixed name
pub fn document_title(page: &ViewerPage, url: &Url) -> String {
    let raw = page
        .title
        .clone()
        .or_else(|| {
            url.path_segments()?
                .filter(|s| !s.is_empty())
                .last()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    sanitize_title(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemblers::PdfEncoder;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use std::io::Cursor;

    const DOC_URL: &str = "https://www.scribd.com/document/123/My-Doc";

    /// Serves canned responses and records every requested URL
    #[derive(Default)]
    struct StubFetcher {
        text: HashMap<String, String>,
        bytes: HashMap<String, Vec<u8>>,
        requested: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn with_text(mut self, url: &str, body: &str) -> Self {
            self.text.insert(url.to_string(), body.to_string());
            self
        }

        fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
            self.bytes.insert(url.to_string(), body);
            self
        }

        fn missing(url: &str) -> Error {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no stub for {url}"),
            ))
        }
    }

    impl Fetcher for StubFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String> {
            self.requested.borrow_mut().push(url.to_string());
            self.text.get(url).cloned().ok_or_else(|| Self::missing(url))
        }

        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.requested.borrow_mut().push(url.to_string());
            self.bytes.get(url).cloned().ok_or_else(|| Self::missing(url))
        }
    }

    fn jpeg(width: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        RgbImage::from_pixel(width, 4, Rgb([10, 120, 10]))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    fn payload(page: usize, text: &str) -> String {
        format!(r#"window.page{page}_callback(["<span class=\"a\">{text}</span>"]);"#)
    }

    fn viewer(title: &str, total: Option<usize>) -> String {
        let total = total
            .map(|t| format!(r#"<span data-e2e="total-pages">/ {t}</span>"#))
            .unwrap_or_default();
        format!(
            r#"<html><head><title>{title}</title></head><body>{total}
<img class="absimg" src="https://cdn.test/doc/images/1-a.jpg">
<script type="text/javascript">var p = "https://cdn.test/doc/pages/2-b.jsonp";</script>
<script type="text/javascript">var q = "https://cdn.test/doc/pages/3-c.jsonp";</script>
</body></html>"#
        )
    }

    #[tokio::test]
    async fn test_text_mode_appends_fragments_in_script_order() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StubFetcher::default()
            .with_text(DOC_URL, &viewer("My Doc", Some(3)))
            .with_text("https://cdn.test/doc/pages/2-b.jsonp", &payload(2, "second"))
            .with_text("https://cdn.test/doc/pages/3-c.jsonp", &payload(3, "third"));

        let pipeline = DocumentPipeline::new(fetcher, PdfEncoder::default(), DownloaderConfig::new(dir.path()));
        let summary = pipeline.run(DOC_URL, Mode::Text).await.unwrap();

        assert_eq!(summary.title, "My_Doc");
        assert_eq!(summary.pages_written, 2);
        assert_eq!(summary.pages_skipped, 0);

        let transcript = dir.path().join("scribd").join("My_Doc.txt");
        assert_eq!(summary.output, Some(transcript.clone()));
        assert_eq!(fs::read_to_string(&transcript).unwrap(), "second\nthird\n");

        // direct images are never requested in text mode
        let requested = pipeline.fetcher.requested.borrow();
        assert!(requested.iter().all(|u| !u.ends_with(".jpg")));
        assert!(!dir.path().join("scribd").join("images").exists());
    }

    #[tokio::test]
    async fn test_image_mode_builds_pdf_from_both_passes() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StubFetcher::default()
            .with_text(DOC_URL, &viewer("My Doc", Some(3)))
            .with_bytes("https://cdn.test/doc/images/1-a.jpg", jpeg(8))
            .with_bytes("https://cdn.test/doc/images/2-b.jpg", jpeg(16))
            .with_bytes("https://cdn.test/doc/images/3-c.jpg", jpeg(24));

        let pipeline = DocumentPipeline::new(fetcher, PdfEncoder::default(), DownloaderConfig::new(dir.path()));
        let summary = pipeline.run(DOC_URL, Mode::Images).await.unwrap();

        assert_eq!(summary.pages_written, 3);
        assert_eq!(summary.total_pages, Some(3));

        let pdf = dir.path().join("scribd").join("My_Doc.pdf");
        assert_eq!(summary.output, Some(pdf.clone()));
        let doc = lopdf::Document::load(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let images = dir.path().join("scribd").join("images");
        for index in 1..=3 {
            assert!(images.join(format!("{index}.jpg")).exists());
        }

        let requested = pipeline.fetcher.requested.borrow();
        assert_eq!(
            requested[1..],
            [
                "https://cdn.test/doc/images/1-a.jpg",
                "https://cdn.test/doc/images/2-b.jpg",
                "https://cdn.test/doc/images/3-c.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StubFetcher::default()
            .with_text(DOC_URL, &viewer("Doc", None))
            .with_text("https://cdn.test/doc/pages/2-b.jsonp", "<html>rate limited</html>")
            .with_text("https://cdn.test/doc/pages/3-c.jsonp", &payload(3, "third"));

        let pipeline = DocumentPipeline::new(fetcher, PdfEncoder::default(), DownloaderConfig::new(dir.path()));
        let summary = pipeline.run(DOC_URL, Mode::Text).await.unwrap();

        assert_eq!(summary.pages_written, 1);
        assert_eq!(summary.pages_skipped, 1);
        let transcript = fs::read_to_string(dir.path().join("scribd").join("Doc.txt")).unwrap();
        assert_eq!(transcript, "third\n");
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_without_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StubFetcher::default()
            .with_text(DOC_URL, &viewer("Doc", None))
            .with_bytes("https://cdn.test/doc/images/1-a.jpg", jpeg(8));

        let pipeline = DocumentPipeline::new(fetcher, PdfEncoder::default(), DownloaderConfig::new(dir.path()));
        let result = pipeline.run(DOC_URL, Mode::Images).await;

        assert!(result.is_err());
        assert!(dir.path().join("scribd").join("images").join("1.jpg").exists());
        assert!(!dir.path().join("scribd").join("Doc.pdf").exists());
    }

    #[tokio::test]
    async fn test_no_descriptors_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StubFetcher::default().with_text(DOC_URL, "<html><title>Empty</title></html>");

        let pipeline = DocumentPipeline::new(fetcher, PdfEncoder::default(), DownloaderConfig::new(dir.path()));
        let summary = pipeline.run(DOC_URL, Mode::Images).await.unwrap();

        assert_eq!(summary.pages_written, 0);
        assert_eq!(summary.output, None);
        assert!(!dir.path().join("scribd").join("Empty.pdf").exists());
    }

    #[tokio::test]
    async fn test_invalid_reference_rejected_before_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = DocumentPipeline::new(
            StubFetcher::default(),
            PdfEncoder::default(),
            DownloaderConfig::new(dir.path()),
        );

        let result = pipeline.run("not a url", Mode::Text).await;
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert!(matches!(
            pipeline.run("ftp://example.com/doc", Mode::Text).await,
            Err(Error::InvalidUrl(_))
        ));
        assert!(pipeline.fetcher.requested.borrow().is_empty());
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(progress_line(2, Some(10)), "Downloaded image 2/10");
        assert_eq!(progress_line(2, None), "Downloaded image 2/");
    }

    #[test]
    fn test_document_title_fallbacks() {
        let url = Url::parse("https://www.scribd.com/document/123/Some-Name/").unwrap();

        let titled = ViewerPage {
            title: Some("A: B".to_string()),
            ..ViewerPage::default()
        };
        assert_eq!(document_title(&titled, &url), "A__B");
        assert_eq!(document_title(&ViewerPage::default(), &url), "Some-Name");

        let bare = Url::parse("https://www.scribd.com/").unwrap();
        assert_eq!(document_title(&ViewerPage::default(), &bare), "document");
    }
}
