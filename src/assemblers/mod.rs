pub mod images;
pub mod pdf;
pub mod transcript;

pub use images::{ImageStore, sort_by_page_index};
pub use pdf::{PageEncoder, PdfEncoder};
pub use transcript::Transcript;
