pub mod html;
pub mod text;


pub use html::ViewerPage;
pub use text::{PageFragment, PayloadError};
