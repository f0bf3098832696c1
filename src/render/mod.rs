//! Rendering of annotated comments and the dependency section

mod comment;
mod forest;
mod markup;
mod phrases;

pub use comment::{render_comment, split_comment, Segment};
pub use forest::render_forest;
pub use markup::{object_anchor, sgml_safe_id, DocBookMarkup, HtmlMarkup, Markup, PlainMarkup};
pub use phrases::Locale;
