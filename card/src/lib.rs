//! Share-card renderer: a spark drawn onto a gradient PNG.

pub mod errors;
pub use errors::{CardError, CardResult};

pub mod fonts;
pub use fonts::CardFont;

pub mod wrap;
pub use wrap::wrap_words;

pub mod render;
pub use render::{ShareCard, CARD_HEIGHT, CARD_WIDTH, PLACEHOLDER_TEXT};
