pub mod color;
pub mod geometry;
pub mod page;

pub use color::{Color, ColorValue};
pub use geometry::{Rect, Size};
pub use page::{Margins, Orientation, PageFormat, mm_to_pt};
