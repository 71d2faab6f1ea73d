pub mod properties;
pub mod series;
pub mod slices;
pub mod tags;

pub use properties::extract_temporo_spatial;
pub use series::SeriesIdentity;
pub use slices::{open_header, SkipReason, SortedSeries};
pub use tags::*;
