/// Rendering: panels, tabs and the charts drawn inside them. All chart data
/// comes prepared from [`crate::report`].
pub mod panels;
pub mod plot;
pub mod tabs;
