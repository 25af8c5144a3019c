pub mod editor;
pub mod model;
