pub mod absorption;
pub mod matrix;
pub mod normalize;
pub mod removal;
pub mod transition;
