pub mod destination;
pub mod field;
pub mod form;
pub mod kind;
