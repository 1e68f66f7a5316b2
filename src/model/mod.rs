pub mod options;
pub mod search;
pub mod selection;
