pub mod catalog;
pub mod excel;
pub mod explorer;
pub mod name_matcher;
