pub mod pages;
pub mod quiz;
pub mod resources;
