pub mod awl_type;
pub mod quiz;
pub mod submit;
