pub mod pages;
pub mod stubs;
