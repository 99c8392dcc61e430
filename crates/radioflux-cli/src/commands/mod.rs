pub mod config;
pub mod ds9;
pub mod info;
pub mod measure;
