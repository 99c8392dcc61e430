pub mod config;
pub mod consts;
pub mod error;
pub mod flux;
pub mod io;
pub mod planes;
pub mod radiomap;
pub mod region;
pub mod resolve;
pub mod stats;
pub mod wcs;
