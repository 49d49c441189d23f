pub mod bragg;
pub mod config;
pub mod fresnel;
pub mod multilayer;
pub mod output;
pub mod plot;
pub mod settings;
pub mod snell;
pub mod sweep;
pub mod tmm;
