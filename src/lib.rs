extern crate gl;
extern crate glutin;
extern crate fnv;
pub extern crate glam;

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod light;
pub mod post_process;
pub mod renderer;
pub mod scene;
pub mod state;
pub mod timer;

pub use error::{Result, ViewerError};
