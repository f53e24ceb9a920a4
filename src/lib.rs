//! Region screen recorder built around an ffmpeg child process.
//!
//! [`session::SessionController`] is the entry point: it asks a
//! [`capture::CaptureBackend`] for an x11grab command line, spawns ffmpeg, and on
//! stop interrupts it so the container is finalized (plus a palette pass for GIFs).

pub mod audio;
pub mod capture;
pub mod cli;
pub mod config;
pub mod error;
pub mod ffmpeg_utils;
pub mod gif;
pub mod output;
pub mod process;
pub mod profile;
pub mod region;
pub mod session;
pub mod validation;
