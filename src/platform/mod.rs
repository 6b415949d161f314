// whisper-relay - platform/mod.rs
//
// Platform abstraction layer: process-table lookup and window/input
// automation.
// Dependencies: standard library, sysinfo, and (on Windows) the windows
// crate. Must NOT depend on: core, app, telegram.

pub mod process;
pub mod window;
