//! Client-side auth core: a process-wide store mirroring the server's notion
//! of the current identity, plus the HTTP transport it drives.

pub mod net;
pub mod state;
