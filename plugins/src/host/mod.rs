pub mod stdio;

pub use stdio::{run_stdio_bridge, BridgeSummary, HostCommand, HostMessage, StdioHost};
