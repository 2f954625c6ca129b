//! Debuggee process identity.

use std::fmt;

/// Process identifier of the debuggee
///
/// The debugger and the debuggee are different processes sharing one
/// filesystem namespace; the debuggee's PID is what turns a module path seen
/// as `/proc/self/...` into something the debugger can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}
