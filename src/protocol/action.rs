//! Action definitions
//!
//! The operation code carried in byte 0 of every request and response.

use std::fmt;

/// Request/response action codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    NodeExists = 0,
    AttrExists = 1,
    Get = 2,
    Put = 3,
    /// Only ever sent by the server
    Error = 4,
    GetChildren = 5,
    GetAttributes = 6,
    GetTypes = 7,
}

impl Action {
    /// Wire code of this action
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a wire code back to an action
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Action::NodeExists),
            1 => Some(Action::AttrExists),
            2 => Some(Action::Get),
            3 => Some(Action::Put),
            4 => Some(Action::Error),
            5 => Some(Action::GetChildren),
            6 => Some(Action::GetAttributes),
            7 => Some(Action::GetTypes),
            _ => None,
        }
    }

    /// Whether byte 1 of a request frame carries a meaningful type
    pub fn uses_type(self) -> bool {
        matches!(self, Action::AttrExists | Action::Get | Action::Put)
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::NodeExists => "node_exists",
            Action::AttrExists => "attr_exists",
            Action::Get => "get",
            Action::Put => "put",
            Action::Error => "error",
            Action::GetChildren => "get_children",
            Action::GetAttributes => "get_attributes",
            Action::GetTypes => "get_types",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
