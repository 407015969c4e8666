use std::fmt;

/// Motor operations understood by the microcontroller firmware.
/// Each one travels over the wire as a single ASCII byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    Forward,
    Backward,
    Right,
    Left,
    #[default]
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("invalid operation: length must be 1")]
    InvalidLength,

    #[error("unknown operation: {0}")]
    Unknown(String),
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Forward,
        Operation::Backward,
        Operation::Right,
        Operation::Left,
        Operation::Stop,
    ];

    /// Parse a one-character operation code
    pub fn parse(raw: &str) -> Result<Self, OperationError> {
        let mut chars = raw.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => return Err(OperationError::InvalidLength),
        };

        Self::from_code(code).ok_or_else(|| OperationError::Unknown(raw.to_string()))
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'f' => Some(Operation::Forward),
            'b' => Some(Operation::Backward),
            'r' => Some(Operation::Right),
            'l' => Some(Operation::Left),
            's' => Some(Operation::Stop),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Operation::Forward => 'f',
            Operation::Backward => 'b',
            Operation::Right => 'r',
            Operation::Left => 'l',
            Operation::Stop => 's',
        }
    }

    /// Byte written to the serial link
    pub fn as_byte(self) -> u8 {
        self.code() as u8
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
