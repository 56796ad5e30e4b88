use std::fmt;
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Segment {
    Constant,
    Local,
    Static,
    Argument,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn name(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        }
    }
}

impl FromStr for Segment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Segment::Constant),
            "local" => Ok(Segment::Local),
            "static" => Ok(Segment::Static),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "pointer" => Ok(Segment::Pointer),
            "temp" => Ok(Segment::Temp),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOp {
    Add,
    Sub,
    And,
    Or,
}

/// Comparisons are lowered to calls into shared subroutines, see
/// [`crate::translator`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CompareOp {
    Eq,
    Lt,
    Gt,
}

impl CompareOp {
    pub const ALL: [CompareOp; 3] = [CompareOp::Eq, CompareOp::Lt, CompareOp::Gt];

    /// Name of the shared subroutine, also the prefix of its return labels.
    pub fn routine(self) -> &'static str {
        match self {
            CompareOp::Eq => "EQ",
            CompareOp::Lt => "LT",
            CompareOp::Gt => "GT",
        }
    }

    /// Jump mnemonic taken when `left - right` satisfies the comparison.
    pub fn jump(self) -> &'static str {
        match self {
            CompareOp::Eq => "JEQ",
            CompareOp::Lt => "JLT",
            CompareOp::Gt => "JGT",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    // Memory access
    Push(Segment, u16),
    Pop(Segment, u16),

    // Arithmetic / logical
    Unary(UnaryOp),
    Binary(BinaryOp),
    Compare(CompareOp),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Push(seg, arg) => return write!(f, "push {} {}", seg, arg),
            Command::Pop(seg, arg) => return write!(f, "pop {} {}", seg, arg),
            Command::Unary(UnaryOp::Neg) => "neg",
            Command::Unary(UnaryOp::Not) => "not",
            Command::Binary(BinaryOp::Add) => "add",
            Command::Binary(BinaryOp::Sub) => "sub",
            Command::Binary(BinaryOp::And) => "and",
            Command::Binary(BinaryOp::Or) => "or",
            Command::Compare(CompareOp::Eq) => "eq",
            Command::Compare(CompareOp::Lt) => "lt",
            Command::Compare(CompareOp::Gt) => "gt",
        };
        f.write_str(name)
    }
}

/// A parsed command and the 1-based source line it came from.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Instruction {
    pub line: usize,
    pub command: Command,
}

impl Instruction {
    pub fn new(line: usize, command: Command) -> Self {
        Instruction { line, command }
    }
}
