use crate::ast::{BinaryOp, Command, CompareOp, Instruction, Segment, UnaryOp};
use crate::error::TranslateError;

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

/// Scratch cell: caches a pop target address, or holds the right operand.
const SCRATCH: &str = "R13";
/// Resume address handed to the comparison subroutines.
const RETURN_ADDRESS: &str = "R14";
const TEMP_BASE: u16 = 5;
const TEMP_SIZE: u16 = 8;
const MAX_CONSTANT: u16 = 0x7fff;

fn at_c(arg: u16) -> String {
    format!("@{arg}", arg = arg)
}

fn at_s(arg: &str) -> String {
    format!("@{arg}", arg = arg)
}

fn label(sym: &str) -> String {
    format!("({})", sym)
}

/// *SP = D; SP++
fn push_d() -> Vec<String> {
    svec!["@SP", "A=M", "M=D", "@SP", "M=M+1"]
}

/// SP--; D = *SP
fn pop_d() -> Vec<String> {
    svec!["@SP", "M=M-1", "A=M", "D=M"]
}

/// How a segment's cells are reached.
enum Address {
    /// Effective address computed into A from a base.
    Computed(Vec<String>),
    /// The cell has its own symbol.
    Symbol(String),
    /// No cell at all; the index is the value.
    Literal(u16),
}

/// A = M[base] + arg
fn indirect(base: &str, arg: u16) -> Vec<String> {
    svec![at_c(arg), "D=A", at_s(base), "A=D+M"]
}

/// A = base + arg
fn direct(base: u16, arg: u16) -> Vec<String> {
    svec![at_c(arg), "D=A", at_c(base), "A=D+A"]
}

fn simple_un_op(op: UnaryOp) -> Vec<String> {
    let compute = match op {
        UnaryOp::Neg => "D=-D",
        UnaryOp::Not => "D=!D",
    };
    svec!["@SP", "M=M-1", "A=M", "D=M", compute, "M=D", "@SP", "M=M+1"]
}

/// Leaves the right operand in SCRATCH and the left one in D.
fn pop_operands() -> Vec<String> {
    let mut lines = pop_d();
    lines.extend(svec![at_s(SCRATCH), "M=D"]);
    lines.extend(pop_d());
    lines.push(at_s(SCRATCH));
    lines
}

/// D = left <op> right, written back as the new top.
fn simple_bin_op(op: BinaryOp) -> Vec<String> {
    let compute = match op {
        BinaryOp::Add => "D=D+M",
        BinaryOp::Sub => "D=D-M",
        BinaryOp::And => "D=D&M",
        BinaryOp::Or => "D=D|M",
    };
    let mut lines = pop_operands();
    lines.push(compute.to_string());
    lines.extend(push_d());
    lines
}

/// Writes `value` at the stack top, advances SP and jumps back to the caller.
fn result_routine(name: &str, value: &str) -> Vec<String> {
    let mut lines = svec![label(name), "@SP", "A=M", format!("M={}", value), "@SP", "M=M+1"];
    lines.extend(svec![at_s(RETURN_ADDRESS), "A=M", "0;JMP"]);
    lines
}

fn compare_routine(op: CompareOp) -> Vec<String> {
    let mut lines = vec![label(op.routine())];
    lines.extend(pop_operands());
    lines.extend(svec![
        "D=D-M",
        "@TRUE",
        format!("D;{}", op.jump()),
        "@FALSE",
        "0;JMP"
    ]);
    lines
}

/// Shared comparison code, jumped over on entry.
fn bootstrap() -> Vec<Vec<String>> {
    let mut blocks = vec![
        svec!["// skip comparison subroutines", "@START", "0;JMP"],
        [vec!["// true".to_string()], result_routine("TRUE", "-1")].concat(),
        [vec!["// false".to_string()], result_routine("FALSE", "0")].concat(),
    ];
    for op in CompareOp::ALL {
        let comment = format!("// {}", Command::Compare(op));
        blocks.push([vec![comment], compare_routine(op)].concat());
    }
    blocks.push(svec!["// program", label("START")]);
    blocks
}

/// Per-kind counters for comparison return labels.
#[derive(Debug, Default)]
struct ReturnSites {
    eq: usize,
    lt: usize,
    gt: usize,
}

impl ReturnSites {
    fn next(&mut self, op: CompareOp) -> usize {
        let counter = match op {
            CompareOp::Eq => &mut self.eq,
            CompareOp::Lt => &mut self.lt,
            CompareOp::Gt => &mut self.gt,
        };
        let tmp = *counter;
        *counter += 1;
        tmp
    }
}

/// Translation context for a single unit. Static cells are scoped by the
/// unit name, and comparison return labels are numbered per unit.
pub struct Translator<'a> {
    unit: &'a str,
    return_sites: ReturnSites,
    uses_comparisons: bool,
}

impl<'a> Translator<'a> {
    pub fn new(unit: &'a str) -> Self {
        Translator {
            unit,
            return_sites: ReturnSites::default(),
            uses_comparisons: false,
        }
    }

    fn static_sym(&self, arg: u16) -> String {
        format!("{}.{}", self.unit, arg)
    }

    fn resolve(&self, segment: Segment, arg: u16, line: usize) -> Result<Address, TranslateError> {
        let out_of_range = || TranslateError::IndexOutOfRange {
            line,
            segment,
            index: arg.to_string(),
        };
        match segment {
            Segment::Local => Ok(Address::Computed(indirect("LCL", arg))),
            Segment::Argument => Ok(Address::Computed(indirect("ARG", arg))),
            Segment::This => Ok(Address::Computed(indirect("THIS", arg))),
            Segment::That => Ok(Address::Computed(indirect("THAT", arg))),
            Segment::Temp if arg < TEMP_SIZE => Ok(Address::Computed(direct(TEMP_BASE, arg))),
            Segment::Temp => Err(out_of_range()),
            Segment::Pointer => match arg {
                0 => Ok(Address::Symbol("THIS".to_string())),
                1 => Ok(Address::Symbol("THAT".to_string())),
                _ => Err(out_of_range()),
            },
            Segment::Static => Ok(Address::Symbol(self.static_sym(arg))),
            Segment::Constant if arg > MAX_CONSTANT => Err(TranslateError::ConstantOutOfRange {
                line,
                value: arg.to_string(),
            }),
            Segment::Constant => Ok(Address::Literal(arg)),
        }
    }

    fn push(&self, segment: Segment, arg: u16, line: usize) -> Result<Vec<String>, TranslateError> {
        let mut lines = match self.resolve(segment, arg, line)? {
            Address::Computed(mut lines) => {
                lines.push("D=M".to_string());
                lines
            }
            Address::Symbol(sym) => svec![at_s(&sym), "D=M"],
            Address::Literal(value) => svec![at_c(value), "D=A"],
        };
        lines.extend(push_d());
        Ok(lines)
    }

    fn pop(&self, segment: Segment, arg: u16, line: usize) -> Result<Vec<String>, TranslateError> {
        // Before resolving, so an oversized constant still reports the pop.
        if segment == Segment::Constant {
            return Err(TranslateError::PopConstant { line });
        }

        match self.resolve(segment, arg, line)? {
            Address::Computed(mut lines) => {
                // Popping needs A, so park the target address first.
                lines.extend(svec!["D=A", at_s(SCRATCH), "M=D"]);
                lines.extend(pop_d());
                lines.extend(svec![at_s(SCRATCH), "A=M", "M=D"]);
                Ok(lines)
            }
            Address::Symbol(sym) => {
                let mut lines = pop_d();
                lines.extend(svec![at_s(&sym), "M=D"]);
                Ok(lines)
            }
            Address::Literal(_) => Err(TranslateError::PopConstant { line }),
        }
    }

    fn compare(&mut self, op: CompareOp) -> Vec<String> {
        self.uses_comparisons = true;
        let site = self.return_sites.next(op);
        let end_sym = format!("{}.{}.END", op.routine(), site);
        svec![
            at_s(&end_sym),
            "D=A",
            at_s(RETURN_ADDRESS),
            "M=D",
            at_s(op.routine()),
            "0;JMP",
            label(&end_sym)
        ]
    }

    fn lower(&mut self, instruction: &Instruction) -> Result<Vec<String>, TranslateError> {
        let line = instruction.line;
        let translated = match instruction.command {
            Command::Push(seg, arg) => self.push(seg, arg, line)?,
            Command::Pop(seg, arg) => self.pop(seg, arg, line)?,
            Command::Unary(op) => simple_un_op(op),
            Command::Binary(op) => simple_bin_op(op),
            Command::Compare(op) => self.compare(op),
        };
        Ok(translated)
    }

    /// Lowers a whole unit. The first bad instruction aborts the translation
    /// and nothing is returned for the instructions already lowered.
    pub fn translate(mut self, instructions: &[Instruction]) -> Result<Vec<String>, TranslateError> {
        if instructions.is_empty() {
            return Err(TranslateError::EmptyInput);
        }

        let mut blocks: Vec<Vec<String>> = vec![];
        for instruction in instructions {
            let mut block = vec![format!("// {}", instruction.command)];
            block.extend(self.lower(instruction)?);
            blocks.push(block);
        }

        let mut program = if self.uses_comparisons {
            bootstrap()
        } else {
            vec![]
        };
        program.extend(blocks);

        let mut output: Vec<String> = vec![];
        for block in program {
            output.extend(block);
            output.push(String::new());
        }

        Ok(output)
    }
}
