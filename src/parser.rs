use nom::{
    branch::alt,
    bytes::complete::{is_a, tag, take_till1},
    character::{
        complete::{digit1, space1},
        is_digit,
    },
    combinator::{map, value, verify},
    sequence::tuple,
    IResult,
};

use crate::ast::{BinaryOp, Command, CompareOp, Instruction, Segment, UnaryOp};
use crate::error::TranslateError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Direction {
    Push,
    Pop,
}

fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

// Segment and index are left as text so an unknown name or an oversized
// index is reported as such instead of as an unrecognized line.
fn memory_access(input: &str) -> IResult<&str, (Direction, &str, &str)> {
    map(
        tuple((
            alt((
                value(Direction::Push, tag("push")),
                value(Direction::Pop, tag("pop")),
            )),
            space1,
            word,
            space1,
            digit1,
        )),
        |(direction, _, segment, _, arg)| (direction, segment, arg),
    )(input)
}

#[test]
fn test_memory_access() {
    assert_eq!(
        memory_access("push  pointer  32"),
        Ok(("", (Direction::Push, "pointer", "32")))
    );
    assert_eq!(
        memory_access("pop\tfoo-bar 1"),
        Ok(("", (Direction::Pop, "foo-bar", "1")))
    );
    assert_eq!(
        memory_access("push constant 70000"),
        Ok(("", (Direction::Push, "constant", "70000")))
    );
    assert!(memory_access("push constant").is_err());
    assert!(memory_access("push constant -1").is_err());
}

fn operator(input: &str) -> IResult<&str, Command> {
    alt((
        value(Command::Binary(BinaryOp::Add), tag("add")),
        value(Command::Binary(BinaryOp::Sub), tag("sub")),
        value(Command::Unary(UnaryOp::Neg), tag("neg")),
        value(Command::Compare(CompareOp::Eq), tag("eq")),
        value(Command::Compare(CompareOp::Gt), tag("gt")),
        value(Command::Compare(CompareOp::Lt), tag("lt")),
        value(Command::Binary(BinaryOp::And), tag("and")),
        value(Command::Binary(BinaryOp::Or), tag("or")),
        value(Command::Unary(UnaryOp::Not), tag("not")),
    ))(input)
}

#[test]
fn test_operator() {
    assert_eq!(operator("neg"), Ok(("", Command::Unary(UnaryOp::Neg))));
    assert_eq!(operator("sub"), Ok(("", Command::Binary(BinaryOp::Sub))));
    assert_eq!(operator("lt"), Ok(("", Command::Compare(CompareOp::Lt))));
    assert_eq!(operator("addx"), Ok(("x", Command::Binary(BinaryOp::Add))));
}

fn symbol(input: &str) -> IResult<&str, &str> {
    verify(
        is_a("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_.$:0123456789"),
        |c: &str| !is_digit(c.as_bytes()[0]),
    )(input)
}

/// Whether `name` can be used verbatim as an assembler symbol.
pub fn is_symbol(name: &str) -> bool {
    matches!(symbol(name), Ok(("", _)))
}

#[test]
fn test_is_symbol() {
    assert!(is_symbol("Main"));
    assert!(is_symbol("Foo.Bar$1:x"));
    assert!(!is_symbol("1Main"));
    assert!(!is_symbol("my-prog"));
    assert!(!is_symbol(""));
}

/// Strips a trailing `//` comment and surrounding whitespace. Returns `None`
/// for lines that carry no instruction.
pub fn normalize(line: &str) -> Option<&str> {
    let line = line.split_once("//").map(|(s, _)| s).unwrap_or(line).trim();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

#[test]
fn test_normalize() {
    assert_eq!(normalize("  push constant 1 // one "), Some("push constant 1"));
    assert_eq!(normalize("// only a comment"), None);
    assert_eq!(normalize("   \t"), None);
    assert_eq!(normalize("add"), Some("add"));
}

/// Parses one normalized line.
pub fn parse_command(line: usize, text: &str) -> Result<Command, TranslateError> {
    if let Ok(("", command)) = operator(text) {
        return Ok(command);
    }

    match memory_access(text) {
        Ok(("", (direction, segment, arg))) => {
            let segment: Segment =
                segment
                    .parse()
                    .map_err(|_| TranslateError::InvalidSegment {
                        line,
                        segment: segment.to_string(),
                    })?;
            let arg: u16 = arg.parse().map_err(|_| match (direction, segment) {
                (Direction::Pop, Segment::Constant) => TranslateError::PopConstant { line },
                (Direction::Push, Segment::Constant) => TranslateError::ConstantOutOfRange {
                    line,
                    value: arg.to_string(),
                },
                _ => TranslateError::IndexOutOfRange {
                    line,
                    segment,
                    index: arg.to_string(),
                },
            })?;
            Ok(match direction {
                Direction::Push => Command::Push(segment, arg),
                Direction::Pop => Command::Pop(segment, arg),
            })
        }
        _ => Err(TranslateError::UnrecognizedInstruction {
            line,
            text: text.to_string(),
        }),
    }
}

#[test]
fn test_parse_command() {
    assert_eq!(
        parse_command(1, "push local 2"),
        Ok(Command::Push(Segment::Local, 2))
    );
    assert_eq!(
        parse_command(1, "pop that 0"),
        Ok(Command::Pop(Segment::That, 0))
    );
    assert_eq!(
        parse_command(4, "push foobar 0"),
        Err(TranslateError::InvalidSegment {
            line: 4,
            segment: "foobar".to_string()
        })
    );
    assert_eq!(
        parse_command(2, "push constant 7 8"),
        Err(TranslateError::UnrecognizedInstruction {
            line: 2,
            text: "push constant 7 8".to_string()
        })
    );
    assert!(matches!(
        parse_command(3, "goto LOOP"),
        Err(TranslateError::UnrecognizedInstruction { line: 3, .. })
    ));
}

#[test]
fn test_parse_command_classifies_bad_operands() {
    assert_eq!(
        parse_command(1, "push foo.bar 0"),
        Err(TranslateError::InvalidSegment {
            line: 1,
            segment: "foo.bar".to_string()
        })
    );
    assert_eq!(
        parse_command(2, "pop foo-bar 1"),
        Err(TranslateError::InvalidSegment {
            line: 2,
            segment: "foo-bar".to_string()
        })
    );
    assert_eq!(
        parse_command(3, "push constant 70000"),
        Err(TranslateError::ConstantOutOfRange {
            line: 3,
            value: "70000".to_string()
        })
    );
    assert_eq!(
        parse_command(4, "push local 123456789012345678901234567890"),
        Err(TranslateError::IndexOutOfRange {
            line: 4,
            segment: Segment::Local,
            index: "123456789012345678901234567890".to_string()
        })
    );
    assert_eq!(
        parse_command(5, "pop constant 70000"),
        Err(TranslateError::PopConstant { line: 5 })
    );
}

/// Normalizes and parses a sequence of source lines. Line numbers in errors
/// count every input line, including the ones dropped as blank or comment.
pub fn parse_lines<I, S>(lines: I) -> Result<Vec<Instruction>, TranslateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut instructions = vec![];

    for (index, line) in lines.into_iter().enumerate() {
        let Some(text) = normalize(line.as_ref()) else {
            continue;
        };
        let number = index + 1;
        instructions.push(Instruction::new(number, parse_command(number, text)?));
    }

    Ok(instructions)
}

pub fn parse(input: &str) -> Result<Vec<Instruction>, TranslateError> {
    parse_lines(input.lines())
}

#[test]
fn test_parse() {
    let source = "// header\n\npush constant 7\n  push constant 8 // eight\nadd\n";
    let instructions = parse(source).unwrap();
    assert_eq!(
        instructions,
        vec![
            Instruction::new(3, Command::Push(Segment::Constant, 7)),
            Instruction::new(4, Command::Push(Segment::Constant, 8)),
            Instruction::new(5, Command::Binary(BinaryOp::Add)),
        ]
    );
    assert_eq!(parse("// nothing\n\n").unwrap(), vec![]);
    assert!(matches!(
        parse("push constant 1\nfrobnicate\n"),
        Err(TranslateError::UnrecognizedInstruction { line: 2, .. })
    ));
}
