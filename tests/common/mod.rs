//! A minimal Hack CPU: enough of the assembler and the ALU to execute the
//! code the translator emits.

use std::collections::HashMap;

pub const STACK_BASE: i16 = 256;

#[derive(Debug, Clone)]
enum Op {
    Address(i16),
    Compute {
        dest: String,
        comp: String,
        jump: Option<String>,
    },
}

pub struct Hack {
    rom: Vec<Op>,
    pub ram: Vec<i16>,
    pub symbols: HashMap<String, i16>,
    a: i16,
    d: i16,
    pc: usize,
}

fn predefined() -> HashMap<String, i16> {
    let mut symbols: HashMap<String, i16> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    for r in 0..16 {
        symbols.insert(format!("R{}", r), r);
    }
    symbols
}

fn code_lines(lines: &[String]) -> impl Iterator<Item = &str> {
    lines
        .iter()
        .map(|l| l.split_once("//").map(|(s, _)| s).unwrap_or(l).trim())
        .filter(|l| !l.is_empty())
}

impl Hack {
    pub fn assemble(lines: &[String]) -> Hack {
        let mut symbols = predefined();

        let mut address = 0;
        for line in code_lines(lines) {
            if let Some(name) = line.strip_prefix('(').and_then(|l| l.strip_suffix(')')) {
                assert!(
                    symbols.insert(name.to_string(), address).is_none(),
                    "label {} defined twice",
                    name
                );
            } else {
                address += 1;
            }
        }

        let mut next_variable = 16;
        let mut rom = vec![];
        for line in code_lines(lines) {
            if line.starts_with('(') {
                continue;
            }
            if let Some(operand) = line.strip_prefix('@') {
                let value = match operand.parse::<i16>() {
                    Ok(value) => value,
                    Err(_) => *symbols.entry(operand.to_string()).or_insert_with(|| {
                        let slot = next_variable;
                        next_variable += 1;
                        slot
                    }),
                };
                rom.push(Op::Address(value));
                continue;
            }
            let (rest, jump) = match line.split_once(';') {
                Some((rest, jump)) => (rest, Some(jump.to_string())),
                None => (line, None),
            };
            let (dest, comp) = match rest.split_once('=') {
                Some((dest, comp)) => (dest.to_string(), comp.to_string()),
                None => (String::new(), rest.to_string()),
            };
            rom.push(Op::Compute { dest, comp, jump });
        }

        let mut ram = vec![0; 32768];
        ram[0] = STACK_BASE;
        ram[1] = 300;
        ram[2] = 400;
        ram[3] = 3000;
        ram[4] = 3010;

        Hack {
            rom,
            ram,
            symbols,
            a: 0,
            d: 0,
            pc: 0,
        }
    }

    fn compute(&self, comp: &str) -> i16 {
        let (a, d) = (self.a, self.d);
        let m = self.ram[a as u16 as usize];
        match comp {
            "0" => 0,
            "1" => 1,
            "-1" => -1,
            "D" => d,
            "A" => a,
            "M" => m,
            "!D" => !d,
            "!A" => !a,
            "!M" => !m,
            "-D" => d.wrapping_neg(),
            "-A" => a.wrapping_neg(),
            "-M" => m.wrapping_neg(),
            "D+1" => d.wrapping_add(1),
            "A+1" => a.wrapping_add(1),
            "M+1" => m.wrapping_add(1),
            "D-1" => d.wrapping_sub(1),
            "A-1" => a.wrapping_sub(1),
            "M-1" => m.wrapping_sub(1),
            "D+A" | "A+D" => d.wrapping_add(a),
            "D+M" | "M+D" => d.wrapping_add(m),
            "D-A" => d.wrapping_sub(a),
            "D-M" => d.wrapping_sub(m),
            "A-D" => a.wrapping_sub(d),
            "M-D" => m.wrapping_sub(d),
            "D&A" | "A&D" => d & a,
            "D&M" | "M&D" => d & m,
            "D|A" | "A|D" => d | a,
            "D|M" | "M|D" => d | m,
            other => panic!("unsupported comp {}", other),
        }
    }

    fn step(&mut self) {
        match self.rom[self.pc].clone() {
            Op::Address(value) => {
                self.a = value;
                self.pc += 1;
            }
            Op::Compute { dest, comp, jump } => {
                let value = self.compute(&comp);
                let target = self.a;
                if dest.contains('M') {
                    self.ram[target as u16 as usize] = value;
                }
                if dest.contains('D') {
                    self.d = value;
                }
                if dest.contains('A') {
                    self.a = value;
                }
                let taken = match jump.as_deref() {
                    None => false,
                    Some("JGT") => value > 0,
                    Some("JEQ") => value == 0,
                    Some("JGE") => value >= 0,
                    Some("JLT") => value < 0,
                    Some("JNE") => value != 0,
                    Some("JLE") => value <= 0,
                    Some("JMP") => true,
                    Some(other) => panic!("unsupported jump {}", other),
                };
                if taken {
                    self.pc = target as u16 as usize;
                } else {
                    self.pc += 1;
                }
            }
        }
    }

    /// Runs until the program falls off the end of ROM.
    pub fn run(&mut self) {
        let mut steps = 0;
        while self.pc < self.rom.len() {
            self.step();
            steps += 1;
            assert!(steps < 100_000, "program did not terminate");
        }
    }

    pub fn sp(&self) -> i16 {
        self.ram[0]
    }

    pub fn stack(&self) -> &[i16] {
        &self.ram[STACK_BASE as usize..self.sp() as usize]
    }

    pub fn symbol(&self, name: &str) -> i16 {
        self.symbols[name]
    }
}

/// Translates `source` as unit `Test`, executes it and returns the machine.
pub fn execute(source: &str) -> Hack {
    let lines = vm_translator::translate("Test", source).expect("translation succeeds");
    let mut hack = Hack::assemble(&lines);
    hack.run();
    hack
}
