//! Translates programs for a stack-based virtual machine into symbolic Hack
//! assembly.
//!
//! ```
//! let asm = vm_translator::translate("Main", "push constant 7\npush constant 8\nadd\n").unwrap();
//! assert_eq!(asm[0], "// push constant 7");
//! ```

pub mod ast;
pub mod cli;
pub mod error;
pub mod log;
pub mod parser;
pub mod translator;

pub use error::TranslateError;
pub use translator::Translator;

/// Parses and translates a whole unit. `unit` scopes the unit's static cells.
pub fn translate(unit: &str, source: &str) -> Result<Vec<String>, TranslateError> {
    let instructions = parser::parse(source)?;
    Translator::new(unit).translate(&instructions)
}
