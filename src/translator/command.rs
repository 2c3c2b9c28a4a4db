//! Value types describing one parsed VM command.
//!
//! A VM program is line-oriented. Each line holds at most one command;
//! `//` begins a comment and blank lines are skipped. Mnemonics and
//! segment names are matched case-insensitively.
//!
//! ```text
//! push constant 7     // stack: 7
//! push constant 8     // stack: 7 8
//! add                 // stack: 15
//! pop local 0
//!
//! function Mult.double 0
//! push argument 0
//! push argument 0
//! add
//! return
//! ```

use std::fmt;

/// The nine arithmetic/logic mnemonics of the stack machine.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Operator {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl Operator {
    /// Match a lower-cased first token against the operator set.
    pub fn from_mnemonic(token: &str) -> Option<Operator> {
        use Operator::*;
        match token {
            "add" => Some(Add),
            "sub" => Some(Sub),
            "neg" => Some(Neg),
            "eq" => Some(Eq),
            "gt" => Some(Gt),
            "lt" => Some(Lt),
            "and" => Some(And),
            "or" => Some(Or),
            "not" => Some(Not),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        use Operator::*;
        match self {
            Add => "add",
            Sub => "sub",
            Neg => "neg",
            Eq => "eq",
            Gt => "gt",
            Lt => "lt",
            And => "and",
            Or => "or",
            Not => "not",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// A named addressing region referenced by push/pop.
///
/// `Local`, `Argument`, `This` and `That` are indirect through a base
/// pointer held in a fixed register; `Pointer` and `Temp` map onto a fixed
/// absolute register range; `Static` resolves to a per-module symbol, so
/// two modules in the same output never collide.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Pointer,
    Temp,
    Static,
}

impl Segment {
    /// Match a segment name case-insensitively.
    pub fn from_name(token: &str) -> Option<Segment> {
        use Segment::*;
        match token.to_ascii_lowercase().as_str() {
            "constant" => Some(Constant),
            "local" => Some(Local),
            "argument" => Some(Argument),
            "this" => Some(This),
            "that" => Some(That),
            "pointer" => Some(Pointer),
            "temp" => Some(Temp),
            "static" => Some(Static),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        use Segment::*;
        match self {
            Constant => "constant",
            Local => "local",
            Argument => "argument",
            This => "this",
            That => "that",
            Pointer => "pointer",
            Temp => "temp",
            Static => "static",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One classified VM command. Constructed by the parser, consumed once by
/// the code writer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    Arithmetic(Operator),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Command::*;
        match self {
            Arithmetic(op) => write!(f, "{}", op),
            Push(segment, index) => write!(f, "push {} {}", segment, index),
            Pop(segment, index) => write!(f, "pop {} {}", segment, index),
            Label(name) => write!(f, "label {}", name),
            Goto(name) => write!(f, "goto {}", name),
            IfGoto(name) => write!(f, "if-goto {}", name),
            Function(name, locals) => write!(f, "function {} {}", name, locals),
            Call(name, args) => write!(f, "call {} {}", name, args),
            Return => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_from_mnemonic() {
        assert_eq!(Operator::from_mnemonic("add"), Some(Operator::Add));
        assert_eq!(Operator::from_mnemonic("sub"), Some(Operator::Sub));
        assert_eq!(Operator::from_mnemonic("neg"), Some(Operator::Neg));
        assert_eq!(Operator::from_mnemonic("eq"), Some(Operator::Eq));
        assert_eq!(Operator::from_mnemonic("gt"), Some(Operator::Gt));
        assert_eq!(Operator::from_mnemonic("lt"), Some(Operator::Lt));
        assert_eq!(Operator::from_mnemonic("and"), Some(Operator::And));
        assert_eq!(Operator::from_mnemonic("or"), Some(Operator::Or));
        assert_eq!(Operator::from_mnemonic("not"), Some(Operator::Not));

        assert_eq!(Operator::from_mnemonic("xor"), None);
        assert_eq!(Operator::from_mnemonic(""), None);
        // Callers lower-case the token first; this function is exact.
        assert_eq!(Operator::from_mnemonic("ADD"), None);
    }

    #[test]
    fn test_segment_from_name() {
        assert_eq!(Segment::from_name("constant"), Some(Segment::Constant));
        assert_eq!(Segment::from_name("local"), Some(Segment::Local));
        assert_eq!(Segment::from_name("argument"), Some(Segment::Argument));
        assert_eq!(Segment::from_name("this"), Some(Segment::This));
        assert_eq!(Segment::from_name("that"), Some(Segment::That));
        assert_eq!(Segment::from_name("pointer"), Some(Segment::Pointer));
        assert_eq!(Segment::from_name("temp"), Some(Segment::Temp));
        assert_eq!(Segment::from_name("static"), Some(Segment::Static));

        // Segment names are matched case-insensitively.
        assert_eq!(Segment::from_name("Constant"), Some(Segment::Constant));
        assert_eq!(Segment::from_name("TEMP"), Some(Segment::Temp));

        assert_eq!(Segment::from_name("heap"), None);
        assert_eq!(Segment::from_name(""), None);
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::Arithmetic(Operator::Add).to_string(), "add");
        assert_eq!(Command::Push(Segment::Constant, 7).to_string(), "push constant 7");
        assert_eq!(Command::Pop(Segment::Local, 2).to_string(), "pop local 2");
        assert_eq!(Command::Label("LOOP".to_string()).to_string(), "label LOOP");
        assert_eq!(Command::IfGoto("LOOP".to_string()).to_string(), "if-goto LOOP");
        assert_eq!(
            Command::Function("Sys.init".to_string(), 2).to_string(),
            "function Sys.init 2"
        );
        assert_eq!(Command::Call("Sys.init".to_string(), 0).to_string(), "call Sys.init 0");
        assert_eq!(Command::Return.to_string(), "return");
    }
}
