//! The code writer maps each classified command onto a fixed block of Hack
//! assembly.
//!
//! Every block goes through the hardware stack pointer at `@SP`: values
//! are always read and written through the top-of-stack address. The
//! writer carries two pieces of state across the whole run: the current
//! module name, which prefixes `static` symbols, and a label counter that
//! suffixes every generated comparison and return-address label. The
//! counter only ever increases, so generated labels never collide, not
//! even across call sites to the same function.

use super::command::{Command, Operator, Segment};
use super::TranslateError;

macro_rules! svec {
    ($($x:expr),* $(,)?) => (vec![$($x.to_string()),*]);
}

/// Function the bootstrap preamble transfers control to.
const ENTRY_POINT: &str = "Sys.init";

/// Stack base address on the Hack platform.
const STACK_BASE: u16 = 256;

/// Caller registers saved by `call`, in push order. The return address
/// goes first, then these four.
const SAVED_REGISTERS: [&str; 4] = ["LCL", "ARG", "THIS", "THAT"];

/// Restore table for `return`: register and its offset below the frame
/// base. `LCL` must come last; it is the frame base itself, and every
/// entry reads relative to it.
const RESTORE_TABLE: [(&str, u16); 4] = [("THAT", 1), ("THIS", 2), ("ARG", 3), ("LCL", 4)];

pub struct CodeWriter {
    module: Option<String>,
    label_count: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter {
            module: None,
            label_count: 0,
        }
    }

    /// Announce the source unit about to be translated. This only changes
    /// how `static` references resolve; the label counter keeps running.
    pub fn set_module(&mut self, name: &str) {
        self.module = Some(name.to_string());
    }

    /// Stack-pointer init plus a call to the program entry point. Must be
    /// emitted exactly once, before any translated module.
    pub fn write_bootstrap(&mut self) -> Vec<String> {
        let mut out = svec![
            "// bootstrap",
            format!("@{}", STACK_BASE),
            "D=A",
            "@SP",
            "M=D"
        ];
        out.extend(self.call(ENTRY_POINT, 0));
        out
    }

    /// Translate one command into its assembly block. The block opens with
    /// a comment echoing the source command.
    pub fn write(&mut self, command: &Command) -> Result<Vec<String>, TranslateError> {
        let mut out = vec![format!("// {}", command)];
        let body = match command {
            Command::Arithmetic(op) => self.arithmetic(*op),
            Command::Push(segment, index) => self.push(*segment, *index)?,
            Command::Pop(segment, index) => self.pop(*segment, *index)?,
            Command::Label(name) => svec![format!("({})", name)],
            Command::Goto(name) => svec![format!("@{}", name), "0;JMP"],
            Command::IfGoto(name) => svec![
                "@SP",
                "AM=M-1",
                "D=M",
                format!("@{}", name),
                "D;JNE" // false is 0; anything else jumps
            ],
            Command::Function(name, locals) => self.function(name, *locals)?,
            Command::Call(name, args) => self.call(name, *args),
            Command::Return => self.emit_return(),
        };
        out.extend(body);
        Ok(out)
    }

    fn next_label(&mut self) -> usize {
        let n = self.label_count;
        self.label_count += 1;
        n
    }

    fn arithmetic(&mut self, op: Operator) -> Vec<String> {
        match op {
            Operator::Add => binary_op("M=D+M"),
            Operator::Sub => binary_op("M=M-D"), // first-pushed minus second-pushed
            Operator::And => binary_op("M=D&M"),
            Operator::Or => binary_op("M=D|M"),
            Operator::Neg => unary_op("M=-M"),
            Operator::Not => unary_op("M=!M"),
            Operator::Eq => self.compare("JEQ"),
            Operator::Gt => self.compare("JGT"),
            Operator::Lt => self.compare("JLT"),
        }
    }

    /// Pop into D, subtract from the new top, branch on the sign. The true
    /// and end labels are fresh per comparison.
    fn compare(&mut self, jump: &str) -> Vec<String> {
        let n = self.next_label();
        let true_sym = format!("CMP_TRUE_{}", n);
        let end_sym = format!("CMP_END_{}", n);
        svec![
            "@SP",
            "AM=M-1",
            "D=M",
            "A=A-1",
            "D=M-D", // first-pushed minus second-pushed
            format!("@{}", true_sym),
            format!("D;{}", jump),
            "@SP",
            "A=M-1",
            "M=0",
            format!("@{}", end_sym),
            "0;JMP",
            format!("({})", true_sym),
            "@SP",
            "A=M-1",
            "M=-1",
            format!("({})", end_sym)
        ]
    }

    fn push(&self, segment: Segment, index: u16) -> Result<Vec<String>, TranslateError> {
        let mut out = match segment {
            Segment::Constant => svec![format!("@{}", index), "D=A"],
            Segment::Local => push_indirect("LCL", index),
            Segment::Argument => push_indirect("ARG", index),
            Segment::This => push_indirect("THIS", index),
            Segment::That => push_indirect("THAT", index),
            Segment::Temp => svec![format!("@{}", temp_register(index)?), "D=M"],
            Segment::Pointer => svec![format!("@{}", pointer_register(index)?), "D=M"],
            Segment::Static => svec![format!("@{}", self.static_symbol(index)?), "D=M"],
        };
        out.extend(push_d());
        Ok(out)
    }

    fn pop(&self, segment: Segment, index: u16) -> Result<Vec<String>, TranslateError> {
        match segment {
            Segment::Constant => Err(TranslateError::UnresolvedSegment(
                "constant has no writable address".to_string(),
            )),
            Segment::Local => Ok(pop_indirect("LCL", index)),
            Segment::Argument => Ok(pop_indirect("ARG", index)),
            Segment::This => Ok(pop_indirect("THIS", index)),
            Segment::That => Ok(pop_indirect("THAT", index)),
            Segment::Temp => Ok(pop_direct(&temp_register(index)?)),
            Segment::Pointer => Ok(pop_direct(pointer_register(index)?)),
            Segment::Static => Ok(pop_direct(&self.static_symbol(index)?)),
        }
    }

    /// Function entry: declare the label, then zero the local slots by
    /// reusing the push-constant path.
    fn function(&self, name: &str, locals: u16) -> Result<Vec<String>, TranslateError> {
        let mut out = svec![format!("({})", name)];
        for _ in 0..locals {
            out.extend(self.push(Segment::Constant, 0)?);
        }
        Ok(out)
    }

    /// Call protocol: push a fresh return-address literal, save the four
    /// caller registers, repoint ARG below the pushed frame, repoint LCL
    /// at the new stack top, jump, and declare the return label.
    fn call(&mut self, name: &str, args: u16) -> Vec<String> {
        let return_sym = format!("RET_ADDR_{}", self.next_label());

        let mut out = svec![format!("@{}", return_sym), "D=A"];
        out.extend(push_d());
        for register in SAVED_REGISTERS.iter() {
            out.extend(svec![format!("@{}", register), "D=M"]);
            out.extend(push_d());
        }
        out.extend(svec![
            // ARG = SP - (args + 5); the 5 covers the frame just pushed
            "@SP",
            "D=M",
            format!("@{}", u32::from(args) + 5),
            "D=D-A",
            "@ARG",
            "M=D",
            // LCL = SP
            "@SP",
            "D=M",
            "@LCL",
            "M=D",
            format!("@{}", name),
            "0;JMP",
            format!("({})", return_sym)
        ]);
        out
    }

    /// Return protocol: park the frame base and return address in scratch
    /// registers, replace the arguments with the return value, then walk
    /// the restore table. Each entry re-reads the frame base from R13, so
    /// overwriting LCL last cannot corrupt the remaining reads.
    fn emit_return(&self) -> Vec<String> {
        let mut out = svec![
            // R13 = frame base
            "@LCL",
            "D=M",
            "@R13",
            "M=D",
            // R14 = *(frame - 5), the caller's return address
            "@5",
            "A=D-A",
            "D=M",
            "@R14",
            "M=D",
            // *ARG = return value; that slot becomes the new stack top
            "@SP",
            "AM=M-1",
            "D=M",
            "@ARG",
            "A=M",
            "M=D",
            // SP = ARG + 1
            "@ARG",
            "D=M+1",
            "@SP",
            "M=D"
        ];
        for (register, offset) in RESTORE_TABLE.iter() {
            out.extend(svec![
                "@R13",
                "D=M",
                format!("@{}", offset),
                "A=D-A",
                "D=M",
                format!("@{}", register),
                "M=D"
            ]);
        }
        out.extend(svec!["@R14", "A=M", "0;JMP"]);
        out
    }

    fn static_symbol(&self, index: u16) -> Result<String, TranslateError> {
        match &self.module {
            Some(module) => Ok(format!("{}.{}", module, index)),
            None => Err(TranslateError::MissingModuleContext(index)),
        }
    }
}

/// Pop the top into D, then operate on the new top in place.
fn binary_op(op: &str) -> Vec<String> {
    svec!["@SP", "AM=M-1", "D=M", "A=A-1", op]
}

/// Operate on the top of the stack in place; no SP traffic.
fn unary_op(op: &str) -> Vec<String> {
    svec!["@SP", "A=M-1", op]
}

/// Append D to the stack and advance SP.
fn push_d() -> Vec<String> {
    svec!["@SP", "A=M", "M=D", "@SP", "M=M+1"]
}

/// Load `*(base + index)` into D through the segment's base pointer.
fn push_indirect(base: &str, index: u16) -> Vec<String> {
    svec![
        format!("@{}", base),
        "D=M",
        format!("@{}", index),
        "A=D+A",
        "D=M"
    ]
}

/// Pop into a segment reached through a base pointer. The destination
/// address is computed into R13 *before* the stack value is read; the
/// address computation needs D, so doing it after the pop would clobber
/// the popped value.
fn pop_indirect(base: &str, index: u16) -> Vec<String> {
    svec![
        format!("@{}", base),
        "D=M",
        format!("@{}", index),
        "D=D+A",
        "@R13",
        "M=D",
        "@SP",
        "AM=M-1",
        "D=M",
        "@R13",
        "A=M",
        "M=D"
    ]
}

/// Pop straight into a named location.
fn pop_direct(symbol: &str) -> Vec<String> {
    svec!["@SP", "AM=M-1", "D=M", format!("@{}", symbol), "M=D"]
}

fn temp_register(index: u16) -> Result<String, TranslateError> {
    if index > 7 {
        return Err(TranslateError::UnresolvedSegment(format!(
            "temp {} is out of range (temp spans 0..=7)",
            index
        )));
    }
    Ok(format!("R{}", 5 + index))
}

fn pointer_register(index: u16) -> Result<&'static str, TranslateError> {
    match index {
        0 => Ok("THIS"),
        1 => Ok("THAT"),
        _ => Err(TranslateError::UnresolvedSegment(format!(
            "pointer {} is out of range (pointer is 0 or 1)",
            index
        ))),
    }
}
