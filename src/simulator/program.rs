/// Host program decoder.
///
/// A program is a line-oriented list of host operations:
///
/// ```text
/// codebook 0x04030201          # store codebook
/// weights 0x01FFFA32 0x12ED547A
/// reset
/// acc 0 0x01010101 0x01010101  # accumulate with weight slot 0
/// read
/// expect 23
/// raw 2 0b10001 0x01010101 0x01010101
/// idle 4
/// ```
use crate::arch::simd8::{Funct, Mode};
use crate::error::{CfuError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOp {
  Codebook(u32),
  Weights { lo: u32, hi: u32 },
  Reset,
  Accumulate { slot: u8, in0: u32, in1: u32 },
  Read,
  Raw { funct: Funct, mode: Mode, rs1: u32, rs2: u32 },
  Idle(u64),
  /// Check the result of the previous instruction
  Expect(u32),
}

impl HostOp {
  /// The instruction this operation issues, if any
  pub fn instruction(&self) -> Option<(Funct, Mode, u32, u32)> {
    match *self {
      HostOp::Codebook(clusters) => Some((Funct::StoreCodebook, Mode::NONE, 0, clusters)),
      HostOp::Weights { lo, hi } => Some((Funct::Weights, Mode::STORE_WEIGHTS, lo, hi)),
      HostOp::Reset => Some((Funct::Mac, Mode::RESET, 0, 0)),
      HostOp::Accumulate { slot, in0, in1 } => Some((Funct::Mac, Mode::accumulate(slot), in0, in1)),
      HostOp::Read => Some((Funct::Mac, Mode::NONE, 0, 0)),
      HostOp::Raw { funct, mode, rs1, rs2 } => Some((funct, mode, rs1, rs2)),
      HostOp::Idle(_) | HostOp::Expect(_) => None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramLine {
  /// 1-based source line
  pub line: usize,
  pub op: HostOp,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
  pub lines: Vec<ProgramLine>,
}

impl Program {
  pub fn parse(src: &str) -> Result<Self> {
    let mut lines = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
      let text = raw.split('#').next().unwrap_or_default().trim();
      if text.is_empty() {
        continue;
      }
      let op = decode_line(text).map_err(|msg| CfuError::Parse { line: idx + 1, msg })?;
      lines.push(ProgramLine { line: idx + 1, op });
    }
    log::debug!("[program] decoded {} operations", lines.len());
    Ok(Self { lines })
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}

fn decode_line(text: &str) -> std::result::Result<HostOp, String> {
  let parts: Vec<&str> = text.split_whitespace().collect();
  let args = &parts[1..];

  let expect_args = |n: usize| {
    if args.len() == n {
      Ok(())
    } else {
      Err(format!("{} expects {} args, got {}", parts[0], n, args.len()))
    }
  };

  match parts[0] {
    "codebook" => {
      expect_args(1)?;
      Ok(HostOp::Codebook(parse_word(args[0])?))
    },
    "weights" => {
      expect_args(2)?;
      Ok(HostOp::Weights {
        lo: parse_word(args[0])?,
        hi: parse_word(args[1])?,
      })
    },
    "reset" => {
      expect_args(0)?;
      Ok(HostOp::Reset)
    },
    "acc" => {
      expect_args(3)?;
      let slot = parse_word(args[0])?;
      if slot > 3 {
        return Err(format!("weight slot {} out of range 0..=3", slot));
      }
      Ok(HostOp::Accumulate {
        slot: slot as u8,
        in0: parse_word(args[1])?,
        in1: parse_word(args[2])?,
      })
    },
    "read" => {
      expect_args(0)?;
      Ok(HostOp::Read)
    },
    "raw" => {
      expect_args(4)?;
      let funct3 = parse_word(args[0])?;
      let funct = u8::try_from(funct3)
        .ok()
        .and_then(|f| Funct::try_from(f).ok())
        .ok_or_else(|| format!("invalid unit selector {}", funct3))?;
      let funct7 = parse_word(args[1])?;
      if funct7 > 0x7F {
        return Err(format!("funct7 {:#x} does not fit in 7 bits", funct7));
      }
      Ok(HostOp::Raw {
        funct,
        mode: Mode::new(funct7 as u8),
        rs1: parse_word(args[2])?,
        rs2: parse_word(args[3])?,
      })
    },
    "idle" => match args {
      [] => Ok(HostOp::Idle(1)),
      [n] => Ok(HostOp::Idle(parse_word(n)? as u64)),
      _ => Err(format!("idle expects at most 1 arg, got {}", args.len())),
    },
    "expect" => {
      expect_args(1)?;
      Ok(HostOp::Expect(parse_word(args[0])?))
    },
    other => Err(format!("Unknown host operation: {}", other)),
  }
}

/// Parse a 32-bit word: decimal, `0x` hex or `0b` binary. Negative decimals
/// are taken as two's complement.
pub fn parse_word(s: &str) -> std::result::Result<u32, String> {
  let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
    u32::from_str_radix(&hex.replace('_', ""), 16).map_err(|e| e.to_string())
  } else if let Some(bin) = s.strip_prefix("0b") {
    u32::from_str_radix(&bin.replace('_', ""), 2).map_err(|e| e.to_string())
  } else if s.starts_with('-') {
    s.parse::<i32>().map(|v| v as u32).map_err(|e| e.to_string())
  } else {
    s.parse::<u32>().map_err(|e| e.to_string())
  };
  parsed.map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_program() {
    let src = "
      # load
      codebook 0x04030201
      weights 0x01FFFA32 0x12ED547A   # slots
      reset
      acc 1 0x01010101 0x01010101
      read
      expect 21
      raw 2 0b0001 0 0
      idle
      idle 3
      expect -205
    ";
    let program = Program::parse(src).unwrap();
    let ops: Vec<HostOp> = program.lines.iter().map(|l| l.op).collect();
    assert_eq!(
      ops,
      vec![
        HostOp::Codebook(0x04030201),
        HostOp::Weights {
          lo: 0x01FFFA32,
          hi: 0x12ED547A
        },
        HostOp::Reset,
        HostOp::Accumulate {
          slot: 1,
          in0: 0x01010101,
          in1: 0x01010101
        },
        HostOp::Read,
        HostOp::Expect(21),
        HostOp::Raw {
          funct: Funct::Mac,
          mode: Mode::new(1),
          rs1: 0,
          rs2: 0
        },
        HostOp::Idle(1),
        HostOp::Idle(3),
        HostOp::Expect(-205i32 as u32),
      ]
    );
    assert_eq!(program.lines[0].line, 3);
  }

  #[test]
  fn test_parse_errors_carry_line() {
    let err = Program::parse("reset\nacc 4 0 0\n").unwrap_err();
    match err {
      CfuError::Parse { line, msg } => {
        assert_eq!(line, 2);
        assert!(msg.contains("out of range"));
      },
      other => panic!("unexpected error {:?}", other),
    }

    assert!(matches!(Program::parse("raw 3 0 0 0"), Err(CfuError::Parse { line: 1, .. })));
    assert!(matches!(Program::parse("raw 2 0x80 0 0"), Err(CfuError::Parse { .. })));
    assert!(matches!(Program::parse("weights 1"), Err(CfuError::Parse { .. })));
    assert!(matches!(Program::parse("mvin 1 2"), Err(CfuError::Parse { .. })));
    assert!(matches!(Program::parse("codebook 0xZZ"), Err(CfuError::Parse { .. })));
  }

  #[test]
  fn test_instruction_mapping() {
    assert_eq!(
      HostOp::Accumulate { slot: 2, in0: 1, in1: 2 }.instruction(),
      Some((Funct::Mac, Mode::new(0b10010), 1, 2))
    );
    assert_eq!(
      HostOp::Weights { lo: 1, hi: 2 }.instruction(),
      Some((Funct::Weights, Mode::new(0b100), 1, 2))
    );
    assert_eq!(HostOp::Idle(2).instruction(), None);
  }

  #[test]
  fn test_parse_word() {
    assert_eq!(parse_word("0xFFFF_FFFF"), Ok(u32::MAX));
    assert_eq!(parse_word("0b1000"), Ok(8));
    assert_eq!(parse_word("-1"), Ok(u32::MAX));
    assert_eq!(parse_word("461"), Ok(461));
    assert!(parse_word("4294967296").is_err());
  }
}
