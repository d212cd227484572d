use crate::analysis::{
    analyzed_sequence, dynamic_counts, replay, static_counts, Counters, Error, Instruction,
    ReturnStack, Trace, TraceEvent,
};
use crate::trace::{InstructionKind, Line};

fn sequence(text: &str) -> Vec<Instruction> {
    let lines: Vec<&str> = text.lines().collect();

    analyzed_sequence(&lines, 0)
}

fn pcs(instructions: &[Instruction]) -> Vec<u64> {
    instructions.iter().map(|i| i.pc()).collect()
}

#[test]
fn call_falls_through() {
    let instrs = sequence("CALL pc = 0x1000 machcode = beef\npc = 0x1004 machcode = cafe");

    assert_eq!(instrs.len(), 2);
    assert_eq!(instrs[0].kind(), InstructionKind::Call);
    assert!(!instrs[0].is_taken());

    let mut log = Trace::new();
    let counters = replay(&instrs, &mut log).unwrap();

    assert_eq!(counters, Counters::new());
    assert!(log.iter().all(|e| match e {
        TraceEvent::Execute { depth, .. } => *depth == 0,
        _ => false,
    }));
}

#[test]
fn call_taken() {
    let instrs = sequence("CALL pc = 0x2000 machcode = aa\npc = 0x3000 machcode = bb");

    assert!(instrs[0].is_taken());
    assert_eq!(instrs[0].fallthrough(), 0x2004);
}

#[test]
fn backwards_call_taken() {
    let instrs = sequence("CALL pc = 0x2000 machcode = aa\npc = 0x1ffc machcode = bb");

    assert!(instrs[0].is_taken());
}

#[test]
fn syscall_skips_trap_line() {
    let instrs = sequence(
        "SYSCALL pc = 0x100 machcode = 1\n\
         trap entry\n\
         pc = 0x108 machcode = 2",
    );

    assert_eq!(pcs(&instrs), vec![0x100, 0x108]);
    assert_eq!(instrs[0].kind(), InstructionKind::PrivilegedCall);
    assert!(!instrs[0].is_taken());

    let instrs = sequence(
        "SYSCALL pc = 0x100 machcode = 1\n\
         pc = 0x104 machcode = 9\n\
         pc = 0x8000 machcode = 2",
    );

    assert!(instrs[0].is_taken());
    assert_eq!(instrs[0].fallthrough(), 0x108);
}

#[test]
fn unresolvable_lookahead_is_dropped() {
    let instrs = sequence(
        "pc = 0x0 machcode = 0\n\
         CALL pc = 0x4 machcode = 1\n\
         garbage\n\
         RETURN pc = 0x10 machcode = 2",
    );

    assert_eq!(pcs(&instrs), vec![0x0]);
}

#[test]
fn lookahead_uses_raw_lines() {
    // The lookahead line has a pc but no machcode: good enough to resolve
    // the call, but not retained itself.
    let instrs = sequence(
        "CALL pc = 0x4 machcode = 1\n\
         pc = 0x40\n\
         pc = 0x44 machcode = 2",
    );

    assert_eq!(pcs(&instrs), vec![0x4, 0x44]);
    assert!(instrs[0].is_taken());
}

#[test]
fn uncommitted_lines_are_dropped() {
    let instrs = sequence(
        "CALL pc = 0x4\n\
         machcode = 00\n\
         pc = 0x8 machcode = 1",
    );

    assert_eq!(pcs(&instrs), vec![0x8]);
}

#[test]
fn trailing_syscall_is_dropped() {
    let instrs = sequence("pc = 0x0 machcode = 0\nSYSCALL pc = 0x4 machcode = 1\npc = 0xc machcode = 2");

    assert_eq!(pcs(&instrs), vec![0x0, 0xc]);
}

#[test]
fn analysis_start_offset() {
    let lines = ["CALL pc = 0x0 machcode = 0", "pc = 0x100 machcode = 1"];
    let instrs = analyzed_sequence(&lines, 1);

    assert_eq!(pcs(&instrs), vec![0x100]);
    assert_eq!(instrs[0].line(), 1);
    assert_eq!(instrs[0].machine_code(), "1");
}

#[test]
fn resolve_without_lookahead() {
    let line = Line::new("RETURN pc = 0x10 machcode = 0");
    let instr = Instruction::from_line(&line, 0).unwrap();

    assert_eq!(instr.resolve_taken(None), None);
    assert_eq!(instr.resolve_taken(Some(&Line::new("pc = 0x14"))), Some(false));
    assert_eq!(instr.resolve_taken(Some(&Line::new("pc = 0x0"))), Some(true));
}

#[test]
fn stack_discipline() {
    let mut ras = ReturnStack::new();

    assert_eq!(ras.pop(), None);
    assert_eq!(ras.tail(2), &[] as &[u64]);

    ras.push(1);
    ras.push(2);
    ras.push(3);

    assert_eq!(ras.depth(), 3);
    assert_eq!(ras.tail(2), &[2, 3]);
    assert_eq!(ras.pop(), Some(3));
    assert_eq!(ras.tail(5), &[1, 2]);
}

const NESTED: &str = "CALL pc = 0x2000 machcode = aa\n\
                      pc = 0x3000 machcode = bb\n\
                      CALL pc = 0x3004 machcode = cc\n\
                      pc = 0x4000 machcode = dd\n\
                      RETURN pc = 0x4004 machcode = ee\n\
                      pc = 0x3008 machcode = ff\n\
                      RETURN pc = 0x300c machcode = 11\n\
                      pc = 0x2004 machcode = 22";

#[test]
fn nested_calls_validate() {
    let instrs = sequence(NESTED);
    let mut log = Trace::new();
    let counters = replay(&instrs, &mut log).unwrap();

    assert_eq!(counters.get(InstructionKind::Call), 2);
    assert_eq!(counters.get(InstructionKind::Return), 2);
    assert_eq!(counters, dynamic_counts(&instrs));

    let depths: Vec<(u64, usize)> = log
        .iter()
        .filter_map(|e| match e {
            TraceEvent::Execute { instr, depth } => Some((instr.pc(), *depth)),
            _ => None,
        })
        .collect();

    assert_eq!(
        depths,
        vec![
            (0x2000, 1),
            (0x3000, 1),
            (0x3004, 2),
            (0x4000, 2),
            (0x4004, 2),
            (0x3008, 1),
            (0x300c, 1),
            (0x2004, 0),
        ]
    );

    let tails: Vec<&Vec<u64>> = log
        .iter()
        .filter_map(|e| match e {
            TraceEvent::StackTail(tail) => Some(tail),
            _ => None,
        })
        .collect();

    assert_eq!(tails, vec![&vec![0x2004, 0x3008], &vec![0x2004]]);
}

#[test]
fn return_mismatch() {
    let instrs = sequence(
        "CALL pc = 0x2000 machcode = aa\n\
         pc = 0x3000 machcode = bb\n\
         RETURN pc = 0x3004 machcode = cc\n\
         pc = 0x5000 machcode = dd\n\
         pc = 0x5004 machcode = ee",
    );
    let mut log = Trace::new();

    match replay(&instrs, &mut log) {
        Err(Error::RasMismatch {
            line,
            expected,
            found,
        }) => {
            assert_eq!(line, 2);
            assert_eq!(expected, 0x2004);
            assert_eq!(found, 0x5000);
        }
        other => panic!("expected a mismatch, got {:?}", other),
    }

    match log.iter().last() {
        Some(TraceEvent::Mismatch { next, depth }) => {
            assert_eq!(next.pc(), 0x5000);
            assert_eq!(*depth, 0);
        }
        other => panic!("expected a mismatch event, got {:?}", other),
    }

    // Nothing after the failing return is replayed.
    assert_eq!(log.iter().count(), 5);
}

#[test]
fn return_underflow() {
    let instrs = sequence("RETURN pc = 0x3004 machcode = cc\npc = 0x2004 machcode = dd");
    let mut log = Trace::new();
    let result = replay(&instrs, &mut log);

    match &result {
        Err(Error::RasUnderflow { line, pc }) => {
            assert_eq!(*line, 0);
            assert_eq!(*pc, 0x3004);
        }
        other => panic!("expected an underflow, got {:?}", other),
    }

    let tail: Vec<&TraceEvent> = log.iter().skip(1).collect();
    assert_eq!(
        tail,
        vec![&TraceEvent::StackTail(vec![]), &TraceEvent::Underflow]
    );
}

#[test]
fn dangling_return() {
    let instrs = sequence(
        "CALL pc = 0x2000 machcode = aa\n\
         pc = 0x3000 machcode = bb\n\
         RETURN pc = 0x3004 machcode = cc\n\
         pc = 0x2004",
    );
    let mut log = Trace::new();

    match replay(&instrs, &mut log) {
        Err(Error::DanglingReturn { line, expected }) => {
            assert_eq!(line, 2);
            assert_eq!(expected, 0x2004);
        }
        other => panic!("expected a dangling return, got {:?}", other),
    }
}

#[test]
fn not_taken_return_is_logged() {
    let instrs = sequence("RETURN pc = 0x10 machcode = 0\npc = 0x14 machcode = 1");
    let mut log = Trace::new();

    assert_eq!(replay(&instrs, &mut log).unwrap(), Counters::new());
    assert_eq!(log.iter().count(), 2);
}

#[test]
fn static_single_bucket() {
    let lines = [
        "SYSCALL CALL RETURN",
        "SYSRETURN RETURN",
        "XCALLX",
        "RETURNED",
        "nothing",
        "**** REAL SIMULATION ****",
    ];
    let counters = static_counts(&lines);

    assert_eq!(counters.get(InstructionKind::PrivilegedCall), 1);
    assert_eq!(counters.get(InstructionKind::PrivilegedReturn), 1);
    assert_eq!(counters.get(InstructionKind::Call), 1);
    assert_eq!(counters.get(InstructionKind::Return), 1);
    assert_eq!(counters.total(), 4);
}

#[test]
fn dynamic_only_counts_taken() {
    let instrs = sequence(
        "SYSCALL pc = 0x0 machcode = 0\n\
         trap\n\
         pc = 0x8 machcode = 1\n\
         SYSCALL pc = 0xc machcode = 2\n\
         trap\n\
         pc = 0x900 machcode = 3\n\
         SYSRETURN pc = 0x904 machcode = 4\n\
         pc = 0x14 machcode = 5",
    );
    let counters = dynamic_counts(&instrs);

    assert_eq!(counters.get(InstructionKind::PrivilegedCall), 1);
    assert_eq!(counters.get(InstructionKind::PrivilegedReturn), 1);
    assert_eq!(counters.total(), 2);

    let mut log = Trace::new();
    assert_eq!(replay(&instrs, &mut log).unwrap(), counters);
}

#[test]
fn counters_display() {
    let mut counters = Counters::new();
    counters
        .bump(InstructionKind::PrivilegedCall)
        .bump(InstructionKind::Return)
        .bump(InstructionKind::Return)
        .bump(InstructionKind::None);

    assert_eq!(
        counters.to_string(),
        "SYSCALL : SYSRETURN : CALL : RETURN = 1 : 0 : 0 : 2"
    );
}
