use std::sync::LazyLock;

use declift_ir::{ByteOrder, IrError, Jump, JumpTarget, Statement, Term};

use super::*;
use crate::instruction::Operand;
use crate::registers::RegisterSpec;
use crate::types::{Condition, FlagKind, InstrFlags, RegisterId, TARGET_PPC};

const R0: RegisterId = RegisterId::new(0);
const R1: RegisterId = RegisterId::new(1);
const CR: RegisterId = RegisterId::new(2);

static CATALOG: LazyLock<RegisterCatalog> = LazyLock::new(|| {
    RegisterCatalog::new(
        "toy",
        [
            RegisterSpec::top(R0, "r0", 64),
            RegisterSpec::top(R1, "r1", 64),
            RegisterSpec::top(CR, "cr", 4),
            RegisterSpec::child(RegisterId::new(3), "lt", CR, 0, 1),
            RegisterSpec::child(RegisterId::new(4), "gt", CR, 1, 1),
            RegisterSpec::child(RegisterId::new(5), "eq", CR, 2, 1),
            RegisterSpec::child(RegisterId::new(6), "so", CR, 3, 1),
        ],
    )
});

const OP_MOVE: OpId = OpId::new(TARGET_PPC, 1);
const OP_BLE: OpId = OpId::new(TARGET_PPC, 2);
const OP_BEQ: OpId = OpId::new(TARGET_PPC, 3);
const OP_BROKEN: OpId = OpId::new(TARGET_PPC, 4);
const OP_DOUBLE: OpId = OpId::new(TARGET_PPC, 5);
const OP_NOP: OpId = OpId::new(TARGET_PPC, 6);
const OP_SYNC: OpId = OpId::new(TARGET_PPC, 7);
const OP_UNKNOWN: OpId = OpId::new(TARGET_PPC, 9);

fn flag(field: u8, kind: FlagKind) -> Option<RegisterId> {
    let bit = match kind {
        FlagKind::Less => 3,
        FlagKind::Greater => 4,
        FlagKind::Equal => 5,
        FlagKind::Overflow => 6,
    };
    (field == 0).then_some(RegisterId::new(bit))
}

fn lift_move(ctx: &mut LiftContext<'_>) -> Result<()> {
    let dst = ctx.register_operand(0)?;
    let value = ctx.operand_term(1)?;
    ctx.set(dst, value)
}

fn lift_ble(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.address_term(0)?;
    branch_on_condition(ctx, Condition::Le, 0, target, flag)
}

fn lift_beq(ctx: &mut LiftContext<'_>) -> Result<()> {
    let target = ctx.address_term(0)?;
    branch_on_condition(ctx, Condition::Eq, 0, target, flag)
}

fn lift_broken(ctx: &mut LiftContext<'_>) -> Result<()> {
    let aux = ctx.aux_block();
    ctx.emit_into(aux, Statement::Return)?;
    ctx.opaque()?;
    ctx.operand(5).map(drop)
}

fn lift_double(ctx: &mut LiftContext<'_>) -> Result<()> {
    ctx.emit(Statement::Return)?;
    ctx.opaque()
}

fn lifter() -> InstructionLifter {
    let rules = RuleTable::new()
        .lift(OP_MOVE, lift_move)
        .lift(OP_BLE, lift_ble)
        .lift(OP_BEQ, lift_beq)
        .lift(OP_BROKEN, lift_broken)
        .lift(OP_DOUBLE, lift_double)
        .with(&[OP_NOP], Rule::Nop)
        .with(&[OP_SYNC], Rule::Opaque);
    InstructionLifter::new(&CATALOG, 64, rules)
}

fn instr(address: u64, opcode: OpId, operands: Vec<Operand>) -> Instruction {
    Instruction {
        address,
        size: 4,
        bytes: vec![0, 0, 0, u8::try_from(opcode.idx).unwrap()],
        opcode,
        mnemonic: "toy",
        operands,
        flags: InstrFlags::default(),
    }
}

fn only_statement(program: &Program, block: BlockId) -> &Statement {
    let statements = program.block(block).unwrap().statements();
    assert_eq!(statements.len(), 1);
    &statements[0]
}

#[test]
fn test_move_lifts_to_assignment() {
    let mut program = Program::new();
    let report = lifter()
        .lift(
            &instr(0x100, OP_MOVE, vec![Operand::reg(R0, 64), Operand::imm(7, 64)]),
            &mut program,
        )
        .unwrap();
    assert!(!report.is_degraded());
    assert_eq!(
        only_statement(&program, report.block),
        &Statement::assign(
            Term::access(CATALOG.lookup(R0).unwrap()),
            Term::constant(7, 64)
        )
    );
}

#[test]
fn test_consecutive_instructions_share_block() {
    let mut program = Program::new();
    let l = lifter();
    let ops = vec![Operand::reg(R0, 64), Operand::reg(R1, 64)];
    let a = l.lift(&instr(0x100, OP_MOVE, ops.clone()), &mut program).unwrap();
    let b = l.lift(&instr(0x104, OP_MOVE, ops), &mut program).unwrap();
    assert_eq!(a.block, b.block);
    assert_eq!(program.len(), 1);
    assert_eq!(program.statement_count(), 2);
}

#[test]
fn test_unregistered_opcode_is_one_opaque_effect() {
    let mut program = Program::new();
    let report = lifter()
        .lift(&instr(0x200, OP_UNKNOWN, vec![]), &mut program)
        .unwrap();
    assert!(matches!(
        report.degraded,
        Some(LiftError::UnrecognizedOpcode {
            address: 0x200,
            word: 9
        })
    ));
    assert_eq!(program.statement_count(), 1);
    assert_eq!(only_statement(&program, report.block), &Statement::OpaqueEffect);
}

#[test]
fn test_unregistered_opcode_word_follows_code_order() {
    let mut program = Program::new();
    let mut little = instr(0x200, OP_UNKNOWN, vec![]);
    little.bytes = vec![9, 0, 0, 0];
    let report = lifter()
        .with_code_order(ByteOrder::Little)
        .lift(&little, &mut program)
        .unwrap();
    assert_eq!(
        report.degraded,
        Some(LiftError::UnrecognizedOpcode {
            address: 0x200,
            word: 9
        })
    );
}

#[test]
fn test_instruction_past_address_space_is_truncated() {
    let mut program = Program::new();
    let err = lifter()
        .lift(&instr(u64::MAX - 1, OP_NOP, vec![]), &mut program)
        .unwrap_err();
    assert!(err.needs_resync());
    assert!(matches!(err, LiftError::Truncated { needed: 4, .. }));
    assert!(program.is_empty());
}

#[test]
fn test_failed_rule_commits_nothing_but_opaque() {
    let mut program = Program::new();
    let report = lifter()
        .lift(&instr(0x300, OP_BROKEN, vec![]), &mut program)
        .unwrap();
    assert_eq!(report.degraded, Some(LiftError::MissingOperand(5)));
    // The aux block the rule asked for was never created.
    assert_eq!(program.len(), 1);
    assert_eq!(only_statement(&program, report.block), &Statement::OpaqueEffect);
}

#[test]
fn test_statement_after_terminal_degrades() {
    let mut program = Program::new();
    let report = lifter()
        .lift(&instr(0x300, OP_DOUBLE, vec![]), &mut program)
        .unwrap();
    assert!(matches!(
        report.degraded,
        Some(LiftError::Ir(IrError::BlockSealed { .. }))
    ));
    assert_eq!(program.statement_count(), 1);
}

#[test]
fn test_nop_and_opaque_rules() {
    let mut program = Program::new();
    let l = lifter();
    let nop = l.lift(&instr(0x100, OP_NOP, vec![]), &mut program).unwrap();
    assert_eq!(nop.statements, 0);
    let sync = l.lift(&instr(0x104, OP_SYNC, vec![]), &mut program).unwrap();
    assert!(!sync.is_degraded());
    assert_eq!(only_statement(&program, sync.block), &Statement::OpaqueEffect);
}

#[test]
fn test_single_flag_branch() {
    let mut program = Program::new();
    let report = lifter()
        .lift(
            &instr(0x100, OP_BEQ, vec![Operand::imm(0x180, 64)]),
            &mut program,
        )
        .unwrap();
    let next = program.block_at(0x104).unwrap();
    let eq = CATALOG.location_by_name("eq").unwrap();
    assert_eq!(
        only_statement(&program, report.block),
        &Statement::jump(Jump::conditional(
            Term::access(eq),
            Term::constant(0x180, 64),
            next
        ))
    );
    assert_eq!(program.len(), 2);
}

#[test]
fn test_two_step_branch_uses_one_aux_block() {
    let mut program = Program::new();
    let report = lifter()
        .lift(
            &instr(0x100, OP_BLE, vec![Operand::imm(0x180, 64)]),
            &mut program,
        )
        .unwrap();
    assert_eq!(program.len(), 3);
    let next = program.block_at(0x104).unwrap();
    let aux = program
        .blocks()
        .iter()
        .find(|b| b.address().is_none())
        .unwrap();
    assert_eq!(
        aux.statements(),
        &[Statement::jump(Jump::to(Term::constant(0x180, 64)))]
    );
    let gt = CATALOG.location_by_name("gt").unwrap();
    assert_eq!(
        only_statement(&program, report.block),
        &Statement::jump(Jump::conditional(
            Term::access(gt),
            next,
            JumpTarget::Block(aux.id())
        ))
    );
}

#[test]
fn test_direct_successor_reuses_existing_block() {
    let mut program = Program::new();
    let existing = program.create_basic_block(Some(0x104));
    let l = lifter();
    l.lift(
        &instr(0x100, OP_BEQ, vec![Operand::imm(0x180, 64)]),
        &mut program,
    )
    .unwrap();
    assert_eq!(program.len(), 2);
    let branch = program.block_at(0x100).unwrap();
    let jump = program.block(branch).unwrap().terminator().unwrap().as_jump().unwrap();
    assert_eq!(jump.else_target, Some(JumpTarget::Block(existing)));
}

#[test]
fn test_lifting_into_sealed_block_fails() {
    let mut program = Program::new();
    let l = lifter();
    let beq = instr(0x100, OP_BEQ, vec![Operand::imm(0x180, 64)]);
    l.lift(&beq, &mut program).unwrap();
    let before = program.statement_count();
    assert!(matches!(
        l.lift(&beq, &mut program),
        Err(LiftError::Ir(IrError::BlockSealed { .. }))
    ));
    assert_eq!(program.statement_count(), before);
}

#[test]
fn test_undecoded_instruction() {
    let mut program = Program::new();
    let error = LiftError::UnknownRegister(99);
    let report = lift_undecoded(0x40, 4, error.clone(), &mut program).unwrap();
    assert_eq!(report.degraded, Some(error));
    assert_eq!(only_statement(&program, report.block), &Statement::OpaqueEffect);
}
