use declift_ir::{ByteOrder, Domain, Jump, Program, Statement, Term};

use super::registers::{CATALOG, gpr_location};
use super::*;
use crate::arch::LiftedInstruction;
use crate::error::LiftError;

fn r(n: u32) -> Term {
    Term::access(gpr_location(n))
}

fn imm(value: i64) -> Term {
    Term::signed_constant(value, 128)
}

fn rr(opcode: u32, rt: u32, ra: u32, rb: u32) -> u32 {
    (opcode << 21) | (rb << 14) | (ra << 7) | rt
}

fn ri10(opcode: u32, rt: u32, ra: u32, value: i32) -> u32 {
    (opcode << 21) | (((value as u32) & 0x3ff) << 14) | (ra << 7) | rt
}

fn ri16(opcode: u32, rt: u32, value: i32) -> u32 {
    (opcode << 21) | (((value as u32) & 0xffff) << 7) | rt
}

fn lift_one(word: u32, address: u64, program: &mut Program) -> LiftedInstruction {
    architecture()
        .lift_instruction(&word.to_be_bytes(), address, program)
        .unwrap()
}

fn statements(program: &Program, lifted: &LiftedInstruction) -> Vec<Statement> {
    program.block(lifted.report.block).unwrap().statements().to_vec()
}

fn lift_statements(word: u32, address: u64) -> Vec<Statement> {
    let mut program = Program::new();
    let lifted = lift_one(word, address, &mut program);
    assert!(!lifted.report.is_degraded(), "{:?}", lifted.report.degraded);
    statements(&program, &lifted)
}

#[test]
fn test_add_registers() {
    assert_eq!(lift_statements(rr(0x0c0, 3, 4, 5), 0), vec![Statement::assign(
        r(3),
        Term::add(r(4), r(5))
    )]);
}

#[test]
fn test_add_immediate() {
    assert_eq!(lift_statements(ri10(0x0e0, 3, 4, -1), 0), vec![
        Statement::assign(r(3), Term::add(r(4), imm(-1)))
    ]);
}

#[test]
fn test_subtract_from_reverses_operands() {
    assert_eq!(lift_statements(rr(0x040, 3, 4, 5), 0), vec![
        Statement::assign(r(3), Term::sub(r(5), r(4)))
    ]);
}

#[test]
fn test_immediate_loads() {
    // ila $3, 0x12345
    let ila = (0x210 << 21) | (0x12345 << 7) | 3;
    assert_eq!(lift_statements(ila, 0), vec![Statement::assign(
        r(3),
        imm(0x12345)
    )]);
    // ilhu $3, 0x1234 then iohl $3, 0x5678
    assert_eq!(lift_statements(ri16(0x208, 3, 0x1234), 0), vec![
        Statement::assign(r(3), Term::constant(0x1234_0000, 128))
    ]);
    assert_eq!(lift_statements(ri16(0x304, 3, 0x5678), 0), vec![
        Statement::assign(r(3), Term::or(r(3), Term::constant(0x5678, 128)))
    ]);
}

#[test]
fn test_quadword_load_and_store() {
    // lqd $5, 32($1)
    assert_eq!(lift_statements(0x3400_8085, 0), vec![Statement::assign(
        r(5),
        Term::dereference(Term::add(r(1), imm(32)), Domain::Memory, 128)
    )]);
    // lqd $5, 0($1) addresses through the base alone
    assert_eq!(lift_statements(ri10(0x1a0, 5, 1, 0), 0), vec![
        Statement::assign(r(5), Term::dereference(r(1), Domain::Memory, 128))
    ]);
    // stqd $5, -16($1)
    assert_eq!(lift_statements(ri10(0x120, 5, 1, -1), 0), vec![
        Statement::assign(
            Term::dereference(Term::add(r(1), imm(-16)), Domain::Memory, 128),
            r(5)
        )
    ]);
}

#[test]
fn test_branch_if_zero() {
    let mut program = Program::new();
    // brz $3, 0x208
    let lifted = lift_one(0x2000_0103, 0x200, &mut program);
    let next = program.block_at(0x204).unwrap();
    assert_eq!(statements(&program, &lifted), vec![Statement::jump(
        Jump::conditional(
            Term::equal(r(3), Term::constant(0, 128)),
            imm(0x208),
            next
        )
    )]);
}

#[test]
fn test_branch_if_not_zero_on_register() {
    let mut program = Program::new();
    // binz $3, $4
    let lifted = lift_one(rr(0x129, 3, 4, 0), 0x200, &mut program);
    let next = program.block_at(0x204).unwrap();
    assert_eq!(statements(&program, &lifted), vec![Statement::jump(
        Jump::conditional(
            Term::not(Term::equal(r(3), Term::constant(0, 128))),
            r(4),
            next
        )
    )]);
}

#[test]
fn test_branch_and_link_through_lr_is_a_call() {
    // brsl $lr, 0x110
    assert_eq!(lift_statements(ri16(0x198, 0, 4), 0x100), vec![
        Statement::call(imm(0x110))
    ]);
    // bisl $lr, $4
    assert_eq!(lift_statements(rr(0x1a9, 0, 4, 0), 0x100), vec![
        Statement::call(r(4))
    ]);
}

#[test]
fn test_branch_and_link_through_other_register_is_a_jump() {
    // brsl $5, 0x110
    assert_eq!(lift_statements(ri16(0x198, 5, 4), 0x100), vec![
        Statement::assign(r(5), imm(0x104)),
        Statement::jump(Jump::to(imm(0x110))),
    ]);
}

#[test]
fn test_indirect_branch_and_interrupt_return() {
    // bi $lr
    assert_eq!(lift_statements(rr(0x1a8, 0, 0, 0), 0), vec![Statement::jump(
        Jump::to(r(0))
    )]);
    // iret
    assert_eq!(lift_statements(rr(0x1aa, 0, 0, 0), 0), vec![Statement::Return]);
}

#[test]
fn test_logical_forms() {
    // orc $3, $4, $5
    assert_eq!(lift_statements(rr(0x2c9, 3, 4, 5), 0), vec![
        Statement::assign(r(3), Term::or(r(4), Term::not(r(5))))
    ]);
    // ori $3, $4, 0 is a move
    assert_eq!(lift_statements(ri10(0x020, 3, 4, 0), 0), vec![
        Statement::assign(r(3), r(4))
    ]);
}

#[test]
fn test_compare_produces_lane_mask() {
    // ceq $3, $4, $5
    assert_eq!(lift_statements(rr(0x3c0, 3, 4, 5), 0), vec![
        Statement::assign(r(3), Term::sign_extend(Term::equal(r(4), r(5)), 128))
    ]);
}

#[test]
fn test_quadword_byte_shifts() {
    // shlqbyi $3, $4, 2
    assert_eq!(lift_statements(rr(0x1ff, 3, 4, 2), 0), vec![
        Statement::assign(r(3), Term::shl(r(4), imm(16)))
    ]);
    // shlqbyi $3, $4, 16 clears the register
    assert_eq!(lift_statements(rr(0x1ff, 3, 4, 16), 0), vec![
        Statement::assign(r(3), Term::constant(0, 128))
    ]);
    // rotqbyi $3, $4, 16 is a full turn
    assert_eq!(lift_statements(rr(0x1fc, 3, 4, 16), 0), vec![
        Statement::assign(r(3), r(4))
    ]);
}

#[test]
fn test_hints_emit_nothing() {
    // hbrr 0x1008, 0x1010
    let word = (0x090 << 21) | (4 << 7) | 2;
    assert!(lift_statements(word, 0x1000).is_empty());
}

#[test]
fn test_float_ops_are_opaque() {
    // fa $3, $4, $5
    assert_eq!(lift_statements(rr(0x2c4, 3, 4, 5), 0), vec![
        Statement::OpaqueEffect
    ]);
}

#[test]
fn test_unassigned_opcode_becomes_one_opaque_effect() {
    let mut program = Program::new();
    let lifted = lift_one(0x0080_0000, 0x40, &mut program);
    assert!(lifted.instruction.is_none());
    assert_eq!(lifted.size, 4);
    assert_eq!(
        lifted.report.degraded,
        Some(LiftError::UnrecognizedOpcode {
            address: 0x40,
            word: 0x0080_0000
        })
    );
    assert_eq!(statements(&program, &lifted), vec![Statement::OpaqueEffect]);
    assert_eq!(program.statement_count(), 1);
}

#[test]
fn test_registers_are_big_endian() {
    let arch = architecture();
    assert_eq!(arch.byte_order(Domain::Register), ByteOrder::Big);
    assert_eq!(arch.byte_order(Domain::Memory), ByteOrder::Big);
    assert_eq!(arch.name(), NAME);
    assert_eq!(arch.catalog().len(), CATALOG.len());
}

#[test]
fn test_default_convention() {
    let arch = architecture();
    let convention = arch.convention("default").unwrap();
    assert_eq!(convention.stack_pointer(), gpr_location(1));
    assert_eq!(convention.argument_alignment(), 128);
    assert_eq!(convention.argument_locations().count(), 13);
    assert_eq!(convention.return_values(), &[gpr_location(3)]);
    let mut allocator = convention.allocator();
    assert_eq!(allocator.next_argument("int"), Some(gpr_location(3)));
    assert_eq!(allocator.next_argument("int"), Some(gpr_location(4)));
}
