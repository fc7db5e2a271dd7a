use declift_ir::{ByteOrder, Domain, Jump, JumpTarget, Program, Statement, Term};

use super::registers::{CATALOG, CTR, LR, cr_flag, gpr};
use super::*;
use crate::arch::LiftedInstruction;
use crate::error::LiftError;
use crate::types::{FlagKind, RegisterId};

fn reg(id: RegisterId) -> Term {
    Term::access(CATALOG.lookup(id).unwrap())
}

fn flag(field: u8, kind: FlagKind) -> Term {
    reg(cr_flag(field, kind).unwrap())
}

fn word(value: u64) -> Term {
    Term::constant(u128::from(value), 64)
}

fn lift_one(w: u32, address: u64, program: &mut Program) -> LiftedInstruction {
    architecture(ByteOrder::Big, ByteOrder::Big)
        .lift_instruction(&w.to_be_bytes(), address, program)
        .unwrap()
}

fn statements(program: &Program, lifted: &LiftedInstruction) -> Vec<Statement> {
    program.block(lifted.report.block).unwrap().statements().to_vec()
}

#[test]
fn test_store_with_update_writes_memory_then_base() {
    let mut program = Program::new();
    // stwu r1, -112(r1)
    let lifted = lift_one(0x9421_ff90, 0x1000, &mut program);
    let address = Term::add(reg(gpr(1)), Term::signed_constant(-112, 64));
    assert_eq!(
        statements(&program, &lifted),
        vec![
            Statement::assign(
                Term::dereference(address.clone(), Domain::Memory, 32),
                Term::truncate(reg(gpr(1)), 32),
            ),
            Statement::assign(reg(gpr(1)), address),
        ]
    );
}

#[test]
fn test_branch_on_equal_in_cr7() {
    let mut program = Program::new();
    // beq cr7, 0x1010
    let lifted = lift_one(0x419e_0010, 0x1000, &mut program);
    let next = program.block_at(0x1004).unwrap();
    assert_eq!(
        statements(&program, &lifted),
        vec![Statement::jump(Jump::conditional(
            flag(7, FlagKind::Equal),
            word(0x1010),
            next
        ))]
    );
}

#[test]
fn test_branch_on_less_or_equal_goes_through_aux_block() {
    let mut program = Program::new();
    // ble 0x1010
    let lifted = lift_one(0x4081_0010, 0x1000, &mut program);
    assert_eq!(program.len(), 3);
    let next = program.block_at(0x1004).unwrap();
    let aux = program
        .blocks()
        .iter()
        .find(|b| b.address().is_none())
        .unwrap();
    assert_eq!(
        aux.statements(),
        &[Statement::jump(Jump::to(word(0x1010)))]
    );
    assert_eq!(
        statements(&program, &lifted),
        vec![Statement::jump(Jump::conditional(
            flag(0, FlagKind::Greater),
            next,
            JumpTarget::Block(aux.id())
        ))]
    );
}

#[test]
fn test_bdnz_decrements_then_tests_ctr() {
    let mut program = Program::new();
    // bdnz 0xff0
    let lifted = lift_one(0x4200_fff0, 0x1000, &mut program);
    let next = program.block_at(0x1004).unwrap();
    assert_eq!(
        statements(&program, &lifted),
        vec![
            Statement::assign(reg(CTR), Term::sub(reg(CTR), word(1))),
            Statement::jump(Jump::conditional(
                Term::not(Term::equal(reg(CTR), word(0))),
                word(0xff0),
                next
            )),
        ]
    );
}

#[test]
fn test_conditional_return_tests_less_than() {
    let mut program = Program::new();
    // bltlr
    let lifted = lift_one(0x4d80_0020, 0x2000, &mut program);
    let next = program.block_at(0x2004).unwrap();
    assert_eq!(
        statements(&program, &lifted),
        vec![Statement::jump(Jump::conditional(
            flag(0, FlagKind::Less),
            reg(LR),
            next
        ))]
    );
}

#[test]
fn test_indirect_transfers() {
    let mut program = Program::new();
    let blr = lift_one(0x4e80_0020, 0x100, &mut program);
    assert_eq!(
        statements(&program, &blr),
        vec![Statement::jump(Jump::to(reg(LR)))]
    );
    let mut program = Program::new();
    let bctrl = lift_one(0x4e80_0421, 0x100, &mut program);
    assert_eq!(statements(&program, &bctrl), vec![Statement::call(reg(CTR))]);
}

#[test]
fn test_carrying_add_keeps_unmodelled_carry_opaque() {
    let mut program = Program::new();
    // addc r3, r4, r5
    let lifted = lift_one(0x7c64_2814, 0x100, &mut program);
    assert!(!lifted.report.is_degraded());
    assert_eq!(
        statements(&program, &lifted),
        vec![
            Statement::assign(reg(gpr(3)), Term::add(reg(gpr(4)), reg(gpr(5)))),
            Statement::OpaqueEffect,
        ]
    );
}

#[test]
fn test_rlwinm_rotates_and_masks_low_word() {
    let mut program = Program::new();
    // rlwinm r3, r4, 2, 0, 29
    let lifted = lift_one(0x5483_103a, 0x100, &mut program);
    let low = Term::truncate(reg(gpr(4)), 32);
    let rotated = Term::or(
        Term::shl(low.clone(), Term::constant(2, 32)),
        Term::shr(low, Term::constant(30, 32)),
    );
    let expected = Term::zero_extend(
        Term::and(rotated, Term::constant(0xffff_fffc, 32)),
        64,
    );
    assert_eq!(
        statements(&program, &lifted),
        vec![Statement::assign(reg(gpr(3)), expected)]
    );
}

#[test]
fn test_record_form_updates_cr0() {
    let mut program = Program::new();
    // add. r3, r4, r5
    let lifted = lift_one(0x7c64_2a15, 0x100, &mut program);
    let r3 = reg(gpr(3));
    let zero = word(0);
    assert_eq!(
        statements(&program, &lifted),
        vec![
            Statement::assign(r3.clone(), Term::add(reg(gpr(4)), reg(gpr(5)))),
            Statement::assign(
                flag(0, FlagKind::Less),
                Term::signed_less(r3.clone(), zero.clone())
            ),
            Statement::assign(
                flag(0, FlagKind::Greater),
                Term::signed_greater(r3.clone(), zero.clone())
            ),
            Statement::assign(flag(0, FlagKind::Equal), Term::equal(r3, zero)),
        ]
    );
}

#[test]
fn test_logical_compare_is_unsigned() {
    let mut program = Program::new();
    // cmplwi cr1, r3, 5
    let lifted = lift_one(0x2883_0005, 0x100, &mut program);
    let left = Term::truncate(reg(gpr(3)), 32);
    let right = Term::truncate(word(5), 32);
    let stmts = statements(&program, &lifted);
    assert_eq!(stmts.len(), 3);
    assert_eq!(
        stmts[0],
        Statement::assign(flag(1, FlagKind::Less), Term::unsigned_less(left, right))
    );
}

#[test]
fn test_indexed_load_with_zero_base() {
    let mut program = Program::new();
    // lwzx r3, 0, r4
    let lifted = lift_one(0x7c60_202e, 0x100, &mut program);
    assert_eq!(
        statements(&program, &lifted),
        vec![Statement::assign(
            reg(gpr(3)),
            Term::zero_extend(Term::dereference(reg(gpr(4)), Domain::Memory, 32), 64),
        )]
    );
}

#[test]
fn test_nop_emits_nothing() {
    let mut program = Program::new();
    let lifted = lift_one(0x6000_0000, 0x100, &mut program);
    assert_eq!(lifted.report.statements, 0);
    assert_eq!(program.statement_count(), 0);
}

#[test]
fn test_unknown_word_degrades_to_opaque_effect() {
    let mut program = Program::new();
    let lifted = lift_one(0, 0x100, &mut program);
    assert!(lifted.instruction.is_none());
    assert_eq!(lifted.size, 4);
    assert_eq!(
        lifted.report.degraded,
        Some(LiftError::UnrecognizedOpcode {
            address: 0x100,
            word: 0
        })
    );
    assert_eq!(statements(&program, &lifted), vec![Statement::OpaqueEffect]);
}

#[test]
fn test_misaligned_address_is_returned() {
    let mut program = Program::new();
    let result = architecture(ByteOrder::Big, ByteOrder::Big).lift_instruction(
        &0x6000_0000u32.to_be_bytes(),
        0x102,
        &mut program,
    );
    assert!(matches!(
        result,
        Err(LiftError::MisalignedInstruction { address: 0x102, .. })
    ));
    assert!(program.is_empty());
}

#[test]
fn test_little_endian_code() {
    let arch = architecture(ByteOrder::Little, ByteOrder::Little);
    assert_eq!(arch.name(), NAME_LE);
    assert_eq!(arch.byte_order(Domain::Memory), ByteOrder::Little);
    let mut program = Program::new();
    let lifted = arch
        .lift_instruction(&0x4e80_0020u32.to_le_bytes(), 0x100, &mut program)
        .unwrap();
    assert_eq!(
        statements(&program, &lifted),
        vec![Statement::jump(Jump::to(reg(LR)))]
    );
}

#[test]
fn test_default_convention() {
    let arch = architecture(ByteOrder::Big, ByteOrder::Big);
    let convention = arch.convention("default").unwrap();
    assert_eq!(convention.stack_pointer(), CATALOG.lookup(gpr(1)).unwrap());
    assert_eq!(convention.argument_locations().count(), 8 + 13);
    assert_eq!(
        convention.return_values()[0],
        CATALOG.lookup(gpr(3)).unwrap()
    );
    let mut args = convention.allocator();
    assert_eq!(args.next_argument("int"), CATALOG.location_by_name("r3"));
    assert_eq!(args.next_argument("float"), CATALOG.location_by_name("f1"));
    assert_eq!(convention.entry_statements().len(), 1);
}
