use declift_ir::{ByteOrder, Domain, Jump, MemoryLocation, Program, Statement, Term};
use declift_isa::targets::{ppc, spu};
use declift_isa::{Architecture, FlagKind, LiftError, LiftedInstruction};

fn ppc_be() -> Architecture {
    ppc::architecture(ByteOrder::Big, ByteOrder::Big)
}

fn lift(arch: &Architecture, word: u32, address: u64, program: &mut Program) -> LiftedInstruction {
    arch.lift_instruction(&word.to_be_bytes(), address, program)
        .unwrap()
}

fn block_statements(program: &Program, lifted: &LiftedInstruction) -> Vec<Statement> {
    program.block(lifted.report.block).unwrap().statements().to_vec()
}

fn ppc_flag(field: u8, kind: FlagKind) -> Term {
    let id = ppc::registers::cr_flag(field, kind).unwrap();
    Term::access(ppc::registers::CATALOG.lookup(id).unwrap())
}

#[test]
fn unconditional_absolute_branch_is_one_jump() {
    let arch = ppc_be();
    let mut program = Program::new();
    // ba 0x2000
    let lifted = lift(&arch, 0x4800_2002, 0x1000, &mut program);
    assert_eq!(block_statements(&program, &lifted), vec![Statement::jump(
        Jump::to(Term::constant(0x2000, 64))
    )]);
    assert_eq!(program.len(), 1);
}

#[test]
fn single_flag_branch_uses_default_field() {
    let arch = ppc_be();
    let mut program = Program::new();
    // blt 0x1010
    let lifted = lift(&arch, 0x4180_0010, 0x1000, &mut program);
    let next = program.block_at(0x1004).unwrap();
    assert_eq!(block_statements(&program, &lifted), vec![Statement::jump(
        Jump::conditional(
            ppc_flag(0, FlagKind::Less),
            Term::constant(0x1010, 64),
            next
        )
    )]);
}

#[test]
fn less_or_equal_branch_routes_through_aux_block() {
    let arch = ppc_be();
    let mut program = Program::new();
    // ble 0x1010
    let lifted = lift(&arch, 0x4081_0010, 0x1000, &mut program);
    let next = program.block_at(0x1004).unwrap();
    let aux = program
        .blocks()
        .iter()
        .find(|b| b.address().is_none())
        .unwrap();
    assert_eq!(aux.statements(), &[Statement::jump(Jump::to(Term::constant(
        0x1010, 64
    )))]);
    assert_eq!(block_statements(&program, &lifted), vec![Statement::jump(
        Jump::conditional(ppc_flag(0, FlagKind::Greater), next, aux.id())
    )]);
}

#[test]
fn zero_displacement_load_addresses_through_base() {
    let arch = ppc_be();
    let mut program = Program::new();
    // lwz r3, 0(r4)
    let lifted = lift(&arch, 0x8064_0000, 0, &mut program);
    let r4 = Term::access(ppc::registers::gpr_location(4));
    assert_eq!(block_statements(&program, &lifted), vec![Statement::assign(
        Term::access(ppc::registers::gpr_location(3)),
        Term::zero_extend(Term::dereference(r4, Domain::Memory, 32), 64)
    )]);
}

#[test]
fn integer_arguments_spill_to_the_stack() {
    let arch = ppc_be();
    let convention = arch.convention("default").unwrap();
    let mut allocator = convention.allocator();
    for n in 3..=10 {
        assert_eq!(
            allocator.next_argument("int"),
            Some(ppc::registers::gpr_location(n))
        );
    }
    assert_eq!(
        allocator.next_argument("int"),
        Some(MemoryLocation::stack(0, 64))
    );
    assert_eq!(allocator.stack_slots(), 1);
}

#[test]
fn unassigned_table_opcode_is_one_opaque_effect() {
    let arch = spu::architecture();
    let mut program = Program::new();
    let lifted = lift(&arch, 0x0080_0000, 0x100, &mut program);
    assert!(matches!(
        lifted.report.degraded,
        Some(LiftError::UnrecognizedOpcode { .. })
    ));
    assert_eq!(block_statements(&program, &lifted), vec![
        Statement::OpaqueEffect
    ]);
    assert_eq!(program.statement_count(), 1);
}

#[test]
fn lifting_is_deterministic() {
    let words = [0x9421_ff90, 0x7c08_02a6, 0x4081_0010, 0x4e80_0020];
    let run = || {
        let arch = ppc_be();
        let mut program = Program::new();
        for (i, word) in words.iter().enumerate() {
            lift(&arch, *word, 0x1000 + 4 * i as u64, &mut program);
        }
        program.to_string()
    };
    assert_eq!(run(), run());
}

#[test]
fn branches_share_one_direct_successor() {
    let arch = ppc_be();
    let mut program = Program::new();
    // bdnz 0x0ff0 leaves a block at 0x1004; a later branch to 0x1004 reuses it
    lift(&arch, 0x4200_fff0, 0x1000, &mut program);
    let successor = program.block_at(0x1004).unwrap();
    let before = program.len();
    let lifted = lift(&arch, 0x4e80_0020, 0x1004, &mut program);
    assert_eq!(lifted.report.block, successor);
    assert_eq!(program.len(), before);
}

#[test]
fn misaligned_addresses_are_rejected_without_side_effects() {
    for arch in [ppc_be(), spu::architecture()] {
        let mut program = Program::new();
        let err = arch
            .lift_instruction(&[0x60, 0, 0, 0], 0x1002, &mut program)
            .unwrap_err();
        assert!(err.needs_resync());
        assert!(program.is_empty());
    }
}

#[test]
fn architectures_are_shared_across_threads() {
    let arch = spu::architecture();
    let words: Vec<u32> = (0..8u32).map(|n| (0x0c0 << 21) | (n << 14) | (n << 7) | n).collect();
    std::thread::scope(|scope| {
        let handles: Vec<_> = words
            .iter()
            .map(|&word| {
                let arch = &arch;
                scope.spawn(move || {
                    let mut program = Program::new();
                    lift(arch, word, 0, &mut program);
                    program.statement_count()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    });
}

#[test]
fn stack_argument_covering_is_idempotent() {
    for (arch, align) in [(ppc_be(), 64), (spu::architecture(), 128)] {
        let convention = arch.convention("default").unwrap();
        assert_eq!(convention.argument_alignment(), align);
        let cover = |location: &MemoryLocation| convention.get_argument_location_covering(location);

        let aligned = MemoryLocation::stack(align, 64);
        let expected = MemoryLocation::stack(align, u32::try_from(align).unwrap());
        assert_eq!(cover(&expected), Some(expected));
        assert_eq!(cover(&aligned).and_then(|c| cover(&c)), cover(&aligned));

        let straddling = MemoryLocation::stack(align - 8, 16);
        let once = cover(&straddling).unwrap();
        assert_eq!(
            once,
            MemoryLocation::stack(0, u32::try_from(2 * align).unwrap())
        );
        assert_eq!(cover(&once), Some(once));
    }
}
