use declift::{ArchKind, FunctionInput, LiftConfig, LiftError, Lifter, Statement, split_functions};

fn be_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn le_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

// stdu r1,-112(r1); mflr r0; addi r3,r3,1; blr
const PPC_FUNCTION: [u32; 4] = [0xf821_ff91, 0x7c08_02a6, 0x3863_0001, 0x4e80_0020];

#[test]
fn batch_results_follow_input_order() {
    let image = be_words(&[PPC_FUNCTION, PPC_FUNCTION, PPC_FUNCTION].concat());
    let inputs = split_functions(0x1000, &image, &[0x1020, 0x1000, 0x1010]).unwrap();
    let lifter = Lifter::new(LiftConfig::new(ArchKind::PpcBe).with_jobs(2)).unwrap();
    let functions = lifter.lift_functions(&inputs).unwrap();
    let entries: Vec<u64> = functions.iter().map(|f| f.entry).collect();
    assert_eq!(entries, vec![0x1000, 0x1010, 0x1020]);
    assert!(functions.iter().all(|f| f.instructions == 4));
}

#[test]
fn parallel_and_serial_lifting_agree() {
    let image = be_words(&[PPC_FUNCTION, PPC_FUNCTION].concat());
    let inputs = split_functions(0x1000, &image, &[0x1000, 0x1010]).unwrap();
    let render = |parallel: bool| {
        let lifter =
            Lifter::new(LiftConfig::new(ArchKind::PpcBe).with_parallel(parallel)).unwrap();
        lifter
            .lift_functions(&inputs)
            .unwrap()
            .iter()
            .map(|f| f.render(lifter.arch()))
            .collect::<Vec<_>>()
    };
    assert_eq!(render(true), render(false));
}

#[test]
fn little_endian_code_lifts_like_big_endian() {
    let be = Lifter::new(LiftConfig::new(ArchKind::PpcBe).with_parallel(false)).unwrap();
    let le = Lifter::new(LiftConfig::new(ArchKind::PpcLe).with_parallel(false)).unwrap();
    let be_ir = be
        .lift_function(&FunctionInput::new(0x1000, &be_words(&PPC_FUNCTION)))
        .unwrap();
    let le_ir = le
        .lift_function(&FunctionInput::new(0x1000, &le_words(&PPC_FUNCTION)))
        .unwrap();
    assert_eq!(be_ir.program.to_string(), le_ir.program.to_string());
    assert!(le_ir.degraded.is_empty());
}

#[test]
fn spu_function_gets_link_register_entry_statement() {
    let lifter = Lifter::new(LiftConfig::new(ArchKind::Spu).with_parallel(false)).unwrap();
    // a $3,$4,$5; bi $lr
    let bytes = be_words(&[0x1800_0000 | (5 << 14) | (4 << 7) | 3, 0x3500_0000]);
    let function = lifter
        .lift_function(&FunctionInput::new(0x200, &bytes))
        .unwrap();
    let entry = function
        .program
        .block(function.entry_block().unwrap())
        .unwrap();
    assert!(matches!(entry.statements().first(), Some(Statement::Assignment { .. })));
    assert!(entry.is_sealed());
    let rendered = function.render(lifter.arch());
    assert!(rendered.contains("r3"), "{rendered}");
}

#[test]
fn undecodable_words_are_reported_and_sweep_continues() {
    let lifter = Lifter::new(LiftConfig::new(ArchKind::Spu).with_parallel(false)).unwrap();
    let bytes = be_words(&[0x0080_0000, 0x4020_0000]);
    let function = lifter
        .lift_function(&FunctionInput::new(0, &bytes))
        .unwrap();
    assert_eq!(function.instructions, 2);
    assert_eq!(function.degraded.len(), 1);
    assert!(matches!(
        function.degraded[0].error,
        LiftError::UnrecognizedOpcode { address: 0, .. }
    ));
    assert_eq!(
        function.program.blocks()[0].statements().last(),
        Some(&Statement::OpaqueEffect)
    );
}
