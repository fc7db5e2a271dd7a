use super::*;

fn reg(addr: i64) -> Term {
    Term::access(MemoryLocation::register(addr, 64))
}

#[test]
fn test_constant_is_masked_to_size() {
    let term = Term::constant(0x1_ffff, 16);
    assert_eq!(term.as_constant(), Some(0xffff));
    assert_eq!(term.size(), 16);
}

#[test]
fn test_signed_constant_twos_complement() {
    assert_eq!(Term::signed_constant(-1, 8).as_constant(), Some(0xff));
    assert_eq!(
        Term::signed_constant(-16, 64).as_constant(),
        Some(0xffff_ffff_ffff_fff0)
    );
    assert_eq!(Term::signed_constant(-1, 128).as_constant(), Some(u128::MAX));
}

#[test]
fn test_bit_mask() {
    assert_eq!(bit_mask(1), 1);
    assert_eq!(bit_mask(64), u128::from(u64::MAX));
    assert_eq!(bit_mask(128), u128::MAX);
}

#[test]
fn test_binary_takes_left_size() {
    let term = Term::add(reg(0), Term::constant(4, 64));
    assert_eq!(term.size(), 64);
    assert!(matches!(
        term,
        Term::Binary {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn test_comparisons_are_one_bit() {
    assert_eq!(Term::equal(reg(0), reg(64)).size(), 1);
    assert_eq!(Term::signed_less(reg(0), reg(64)).size(), 1);
    assert_eq!(Term::unsigned_less_or_equal(reg(0), reg(64)).size(), 1);
}

#[test]
fn test_greater_swaps_operands() {
    let term = Term::signed_greater(reg(0), reg(64));
    let Term::Binary {
        op, left, right, ..
    } = term
    else {
        panic!("expected binary term");
    };
    assert_eq!(op, BinaryOp::SignedLess);
    assert_eq!(*left, reg(64));
    assert_eq!(*right, reg(0));
}

#[test]
fn test_not_equal_is_negated_equal() {
    let term = Term::not_equal(reg(0), Term::constant(0, 64));
    let Term::Unary { op, operand, size } = term else {
        panic!("expected unary term");
    };
    assert_eq!(op, UnaryOp::Not);
    assert_eq!(size, 1);
    assert!(matches!(
        *operand,
        Term::Binary {
            op: BinaryOp::Equal,
            ..
        }
    ));
}

#[test]
fn test_width_changes() {
    assert_eq!(Term::sign_extend(reg(0), 128).size(), 128);
    assert_eq!(Term::truncate(reg(0), 8).size(), 8);
    assert_eq!(Term::resize_unsigned(reg(0), 64), reg(0));
    assert!(matches!(
        Term::resize_unsigned(reg(0), 32),
        Term::Unary {
            op: UnaryOp::Truncate,
            size: 32,
            ..
        }
    ));
    assert!(matches!(
        Term::resize_signed(reg(0), 128),
        Term::Unary {
            op: UnaryOp::SignExtend,
            size: 128,
            ..
        }
    ));
}

#[test]
fn test_dereference_keeps_address_term() {
    let term = Term::dereference(reg(64), Domain::Memory, 32);
    let Term::Dereference {
        address,
        domain,
        size,
    } = term
    else {
        panic!("expected dereference");
    };
    assert_eq!(*address, reg(64));
    assert_eq!(domain, Domain::Memory);
    assert_eq!(size, 32);
}
