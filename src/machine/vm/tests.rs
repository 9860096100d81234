use super::*;
use crate::network::channel::Channel;

fn run_vm(image: &[i64], inputs: &[i64]) -> (Vm, Arc<Channel>) {
    let program = Program::new(image.to_vec());
    let input = Channel::scripted(inputs.iter().copied());
    let output = Channel::new();
    let mut vm = Vm::new(&program, input, output.clone());
    vm.run().expect("vm run failed");
    (vm, output)
}

fn run_to_memory(image: &[i64]) -> Vec<i64> {
    let (vm, _) = run_vm(image, &[]);
    vm.memory().dump(image.len())
}

fn run_outputs(image: &[i64], inputs: &[i64]) -> Vec<i64> {
    let (_, output) = run_vm(image, inputs);
    drain(&output)
}

fn run_expect_err(image: &[i64], inputs: &[i64]) -> VmError {
    let program = Program::new(image.to_vec());
    let input = Channel::scripted(inputs.iter().copied());
    let mut vm = Vm::new(&program, input, Channel::new());
    vm.run().expect_err("expected error")
}

fn drain(channel: &Channel) -> Vec<i64> {
    let mut values = Vec::new();
    while let Some(v) = channel.try_pop() {
        values.push(v);
    }
    values
}

// ==================== Arithmetic, position mode ====================

#[test]
fn add_multiply_position_mode() {
    assert_eq!(
        run_to_memory(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]),
        vec![3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50]
    );
}

#[test]
fn small_add_multiply_programs() {
    assert_eq!(run_to_memory(&[1, 0, 0, 0, 99]), vec![2, 0, 0, 0, 99]);
    assert_eq!(run_to_memory(&[2, 3, 0, 3, 99]), vec![2, 3, 0, 6, 99]);
    assert_eq!(
        run_to_memory(&[2, 4, 4, 5, 99, 0]),
        vec![2, 4, 4, 5, 99, 9801]
    );
    assert_eq!(
        run_to_memory(&[1, 1, 1, 4, 99, 5, 6, 0, 99]),
        vec![30, 1, 1, 4, 2, 5, 6, 0, 99]
    );
}

#[test]
fn immediate_mode_arithmetic() {
    // 1002: multiply with the second parameter immediate; writes 99 at 4.
    assert_eq!(
        run_to_memory(&[1002, 4, 3, 4, 33]),
        vec![1002, 4, 3, 4, 99]
    );
    // Negative immediates.
    assert_eq!(
        run_to_memory(&[1101, 100, -1, 4, 0]),
        vec![1101, 100, -1, 4, 99]
    );
}

// ==================== Comparisons and jumps ====================

#[test]
fn equals_position_mode() {
    let image = [3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
    assert_eq!(run_outputs(&image, &[8]), vec![1]);
    assert_eq!(run_outputs(&image, &[7]), vec![0]);
}

#[test]
fn less_than_position_mode() {
    let image = [3, 9, 7, 9, 10, 9, 4, 9, 99, -1, 8];
    assert_eq!(run_outputs(&image, &[5]), vec![1]);
    assert_eq!(run_outputs(&image, &[8]), vec![0]);
}

#[test]
fn equals_immediate_mode() {
    let image = [3, 3, 1108, -1, 8, 3, 4, 3, 99];
    assert_eq!(run_outputs(&image, &[8]), vec![1]);
    assert_eq!(run_outputs(&image, &[9]), vec![0]);
}

#[test]
fn jump_tests_zero_versus_nonzero() {
    // Outputs 0 when the input is zero, 1 otherwise.
    let position = [3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9];
    assert_eq!(run_outputs(&position, &[0]), vec![0]);
    assert_eq!(run_outputs(&position, &[5]), vec![1]);
    // Negative values count as "true".
    assert_eq!(run_outputs(&position, &[-3]), vec![1]);

    let immediate = [3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1];
    assert_eq!(run_outputs(&immediate, &[0]), vec![0]);
    assert_eq!(run_outputs(&immediate, &[7]), vec![1]);
}

#[test]
fn three_way_comparison_program() {
    // Outputs 999/1000/1001 for input below/equal/above 8.
    let image = [
        3, 21, 1008, 21, 8, 20, 1005, 20, 22, 107, 8, 21, 20, 1006, 20, 31, 1106, 0, 36, 98, 0, 0,
        1002, 21, 125, 20, 4, 20, 1105, 1, 46, 104, 999, 1105, 1, 46, 1101, 1000, 1, 20, 4, 20,
        1105, 1, 46, 98, 99,
    ];
    assert_eq!(run_outputs(&image, &[7]), vec![999]);
    assert_eq!(run_outputs(&image, &[8]), vec![1000]);
    assert_eq!(run_outputs(&image, &[9]), vec![1001]);
}

// ==================== Relative mode and sparse memory ====================

#[test]
fn self_copying_program() {
    // Acceptance test for relative mode plus dynamically growing memory:
    // the program outputs an exact copy of its own listing.
    let image = [
        109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99,
    ];
    assert_eq!(run_outputs(&image, &[]), image.to_vec());
}

#[test]
fn sixteen_digit_multiplication() {
    let outputs = run_outputs(&[1102, 34915192, 34915192, 7, 4, 7, 99, 0], &[]);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].to_string().len(), 16);
}

#[test]
fn outputs_large_immediate() {
    assert_eq!(
        run_outputs(&[104, 1125899906842624, 99], &[]),
        vec![1125899906842624]
    );
}

#[test]
fn adjust_base_accumulates() {
    // Base goes 0 -> 3 -> 5; the final output reads mem[5 + -1] = mem[4].
    let image = [109, 3, 109, 2, 204, -1, 99];
    assert_eq!(run_outputs(&image, &[]), vec![204]);
}

#[test]
fn input_writes_through_relative_mode() {
    // 203: INPUT with a relative-mode target.
    let (vm, _) = run_vm(&[109, 10, 203, 0, 99], &[77]);
    assert_eq!(vm.memory().read(10).unwrap(), 77);
}

// ==================== Failure semantics ====================

#[test]
fn unknown_opcode_is_fatal() {
    assert!(matches!(
        run_expect_err(&[42], &[]),
        VmError::UnknownOpcode { opcode: 42, addr: 0 }
    ));
}

#[test]
fn zero_arity_mode_digits_are_fatal() {
    assert!(matches!(
        run_expect_err(&[199], &[]),
        VmError::MalformedModes { encoded: 199, addr: 0 }
    ));
}

#[test]
fn immediate_write_target_is_fatal() {
    // 11101: ADD with all three parameters immediate.
    let err = run_expect_err(&[11101, 1, 1, 3, 99], &[]);
    match err {
        VmError::Faulted { ip, mnemonic, source } => {
            assert_eq!(ip, 0);
            assert_eq!(mnemonic, "ADD");
            assert!(matches!(*source, VmError::ImmediateWrite));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn negative_effective_address_is_fatal() {
    // Base stays 0; 204 reads mem[0 + -1].
    let err = run_expect_err(&[204, -1, 99], &[]);
    match err {
        VmError::Faulted { mnemonic, source, .. } => {
            assert_eq!(mnemonic, "OUTPUT");
            assert!(matches!(*source, VmError::InvalidAddress { addr: -1 }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn negative_jump_target_is_fatal() {
    assert!(matches!(
        run_expect_err(&[1105, 1, -4], &[]),
        VmError::InvalidAddress { addr: -4 }
    ));
}

#[test]
fn exhausted_input_is_distinguishable() {
    let err = run_expect_err(&[3, 0, 3, 1, 99], &[7]);
    assert!(err.is_input_exhausted());
}

#[test]
fn stepping_after_halt_is_fatal() {
    let program = Program::new(vec![99]);
    let mut vm = Vm::new(&program, Channel::scripted([]), Channel::new());
    vm.run().unwrap();
    assert!(vm.is_halted());
    assert!(matches!(vm.advance_one(), Err(VmError::SteppedAfterHalt)));
}

// ==================== Versioning ====================

#[test]
fn basic_isa_rejects_relative_extension() {
    let program = Program::new(vec![109, 19, 99]);
    let mut vm = Vm::with_version(
        &program,
        IsaVersion::Basic,
        Channel::scripted([]),
        Channel::new(),
    );
    assert!(matches!(
        vm.run(),
        Err(VmError::UnknownOpcode { opcode: 9, addr: 0 })
    ));

    let program = Program::new(vec![204, 0, 99]);
    let mut vm = Vm::with_version(
        &program,
        IsaVersion::Basic,
        Channel::scripted([]),
        Channel::new(),
    );
    assert!(matches!(
        vm.run(),
        Err(VmError::InvalidModeDigit { digit: 2, addr: 0 })
    ));
}

#[test]
fn basic_isa_runs_the_smaller_set() {
    let program = Program::new(vec![1002, 4, 3, 4, 33]);
    let mut vm = Vm::with_version(
        &program,
        IsaVersion::Basic,
        Channel::scripted([]),
        Channel::new(),
    );
    vm.run().unwrap();
    assert_eq!(vm.memory().read(4).unwrap(), 99);
}

// ==================== Single stepping and determinism ====================

#[test]
fn advance_one_steps_exactly_one_instruction() {
    let program = Program::new(vec![1, 0, 0, 0, 99]);
    let mut vm = Vm::new(&program, Channel::scripted([]), Channel::new());
    vm.advance_one().unwrap();
    assert!(!vm.is_halted());
    assert_eq!(vm.memory().read(0).unwrap(), 2);
    vm.advance_one().unwrap();
    assert!(vm.is_halted());
}

#[test]
fn runs_are_deterministic() {
    let image = [3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
    let (vm_a, out_a) = run_vm(&image, &[8]);
    let (vm_b, out_b) = run_vm(&image, &[8]);
    assert_eq!(drain(&out_a), drain(&out_b));
    assert_eq!(vm_a.memory().dump(image.len()), vm_b.memory().dump(image.len()));
}
