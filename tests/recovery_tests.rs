// Recovery, totality and report invariants over awkward inputs

use decompi::diagnostics::ErrorKind;
use decompi::parser::ast::*;
use decompi::{compile, CompilationResult};

/// Small deterministic generator so failures are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const FRAGMENTS: &[&str] = &[
    "var", "x", "y", "=", "==", "!=", "<", "<=", ">", ">=", "+", "-", "*", "/", "(", ")", "{",
    "}", ";", ",", "if", "while", "si", "mientras", "show", "read", "\"txt\"", "\"open", "1",
    "2.5", "3.", "&&", "||", "!", "and", "or", "not", "%default", "%color", "%figure", "%font",
    "%fontsize", "%bogus", "#fff", "#12", "@", "&", "//c\n", "/*", "*/", "\n", " ", "\t",
];

fn random_source(rng: &mut XorShift) -> String {
    let len = rng.below(40);
    let mut source = String::new();
    for _ in 0..len {
        source.push_str(FRAGMENTS[rng.below(FRAGMENTS.len())]);
        if rng.below(3) > 0 {
            source.push(' ');
        }
    }
    source
}

fn assert_invariants(source: &str, result: &CompilationResult) {
    for op in &result.operator_report {
        assert!(op.line >= 1 && op.column >= 1, "{:?} in {:?}", op, source);
    }
    for control in &result.control_report {
        assert!(control.line >= 1, "{:?} in {:?}", control, source);
    }
    for error in &result.errors {
        let positionless = error.line == 0 || error.column == 0;
        assert_eq!(
            positionless,
            error.kind == ErrorKind::Fatal,
            "{:?} in {:?}",
            error,
            source
        );
    }
    if result.program.is_none() {
        assert!(!result.errors.is_empty(), "no program and no errors for {:?}", source);
    }
}

#[test]
fn test_random_token_soup_is_total_and_idempotent() {
    let mut rng = XorShift(0x2545_f491_4f6c_dd1d);
    for _ in 0..2000 {
        let source = random_source(&mut rng);
        let first = compile(&source);
        let second = compile(&source);
        assert_eq!(first, second, "not idempotent for {:?}", source);
        assert_invariants(&source, &first);
    }
}

#[test]
fn test_random_bytes_are_total() {
    let mut rng = XorShift(0x9e37_79b9_7f4a_7c15);
    for _ in 0..500 {
        let bytes: Vec<u8> = (0..rng.below(200)).map(|_| rng.next() as u8).collect();
        let source = String::from_utf8_lossy(&bytes);
        let result = compile(&source);
        assert_invariants(&source, &result);
    }
}

#[test]
fn test_pathological_shapes() {
    let sources = [
        "if x > 1 {".repeat(300),
        format!("if {}x > 1", "!".repeat(5000)),
        format!("if {}x > 1", "not ".repeat(5000)),
        format!("x = {}1", "-".repeat(5000)),
        format!("while {}a > b{} {{}}", "(".repeat(5000), ")".repeat(5000)),
        "{".repeat(5000),
        "}".repeat(5000),
        "(".repeat(5000),
    ];

    for source in &sources {
        let result = compile(source);
        assert_invariants(source, &result);
        assert!(!result.errors.is_empty());
    }
}

#[test]
fn test_long_operator_chains_hit_the_depth_limit() {
    let sources = [
        format!("x = {}a", "a + ".repeat(100_000)),
        format!("if {}a > 1 {{}}", "a > 1 && ".repeat(100_000)),
    ];

    for source in &sources {
        let result = compile(source);
        assert!(result.program.is_none());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::Fatal);
    }

    // a chain under the limit still compiles
    let result = compile(&format!("x = {}a", "a + ".repeat(40)));
    assert!(result.errors.is_empty());
    assert_eq!(result.operator_report.len(), 40);
}

#[test]
fn test_semicolon_is_a_sync_point() {
    let result = compile("x = = 1; y = 2");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.program.unwrap().instructions,
        vec![Instruction::Assignment {
            name: "y".into(),
            value: Expression::Number(2.0)
        }]
    );
}

#[test]
fn test_error_inside_block_stays_inside() {
    let result = compile("while a < 3 {\n    a =\n}\nread a");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].lexeme, "}");
    assert_eq!(result.control_report.len(), 1);

    let program = result.program.unwrap();
    assert_eq!(program.instructions.len(), 2);
    assert!(matches!(
        &program.instructions[0],
        Instruction::While { body, .. } if body.is_empty()
    ));
}

#[test]
fn test_reports_survive_later_errors() {
    let result = compile("x = a + b\ny = = 2\nif x > 1 { show \"ok\" }");

    assert_eq!(result.errors.len(), 1);
    let operators: Vec<_> = result
        .operator_report
        .iter()
        .map(|op| op.operator.as_str())
        .collect();
    assert_eq!(operators, vec!["+", ">"]);
    assert_eq!(result.control_report.len(), 1);
}

#[test]
fn test_partial_operator_occurrence() {
    let result = compile("x = a +\nread y");

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.operator_report.len(), 1);
    assert_eq!(result.operator_report[0].occurrence, "a + …");
    assert_eq!(result.program.unwrap().instructions.len(), 1);
}

#[test]
fn test_every_error_is_reported_in_one_pass() {
    let source = "var 1\nshow x\nread \"y\"\n%color nowhere = #fff\nz = ) \nvar ok = 1";
    let result = compile(source);

    let lines: Vec<_> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![1, 2, 3, 4, 5]);
    assert!(result.errors.iter().all(|e| e.kind == ErrorKind::Syntactic));
    assert_eq!(result.program.unwrap().instructions.len(), 1);
}

#[test]
fn test_lexical_errors_inside_expressions() {
    let result = compile("var t = 3. + 1\nshow \"bad \\q escape\"\nvar u = 2");

    let kinds: Vec<_> = result.errors.iter().map(|e| (e.kind, e.line)).collect();
    assert!(kinds.contains(&(ErrorKind::Lexical, 1)));
    assert!(kinds.contains(&(ErrorKind::Lexical, 2)));
    let program = result.program.unwrap();
    assert!(program.instructions.contains(&Instruction::VarDeclaration {
        name: "u".into(),
        value: Some(Expression::Number(2.0))
    }));
}
