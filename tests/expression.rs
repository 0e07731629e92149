use mincc::error::{CompileError, CompileResult, Position};
use mincc::lexer::Lexer;
use mincc::parser::{parse_expression, BinOpKind, Expr, UnaryOpKind};

fn parse(src: &str) -> CompileResult<String> {
    let tokens = Lexer::tokenize(src)?;
    let (eos, body) = tokens.split_last().unwrap();
    parse_expression(body, eos.pos).map(|e| e.to_string())
}

fn tree(src: &str) -> String {
    parse(src).unwrap()
}

fn syntax_message(src: &str) -> String {
    match parse(src) {
        Err(CompileError::Syntax { message, .. }) => message,
        other => panic!("expected a syntax error for {:?}, got {:?}", src, other),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(tree("a + b * c"), "(a + (b * c))");
    assert_eq!(tree("a * b + c"), "((a * b) + c)");

    let tokens = Lexer::tokenize("a + b * c").unwrap();
    let expr = parse_expression(&tokens[..5], tokens[5].pos).unwrap();
    let Expr::Binary {
        kind: BinOpKind::Add,
        right,
        ..
    } = expr
    else {
        panic!("expected an addition at the root");
    };
    assert!(matches!(
        *right,
        Expr::Binary {
            kind: BinOpKind::Mul,
            ..
        }
    ));
}

#[test]
fn same_precedence_groups_left() {
    assert_eq!(tree("a - b - c"), "((a - b) - c)");
    assert_eq!(tree("a / b * c"), "((a / b) * c)");
    assert_eq!(tree("a % b * c"), "((a % b) * c)");
    assert_eq!(tree("a ^ b ^ c"), "((a ^ b) ^ c)");
}

#[test]
fn precedence_levels() {
    assert_eq!(tree("a + 1 > b * 2"), "((a + 1) > (b * 2))");
    assert_eq!(tree("a == b < c"), "((a == b) < c)");
    assert_eq!(tree("a * b ^ c"), "(a * (b ^ c))");
    assert_eq!(tree("1 + 2 * 3 ^ 4 - 5"), "((1 + (2 * (3 ^ 4))) - 5)");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(tree("(a + b) * c"), "((a + b) * c)");
    assert_eq!(tree("a - (b - c)"), "(a - (b - c))");
    assert_eq!(tree("((a))"), "a");
}

#[test]
fn bracket_round_trip() {
    for e in [
        "a",
        "42",
        "a + b * c",
        "a - b - c",
        "(a + b) * (c - d)",
        "*p + 1",
        "&x",
        "a[i + 1] * 2",
        "[1, 2, 3][0]",
        "x > 1 == y",
    ] {
        assert_eq!(tree(&format!("({})", e)), tree(e), "round trip of {}", e);
    }
}

#[test]
fn unary_operators() {
    assert_eq!(tree("&x"), "(&x)");
    assert_eq!(tree("*p"), "(*p)");
    assert_eq!(tree("**pp"), "(*(*pp))");
    assert_eq!(tree("*p + 1"), "((*p) + 1)");
    assert_eq!(tree("a * *p"), "(a * (*p))");
    assert_eq!(tree("*(p)"), "(*p)");

    let tokens = Lexer::tokenize("&x").unwrap();
    let expr = parse_expression(&tokens[..2], tokens[2].pos).unwrap();
    assert!(matches!(
        expr,
        Expr::Unary {
            kind: UnaryOpKind::AddressOf,
            ..
        }
    ));
}

#[test]
fn index_binds_tighter_than_unary() {
    assert_eq!(tree("a[1]"), "a[1]");
    assert_eq!(tree("*p[0]"), "(*p[0])");
    assert_eq!(tree("(*p)[0]"), "(*p)[0]");
    assert_eq!(tree("m[1][2]"), "m[1][2]");
    assert_eq!(tree("a[i + 1] * 2"), "(a[(i + 1)] * 2)");
    assert_eq!(tree("a[b[0]]"), "a[b[0]]");
}

#[test]
fn array_literals() {
    assert_eq!(tree("[1, 2 + 3, x]"), "[1, (2 + 3), x]");
    assert_eq!(tree("[[1, 2], [3, 4]]"), "[[1, 2], [3, 4]]");
    assert_eq!(tree("[7]"), "[7]");
    assert_eq!(tree("[]"), "[]");
    assert_eq!(tree("[1, 2][1]"), "[1, 2][1]");
}

#[test]
fn empty_expression_reports_the_end_position() {
    let tokens = Lexer::tokenize("exit ;").unwrap();
    let err = parse_expression(&tokens[1..1], tokens[1].pos).unwrap_err();

    assert!(matches!(
        err,
        CompileError::Syntax {
            pos: Position { line: 1, column: 6 },
            ..
        }
    ));
}

#[test]
fn unmatched_brackets() {
    assert_eq!(syntax_message("(a + b"), "expected a closing ')'");
    assert_eq!(syntax_message("a + b)"), "unmatched closing ')'");
    assert_eq!(syntax_message("a[1"), "expected a closing ']'");
    assert_eq!(syntax_message("1]"), "unmatched closing ']'");
}

#[test]
fn malformed_expressions() {
    assert_eq!(syntax_message("a b"), "expected an operation in expression");
    assert_eq!(syntax_message("a +"), "expression must not be empty");
    assert_eq!(syntax_message("a = b"), "unknown binary operation '='");
    assert_eq!(syntax_message("&"), "unexpected token '&' in expression");
    assert_eq!(syntax_message("a, b"), "expected an operation in expression");
    assert_eq!(syntax_message("[1, , 2]"), "expression must not be empty");
}

#[test]
fn number_literals_must_fit_in_u64() {
    assert_eq!(tree("18446744073709551615"), "18446744073709551615");
    assert_eq!(
        syntax_message("18446744073709551616"),
        "number literal does not fit in u64"
    );
}

#[test]
fn error_positions_point_at_the_offending_token() {
    let err = parse("(a +\n b").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Syntax {
            pos: Position { line: 1, column: 1 },
            ..
        }
    ));
}
