use mincc::analyzer::{check, infer_type, SymbolTable, Ty, TypeEnv};
use mincc::error::{CompileError, CompileResult, Position, SemanticErrorKind};
use mincc::lexer::{Lexer, Token, TokenKind};
use mincc::parser::{parse_expression, Parser};

fn check_src(src: &str) -> CompileResult<()> {
    let tokens = Lexer::tokenize(src)?;
    let program = Parser::new(tokens).parse()?;
    check(&program)
}

fn semantic_error(src: &str) -> (SemanticErrorKind, Position) {
    match check_src(src) {
        Err(CompileError::Semantic { kind, pos }) => (kind, pos),
        other => panic!("expected a semantic error for {:?}, got {:?}", src, other),
    }
}

fn is_mismatch(src: &str) -> bool {
    matches!(semantic_error(src).0, SemanticErrorKind::TypeMismatch { .. })
}

fn is_invalid_operand(src: &str) -> bool {
    matches!(semantic_error(src).0, SemanticErrorKind::InvalidOperandKind(_))
}

fn token(name: &str) -> Token {
    Token::new(name, TokenKind::Identifier, Position::new(1, 1))
}

#[test]
fn well_formed_program() {
    check_src(
        "x : u64 = 40;
         y : u64 = 2;
         p : ptr u64 = &x;
         z : u64 = *p + y;
         if z > 41 { print 65; } else { exit 1; }
         while y < 5 { y = y + 1; }
         exit x + y;",
    )
    .unwrap();
}

#[test]
fn scope_isolation() {
    let (kind, pos) = semantic_error("{ x : u64 = 1; } x = 2;");

    assert_eq!(kind, SemanticErrorKind::UnresolvedName("x".to_string()));
    assert_eq!(pos, Position::new(1, 18));
}

#[test]
fn shadowing_is_allowed() {
    check_src("x : u64 = 1; { x : u64 = 2; }").unwrap();
    check_src("x : u64 = 1; { x : ptr u64 = &x; exit *x; } exit x;").unwrap();
}

#[test]
fn shadowing_initializer_sees_the_outer_variable() {
    check_src("x : u64 = 1; { x : u64 = x + 1; }").unwrap();
    assert_eq!(
        semantic_error("x : u64 = x;").0,
        SemanticErrorKind::UnresolvedName("x".to_string())
    );
}

#[test]
fn duplicate_in_same_scope() {
    let (kind, pos) = semantic_error("x : u64 = 1;\nx : u64 = 2;");

    assert_eq!(kind, SemanticErrorKind::DuplicateDeclaration("x".to_string()));
    assert_eq!(pos, Position::new(2, 1));
}

#[test]
fn assigning_a_primitive_to_a_pointer() {
    let (kind, pos) = semantic_error("x : u64 = 1; y : ptr u64 = &x; y = 1;");

    assert_eq!(
        kind,
        SemanticErrorKind::TypeMismatch {
            expected: "ptr u64".to_string(),
            found: "u64".to_string(),
        }
    );
    assert_eq!(pos, Position::new(1, 36));
}

#[test]
fn declared_type_must_match() {
    assert!(is_mismatch("x : ptr u64 = 1;"));
    assert!(is_mismatch("x : u64 = 1; p : ptr ptr u64 = &x;"));
    assert!(is_mismatch("a : [2] u64 = [1, 2, 3];"));
}

#[test]
fn undeclared_assignment() {
    let (kind, pos) = semantic_error("y = 1;");

    assert_eq!(kind, SemanticErrorKind::UnresolvedName("y".to_string()));
    assert_eq!(pos, Position::new(1, 1));
}

#[test]
fn branches_do_not_see_each_other() {
    assert_eq!(
        semantic_error("if 1 { a : u64 = 1; } else { a = 2; }").0,
        SemanticErrorKind::UnresolvedName("a".to_string())
    );
    assert_eq!(
        semantic_error("while 1 { b : u64 = 1; } exit b;").0,
        SemanticErrorKind::UnresolvedName("b".to_string())
    );
}

#[test]
fn conditions_resolve_in_the_enclosing_scope() {
    assert_eq!(
        semantic_error("if c { c : u64 = 1; }").0,
        SemanticErrorKind::UnresolvedName("c".to_string())
    );
}

#[test]
fn exit_and_print_need_resolved_names() {
    assert_eq!(
        semantic_error("print q;").0,
        SemanticErrorKind::UnresolvedName("q".to_string())
    );
    check_src("x : u64 = 1; p : ptr u64 = &x; print p;").unwrap();
}

#[test]
fn invalid_operands() {
    assert!(is_invalid_operand("x : u64 = 1; exit *x;"));
    assert!(is_invalid_operand("x : u64 = 1; p : ptr u64 = &(x + 1);"));
    assert!(is_invalid_operand("x : u64 = 1; exit x[0];"));
    assert!(is_invalid_operand("a : [2] u64 = [1, 2]; p : ptr u64 = &a[0];"));
    assert!(is_invalid_operand("a : [1] u64 = [];"));
}

#[test]
fn pointers_are_not_arithmetic() {
    assert!(is_mismatch("x : u64 = 1; p : ptr u64 = &x; exit p + 1;"));
    assert!(is_mismatch("x : u64 = 1; p : ptr u64 = &x; exit 1 < p;"));
}

#[test]
fn arrays() {
    check_src(
        "a : [3] u64 = [1, 2, 3];
         b : [3] u64 = a;
         a = [4, 5, 6];
         m : [2] [3] u64 = [a, b];
         p : ptr [3] u64 = &a;
         exit a[0] + m[1][2] + (*p)[1];",
    )
    .unwrap();
}

#[test]
fn array_values_are_not_scalars() {
    assert!(is_mismatch("a : [2] u64 = [1, 2]; exit a;"));
    assert!(is_mismatch("a : [2] u64 = [1, 2]; print a + 1;"));
    assert!(is_mismatch("a : [2] u64 = [1, 2]; if a { exit 1; }"));
    assert!(is_mismatch("x : u64 = 1; a : [2] u64 = [1, &x];"));
}

#[test]
fn array_index_must_be_u64() {
    assert!(is_invalid_operand(
        "x : u64 = 0; a : [2] u64 = [1, 2]; exit a[&x];"
    ));
}

#[test]
fn symbol_table_scopes() {
    let mut table = SymbolTable::new();
    table.declare(token("x"), Ty::U64).unwrap();

    let mut inner = table.enter();
    inner.declare(token("x"), Ty::ptr(Ty::U64)).unwrap();
    inner.declare(token("y"), Ty::U64).unwrap();
    assert_eq!(inner.type_of("x"), Some(&Ty::ptr(Ty::U64)));
    assert!(inner.declare(token("y"), Ty::U64).is_err());

    assert!(table.is_declared_in_current_scope("x"));
    assert!(!inner.is_declared_in_current_scope("z"));
    assert_eq!(table.type_of("x"), Some(&Ty::U64));
    assert!(table.lookup("y").is_none());
}

#[test]
fn inference_against_a_symbol_table() {
    let mut table = SymbolTable::new();
    table.declare(token("a"), Ty::array(Ty::U64, 2)).unwrap();

    let tokens = Lexer::tokenize("[&a, &a]").unwrap();
    let expr = parse_expression(&tokens[..7], tokens[7].pos).unwrap();
    assert_eq!(
        infer_type(&table, &expr).unwrap(),
        Ty::array(Ty::ptr(Ty::array(Ty::U64, 2)), 2)
    );
}
