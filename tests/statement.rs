use mincc::analyzer::Ty;
use mincc::error::{CompileError, CompileResult, Position};
use mincc::lexer::Lexer;
use mincc::parser::{parse_scope, parse_type, Parser, Program, Scope, Statement};

fn parse(src: &str) -> CompileResult<Program> {
    let tokens = Lexer::tokenize(src)?;
    Parser::new(tokens).parse()
}

fn syntax_message(src: &str) -> String {
    match parse(src) {
        Err(CompileError::Syntax { message, .. }) => message,
        other => panic!("expected a syntax error for {:?}, got {:?}", src, other),
    }
}

fn ty(src: &str) -> Ty {
    let tokens = Lexer::tokenize(src).unwrap();
    let (eos, body) = tokens.split_last().unwrap();
    parse_type(body, eos.pos).unwrap()
}

#[test]
fn variable_declaration() {
    let program = parse("x : u64 = 40;").unwrap();

    assert_eq!(program.0.len(), 1);
    let Statement::VarDecl { name, ty, value } = &program.0[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(name.lexeme, "x");
    assert_eq!(*ty, Ty::U64);
    assert_eq!(value.to_string(), "40");
}

#[test]
fn types() {
    assert_eq!(ty("u64"), Ty::U64);
    assert_eq!(ty("ptr u64"), Ty::ptr(Ty::U64));
    assert_eq!(ty("ptr ptr u64"), Ty::ptr(Ty::ptr(Ty::U64)));
    assert_eq!(ty("[3] u64"), Ty::array(Ty::U64, 3));
    assert_eq!(ty("[2] [3] u64"), Ty::array(Ty::array(Ty::U64, 3), 2));
    assert_eq!(ty("ptr [3] u64"), Ty::ptr(Ty::array(Ty::U64, 3)));
    assert_eq!(ty("[2] ptr u64"), Ty::array(Ty::ptr(Ty::U64), 2));
}

#[test]
fn malformed_types() {
    assert_eq!(syntax_message("x : = 1;"), "expected a type");
    assert_eq!(syntax_message("x : foo = 1;"), "unknown type 'foo'");
    assert_eq!(syntax_message("x : u64 u64 = 1;"), "unexpected 'u64' after type");
    assert_eq!(syntax_message("x : ptr = 1;"), "expected a type");
    assert_eq!(syntax_message("x : [0] u64 = 1;"), "array length must be at least 1");
    assert_eq!(syntax_message("x : [n] u64 = 1;"), "expected an array length");
    assert_eq!(syntax_message("x : [3 u64 = 1;"), "expected ']' after array length");
}

#[test]
fn assignment_exit_and_print() {
    let program = parse("y = x + 1;\nexit y;\nprint 72;").unwrap();

    assert_eq!(program.0.len(), 3);
    let Statement::VarAssign { name, value } = &program.0[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(name.lexeme, "y");
    assert_eq!(value.to_string(), "(x + 1)");
    assert!(matches!(&program.0[1], Statement::Exit(e) if e.to_string() == "y"));
    assert!(matches!(&program.0[2], Statement::Print(e) if e.to_string() == "72"));
}

#[test]
fn comparison_in_declaration_is_not_the_equals_sign() {
    let program = parse("b : u64 = x == 1;").unwrap();
    let Statement::VarDecl { value, .. } = &program.0[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(value.to_string(), "(x == 1)");
}

#[test]
fn nested_scopes() {
    let program = parse("{ x : u64 = 1; { y : u64 = 2; } exit x; }").unwrap();

    assert_eq!(program.0.len(), 1);
    let Statement::Scope(Scope(outer)) = &program.0[0] else {
        panic!("expected a scope");
    };
    assert_eq!(outer.len(), 3);
    let Statement::Scope(Scope(inner)) = &outer[1] else {
        panic!("expected a nested scope");
    };
    assert_eq!(inner.len(), 1);
    assert!(matches!(outer[2], Statement::Exit(_)));
}

#[test]
fn empty_scope_and_program() {
    assert_eq!(parse("").unwrap().0.len(), 0);
    let program = parse("{}").unwrap();
    assert_eq!(program.0, vec![Statement::Scope(Scope::default())]);
}

#[test]
fn if_else() {
    let program = parse("if x > 1 { print x; } else { exit 1; exit 2; }").unwrap();

    assert_eq!(program.0.len(), 1);
    let Statement::If {
        condition,
        then_body,
        else_body: Some(else_body),
    } = &program.0[0]
    else {
        panic!("expected an if with an else");
    };
    assert_eq!(condition.to_string(), "(x > 1)");
    assert_eq!(then_body.0.len(), 1);
    assert_eq!(else_body.0.len(), 2);
}

#[test]
fn if_without_else() {
    let program = parse("if x { exit 1; } exit 0;").unwrap();

    assert_eq!(program.0.len(), 2);
    assert!(matches!(
        program.0[0],
        Statement::If {
            else_body: None,
            ..
        }
    ));
}

#[test]
fn else_must_follow_the_closing_brace() {
    assert_eq!(
        syntax_message("if x { exit 1; } y = 1; else { exit 2; }"),
        "'else' without a matching 'if'"
    );
    assert_eq!(
        syntax_message("if x { exit 1; } else exit 2;"),
        "expected '{' after 'else'"
    );
}

#[test]
fn while_loop() {
    let program = parse("while i < 3 { i = i + 1; }").unwrap();

    let Statement::While { condition, body } = &program.0[0] else {
        panic!("expected a while loop");
    };
    assert_eq!(condition.to_string(), "(i < 3)");
    assert_eq!(body.0.len(), 1);
}

#[test]
fn statement_delimiters() {
    assert_eq!(syntax_message("exit 1"), "expected ';' before end of input");
    assert_eq!(syntax_message("exit 1 { }"), "expected ';' before '{'");
    assert_eq!(syntax_message("{ exit 1; "), "expected a closing '}'");
    assert_eq!(syntax_message("x : u64 1;"), "expected '=' in declaration");
    assert_eq!(syntax_message("if x exit 1;"), "expected '{' after condition");
    assert_eq!(syntax_message("while x"), "expected '{' after condition");
    assert_eq!(syntax_message("1 + 2;"), "unknown statement starting with '1'");
    assert_eq!(syntax_message("}"), "unknown statement starting with '}'");
}

#[test]
fn missing_semicolon_inside_scope_points_at_the_brace() {
    let err = parse("{\n  exit 1\n}").unwrap_err();

    assert!(matches!(
        err,
        CompileError::Syntax {
            pos: Position { line: 3, column: 1 },
            ..
        }
    ));
}

#[test]
fn parse_scope_between_braces() {
    let tokens = Lexer::tokenize("{ a : u64 = 1; print a; }").unwrap();
    let scope = parse_scope(&tokens[1..10], tokens[10].pos).unwrap();

    assert_eq!(scope.0.len(), 2);
    assert!(matches!(scope.0[0], Statement::VarDecl { .. }));
}

#[test]
fn keywords_are_reserved() {
    assert_eq!(
        syntax_message("while : u64 = 1;"),
        "expected '{' after condition"
    );
}
