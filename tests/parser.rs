use lox::ast_printer::AstPrinter;
use lox::parser::Parser;
use lox::scanner::Scanner;

fn parse(source: &str) -> (Vec<String>, Vec<String>) {
    let mut tokens = Vec::new();
    for result in Scanner::new(source.as_bytes()) {
        tokens.push(result.expect("scan error"));
    }

    let mut parser = Parser::new(tokens);
    let statements = parser.parse();

    let printed: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();
    let errors: Vec<String> = parser
        .take_errors()
        .iter()
        .map(ToString::to_string)
        .collect();

    (printed, errors)
}

fn parse_ok(source: &str) -> Vec<String> {
    let (printed, errors) = parse(source);
    assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
    printed
}

#[test]
fn precedence_and_grouping() {
    assert_eq!(
        parse_ok("print 1 + 2 * 3;"),
        vec!["(print (+ 1.0 (* 2.0 3.0)))"]
    );

    assert_eq!(
        parse_ok("print (1 + 2) * 3;"),
        vec!["(print (* (group (+ 1.0 2.0)) 3.0))"]
    );

    assert_eq!(
        parse_ok("print 1 < 2 == true;"),
        vec!["(print (== (< 1.0 2.0) true))"]
    );
}

#[test]
fn unary_and_logical() {
    assert_eq!(
        parse_ok("print !true or false and nil;"),
        vec!["(print (or (! true) (and false nil)))"]
    );

    assert_eq!(parse_ok("print --1;"), vec!["(print (- (- 1.0)))"]);
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(parse_ok("a = b = 1;"), vec!["(expr (= a (= b 1.0)))"]);
}

#[test]
fn var_declaration() {
    assert_eq!(parse_ok("var x;"), vec!["(var x)"]);
    assert_eq!(parse_ok("var x = 1.5;"), vec!["(var x 1.5)"]);
}

#[test]
fn calls_and_properties() {
    assert_eq!(
        parse_ok("foo(1, bar.baz);"),
        vec!["(expr (call foo 1.0 (. bar baz)))"]
    );

    assert_eq!(
        parse_ok("a.b.c = 1;"),
        vec!["(expr (=. (. a b) c 1.0))"]
    );

    assert_eq!(
        parse_ok("print this.x + super.y();"),
        vec!["(print (+ (. this x) (call (super y))))"]
    );
}

#[test]
fn for_loop_desugars_to_while() {
    assert_eq!(
        parse_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
        vec!["(block (var i 0.0) (while (< i 3.0) (block (print i) (expr (= i (+ i 1.0))))))"]
    );

    // No clauses at all: an infinite while over the bare body.
    assert_eq!(
        parse_ok("for (;;) print 1;"),
        vec!["(while true (print 1.0))"]
    );
}

#[test]
fn if_while_and_blocks() {
    assert_eq!(
        parse_ok("if (a) print 1; else { print 2; }"),
        vec!["(if a (print 1.0) (block (print 2.0)))"]
    );

    assert_eq!(
        parse_ok("while (a) { a = a - 1; }"),
        vec!["(while a (block (expr (= a (- a 1.0)))))"]
    );
}

#[test]
fn function_and_class_declarations() {
    assert_eq!(
        parse_ok("fun add(a, b) { return a + b; }"),
        vec!["(fun add (a b) (return (+ a b)))"]
    );

    assert_eq!(
        parse_ok("class A { greet() { print \"hi\"; } }"),
        vec!["(class A (fun greet () (print hi)))"]
    );

    assert_eq!(
        parse_ok("class B < A { init(n) { super.init(n); } }"),
        vec!["(class B (< A) (fun init (n) (expr (call (super init) n))))"]
    );
}

#[test]
fn invalid_assignment_target_is_nonfatal() {
    let (printed, errors) = parse("1 = 2; print 3;");

    assert_eq!(errors, vec!["[line 1] Error at '=': Invalid assignment target."]);

    // Parsing continued: both statements are present.
    assert_eq!(printed.len(), 2);
    assert_eq!(printed[1], "(print 3.0)");
}

#[test]
fn panic_mode_reports_multiple_errors() {
    let (printed, errors) = parse("var 1 = 2;\nprint 3;\nvar = 4;\nprint 5;");

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0], "[line 1] Error at '1': Expect variable name.");
    assert_eq!(errors[1], "[line 3] Error at '=': Expect variable name.");

    // The two well-formed statements survive synchronization.
    assert_eq!(printed, vec!["(print 3.0)", "(print 5.0)"]);
}

#[test]
fn error_at_end_of_input() {
    let (_, errors) = parse("print 1");

    assert_eq!(errors, vec!["[line 1] Error at end: Expect ';' after value."]);
}

#[test]
fn argument_limit_reports_but_continues() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("foo({});", args.join(", "));

    let (printed, errors) = parse(&source);

    assert_eq!(
        errors,
        vec!["[line 1] Error at '255': Can't have more than 255 arguments."]
    );

    // The call is still consumed with all 256 arguments.
    assert_eq!(printed.len(), 1);
    assert!(printed[0].starts_with("(expr (call foo 0.0"));
}
