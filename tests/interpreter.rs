use lox::interpreter::Interpreter;
use lox::parser::Parser;
use lox::resolver::Resolver;
use lox::scanner::Scanner;

/// Run `source` through the whole pipeline, capturing program output.
/// Returns the captured stdout and the runtime error rendering, if any.
fn run(source: &str) -> (String, Option<String>) {
    let tokens: Vec<_> = Scanner::new(source.as_bytes())
        .map(|r| r.expect("scan error"))
        .collect();

    let mut parser = Parser::new(tokens);
    let statements = parser.parse();
    let parse_errors = parser.take_errors();
    assert!(
        parse_errors.is_empty(),
        "unexpected parse errors: {:?}",
        parse_errors
    );

    let mut output: Vec<u8> = Vec::new();
    let mut interpreter = Interpreter::new(&mut output);

    let resolve_errors = Resolver::new(&mut interpreter).resolve(&statements);
    assert!(
        resolve_errors.is_empty(),
        "unexpected resolve errors: {:?}",
        resolve_errors
    );

    let error = interpreter.interpret(&statements).err().map(|e| e.to_string());
    drop(interpreter);

    (String::from_utf8(output).expect("program output is UTF-8"), error)
}

fn assert_output(source: &str, expected: &str) {
    let (output, error) = run(source);
    assert_eq!(error, None, "unexpected runtime error");
    assert_eq!(output, expected);
}

fn assert_runtime_error(source: &str, expected: &str) {
    let (_, error) = run(source);
    assert_eq!(error.as_deref(), Some(expected));
}

#[test]
fn print_string() {
    assert_output("print \"hello world\";", "hello world\n");
}

#[test]
fn number_formatting() {
    assert_output("print 3;", "3\n");
    assert_output("print 2.5;", "2.5\n");
    assert_output("print 10 / 4;", "2.5\n");
    assert_output("print -0.25 * 4;", "-1\n");
}

#[test]
fn block_scoping_and_shadowing() {
    assert_output(
        "var x = 1; { var x = 2; print x; } print x;",
        "2\n1\n",
    );
}

#[test]
fn closures_capture_their_environment() {
    assert_output(
        r#"
        fun make() {
            var i = 0;
            fun inc() { i = i + 1; return i; }
            return inc;
        }
        var f = make();
        print f();
        print f();
        print f();
        "#,
        "1\n2\n3\n",
    );
}

#[test]
fn closures_are_not_affected_by_later_shadowing() {
    assert_output(
        r#"
        var a = "global";
        {
            fun show() { print a; }
            show();
            var a = "block";
            show();
        }
        "#,
        "global\nglobal\n",
    );
}

#[test]
fn functions_see_globals_declared_after_them() {
    assert_output(
        r#"
        fun show() { print g; }
        var g = 42;
        show();
        "#,
        "42\n",
    );
}

#[test]
fn class_methods() {
    assert_output(
        "class A { greet() { print \"hi\"; } } A().greet();",
        "hi\n",
    );
}

#[test]
fn inherited_initializer_chain() {
    assert_output(
        r#"
        class A { init(n) { this.n = n; } }
        class B < A { init(n) { super.init(n); this.n = this.n + 1; } }
        print B(5).n;
        "#,
        "6\n",
    );
}

#[test]
fn super_dispatches_past_an_override() {
    assert_output(
        r#"
        class A { greet() { return "A"; } }
        class B < A { greet() { return super.greet() + "B"; } }
        print B().greet();
        "#,
        "AB\n",
    );
}

#[test]
fn bound_methods_remember_their_instance() {
    assert_output(
        r#"
        class A {
            init(name) { this.name = name; }
            whoami() { return this.name; }
        }
        var a = A("left");
        var m = a.whoami;
        var b = A("right");
        print m();
        print m() == b.whoami();
        "#,
        "left\nfalse\n",
    );
}

#[test]
fn initializer_always_returns_the_instance() {
    assert_output(
        r#"
        class A { init() { this.x = 1; return; } }
        var a = A();
        print a.x;
        print a.init() == a;
        "#,
        "1\ntrue\n",
    );
}

#[test]
fn fields_shadow_methods() {
    assert_output(
        r#"
        class A { f() { return "method"; } }
        var a = A();
        print a.f();
        a.f = 3;
        print a.f;
        "#,
        "method\n3\n",
    );
}

#[test]
fn for_loop() {
    assert_output("for (var i = 0; i < 3; i = i + 1) print i;", "0\n1\n2\n");
}

#[test]
fn while_loop() {
    assert_output(
        "var i = 3; while (i > 0) { print i; i = i - 1; }",
        "3\n2\n1\n",
    );
}

#[test]
fn recursion() {
    assert_output(
        r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(10);
        "#,
        "55\n",
    );
}

#[test]
fn truthiness() {
    // Only nil and false are falsey; zero and the empty string are truthy.
    assert_output("if (0) print \"t\"; else print \"f\";", "t\n");
    assert_output("if (\"\") print \"t\"; else print \"f\";", "t\n");
    assert_output("if (nil) print \"t\"; else print \"f\";", "f\n");
    assert_output("if (false) print \"t\"; else print \"f\";", "f\n");
}

#[test]
fn logical_operators_short_circuit() {
    assert_output(
        r#"
        fun effect() { print "evaluated"; return true; }
        print true or effect();
        print false and effect();
        print false or "rhs";
        print true and "rhs";
        "#,
        "true\nfalse\nrhs\nrhs\n",
    );
}

#[test]
fn equality_semantics() {
    assert_output("print nil == nil;", "true\n");
    assert_output("print nil == false;", "false\n");
    assert_output("print 1 == \"1\";", "false\n");
    assert_output("print \"a\" == \"a\";", "true\n");
    assert_output("print 1 != 2;", "true\n");

    // Instances compare by identity, not structure.
    assert_output(
        "class A {} var a = A(); var b = A(); print a == b; print a == a;",
        "false\ntrue\n",
    );
}

#[test]
fn string_concatenation() {
    assert_output("print \"foo\" + \"bar\";", "foobar\n");
}

#[test]
fn division_follows_ieee_semantics() {
    assert_output("print 1 / 0;", "inf\n");
}

#[test]
fn value_stringification() {
    assert_output("fun f() {} print f;", "<fn f>\n");
    assert_output("class A {} print A;", "A class\n");
    assert_output("class A {} print A();", "A instance\n");
    assert_output("print clock;", "<native fn>\n");
    assert_output("print list;", "<native class>\n");
    assert_output("print true; print false; print nil;", "true\nfalse\nnil\n");
}

#[test]
fn clock_returns_seconds_since_epoch() {
    assert_output("print clock() > 0;", "true\n");
}

#[test]
fn list_basics() {
    assert_output(
        "var a = list(); a.add(1); a.add(2); print a.toString();",
        "[1, 2]\n",
    );

    assert_output(
        r#"
        var a = list();
        a.add("x").add("y").add("z");
        print a.length();
        print a.get(1);
        a.set(1, "Y");
        a.remove(0);
        print a.toString();
        a.clear();
        print a.length();
        "#,
        "3\ny\n[Y, z]\n0\n",
    );
}

#[test]
fn list_errors() {
    assert_runtime_error(
        "var a = list(); a.x = 1;",
        "Can't set properties on a native instance.\n[line 1]",
    );

    assert_runtime_error(
        "var a = list(); a.push(1);",
        "Undefined property 'push'.\n[line 1]",
    );

    assert_runtime_error(
        "var a = list(); a.add(1); print a.get(1.5);",
        "Index must be an integer.\n[line 1]",
    );

    assert_runtime_error(
        "var a = list(); a.add(1); print a.get(3);",
        "Index out of range.\n[line 1]",
    );

    assert_runtime_error(
        "var a = list(); a.add(1); print a.get(-1);",
        "Index must be an integer.\n[line 1]",
    );

    assert_runtime_error(
        "var a = list(); a.get(\"0\");",
        "Index must be an integer.\n[line 1]",
    );
}

#[test]
fn unary_operand_errors() {
    assert_runtime_error("print -\"x\";", "Operand must be a number.\n[line 1]");
}

#[test]
fn binary_operand_errors() {
    assert_runtime_error(
        "print 1 + \"x\";",
        "Operands must be two numbers or two strings.\n[line 1]",
    );

    assert_runtime_error("print 1 < \"x\";", "Operands must be numbers.\n[line 1]");

    assert_runtime_error("print nil * 2;", "Operands must be numbers.\n[line 1]");
}

#[test]
fn undefined_variable_errors() {
    assert_runtime_error("print missing;", "Undefined variable 'missing'.\n[line 1]");

    assert_runtime_error("missing = 1;", "Undefined variable 'missing'.\n[line 1]");
}

#[test]
fn call_errors() {
    assert_runtime_error(
        "var x = 1; x();",
        "Can only call functions and classes.\n[line 1]",
    );

    assert_runtime_error(
        "fun f(a, b) {} f(1);",
        "Expected 2 arguments but got 1.\n[line 1]",
    );

    assert_runtime_error(
        "class A {} A(1);",
        "Expected 0 arguments but got 1.\n[line 1]",
    );

    assert_runtime_error("clock(1);", "Expected 0 arguments but got 1.\n[line 1]");
}

#[test]
fn property_errors() {
    assert_runtime_error(
        "class A {} print A().missing;",
        "Undefined property 'missing'.\n[line 1]",
    );

    assert_runtime_error("print 1.x;", "Only instances have properties.\n[line 1]");

    assert_runtime_error("1.x = 2;", "Only instances have fields.\n[line 1]");
}

#[test]
fn superclass_must_be_a_class() {
    assert_runtime_error(
        "var NotAClass = 1; class A < NotAClass {}",
        "Superclass must be a class.\n[line 1]",
    );
}

#[test]
fn runtime_error_reports_the_failing_line() {
    assert_runtime_error(
        "var a = 1;\nvar b = 2;\nprint a + nil;",
        "Operands must be numbers.\n[line 3]",
    );
}

#[test]
fn runtime_error_aborts_execution() {
    let (output, error) = run("print 1;\nprint nil + 1;\nprint 3;");

    assert_eq!(output, "1\n");
    assert!(error.is_some());
}

#[test]
fn return_unwinds_nested_blocks() {
    assert_output(
        r#"
        fun f() {
            while (true) {
                { return "deep"; }
            }
        }
        print f();
        "#,
        "deep\n",
    );
}

#[test]
fn implicit_return_is_nil() {
    assert_output("fun f() {} print f();", "nil\n");
}
