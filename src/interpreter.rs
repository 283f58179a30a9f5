//! Tree-walking evaluator.
//!
//! Executes statements in order against an environment chain.  Variable
//! accesses resolved by the resolver go through `Environment::get_at`
//! with the recorded distance; everything else falls back to the global
//! environment (absence from the side table *means* global).
//!
//! Non-local `return` travels as a control-flow signal, not an error:
//! statement execution yields `Result<_, Interrupt>` and only function
//! call dispatch catches the `Return` arm.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::native::{clock_native, list_native, BoundListMethod, ListOp, NativeFunction};
use crate::parser::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::token::{Token, TokenType};
use crate::value::{Instance, LoxClass, LoxFunction, Value};

/// Unwinds the statement evaluator: either a `return` travelling to the
/// nearest call site, or a genuine runtime error.
pub enum Interrupt {
    Return(Value),
    Error(LoxError),
}

impl From<LoxError> for Interrupt {
    fn from(e: LoxError) -> Interrupt {
        Interrupt::Error(e)
    }
}

type Exec<T> = std::result::Result<T, Interrupt>;

pub struct Interpreter<'out, W: Write> {
    output: &'out mut W,
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<usize, usize>,
}

impl<'out, W: Write> Interpreter<'out, W> {
    pub fn new(output: &'out mut W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            })),
        );

        globals.borrow_mut().define(
            "list",
            Value::Native(Rc::new(NativeFunction {
                name: "list",
                arity: 0,
                func: list_native,
            })),
        );

        Interpreter {
            output,
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Record a variable occurrence as a local at the given depth.
    /// Called by the resolver; occurrences without an entry are globals.
    pub fn note_local(&mut self, id: usize, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Run a resolved program.  Stops at the first runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}

                Err(Interrupt::Error(e)) => return Err(e),

                Err(Interrupt::Return(_)) => {
                    unreachable!("resolver rejects top-level return")
                }
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Exec<()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(())
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;

                writeln!(self.output, "{}", value).map_err(LoxError::Io)?;

                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value = if let Some(expr) = initializer {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(())
            }

            Stmt::Block(statements) => {
                let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &self.environment,
                ))));

                self.execute_block(statements, environment)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }

                Ok(())
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                let function = LoxFunction {
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                };

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(())
            }

            Stmt::Return { value, .. } => {
                let value: Value = if let Some(expr) = value {
                    self.evaluate(expr)?
                } else {
                    Value::Nil
                };

                Err(Interrupt::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    /// Run `statements` in `environment`, restoring the previous
    /// environment even when unwinding through a `return` or error.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Exec<()> {
        let previous = std::mem::replace(&mut self.environment, environment);

        for stmt in statements {
            if let Err(interrupt) = self.execute(stmt) {
                self.environment = previous;
                return Err(interrupt);
            }
        }

        self.environment = previous;

        Ok(())
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Exec<()> {
        let superclass_value: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),

                _ => {
                    let line = match expr {
                        Expr::Variable { name, .. } => name.line,
                        _ => name.line,
                    };

                    return Err(LoxError::runtime(line, "Superclass must be a class.").into());
                }
            },

            None => None,
        };

        // The class name is defined up front with a placeholder so methods
        // can refer to the class being declared.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let mut class_env = Rc::clone(&self.environment);
        if let Some(ref superclass) = superclass_value {
            class_env = Rc::new(RefCell::new(Environment::with_enclosing(class_env)));
            class_env
                .borrow_mut()
                .define("super", Value::Class(Rc::clone(superclass)));
        }

        let mut method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();
        for method in methods {
            let function = LoxFunction {
                declaration: Rc::clone(method),
                closure: Rc::clone(&class_env),
                is_initializer: method.name.lexeme == "init",
            };

            method_map.insert(method.name.lexeme.clone(), Rc::new(function));
        }

        let class = LoxClass {
            name: name.lexeme.clone(),
            superclass: superclass_value,
            methods: method_map,
        };

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, Value::Class(Rc::new(class)), name.line)?;

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    fn evaluate(&mut self, expr: &Expr) -> Exec<Value> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.evaluate_logical(left, operator, right),

            Expr::Variable { id, name } => Ok(self.look_up_variable(name, *id)?),

            Expr::This { id, keyword } => Ok(self.look_up_variable(keyword, *id)?),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => Environment::assign_at(
                        &self.environment,
                        *distance,
                        &name.lexeme,
                        value.clone(),
                        name.line,
                    )?,

                    None => {
                        self.globals
                            .borrow_mut()
                            .assign(&name.lexeme, value.clone(), name.line)?
                    }
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value = self.evaluate(callee)?;

                let mut argument_values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    argument_values.push(self.evaluate(argument)?);
                }

                self.call_value(callee_value, argument_values, paren)
            }

            Expr::Get { object, name } => self.evaluate_get(object, name),

            Expr::Set {
                object,
                name,
                value,
            } => self.evaluate_set(object, name, value),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token, right: &Expr) -> Exec<Value> {
        let value: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match value {
                Value::Number(n) => Ok(Value::Number(-n)),

                _ => Err(LoxError::runtime(operator.line, "Operand must be a number.").into()),
            },

            TokenType::BANG => Ok(Value::Bool(!is_truthy(&value))),

            _ => unreachable!("parser only emits '!' and '-' unary operators"),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Exec<Value> {
        let left_val: Value = self.evaluate(left)?;
        let right_val: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(LoxError::runtime(
                    operator.line,
                    "Operands must be two numbers or two strings.",
                )
                .into()),
            },

            TokenType::MINUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::STAR => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::SLASH => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            TokenType::LESS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::LESS_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::GREATER => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),

                _ => Err(numbers_expected(operator)),
            },

            TokenType::GREATER_EQUAL => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),

                _ => Err(numbers_expected(operator)),
            },

            _ => unreachable!("parser only emits arithmetic and comparison binary operators"),
        }
    }

    fn evaluate_logical(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Exec<Value> {
        let left_val: Value = self.evaluate(left)?;

        match operator.token_type {
            TokenType::OR => {
                if is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            TokenType::AND => {
                if !is_truthy(&left_val) {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            _ => unreachable!("parser only emits 'or' and 'and' logical operators"),
        }
    }

    fn evaluate_get(&mut self, object: &Expr, name: &Token) -> Exec<Value> {
        let object_value = self.evaluate(object)?;

        match object_value {
            Value::Instance(ref instance) => {
                Instance::get(instance, &name.lexeme).ok_or_else(|| {
                    LoxError::runtime(
                        name.line,
                        format!("Undefined property '{}'.", name.lexeme),
                    )
                    .into()
                })
            }

            Value::List(ref list) => match ListOp::from_name(&name.lexeme) {
                Some(op) => Ok(Value::ListMethod(Rc::new(BoundListMethod {
                    list: Rc::clone(list),
                    op,
                }))),

                None => Err(LoxError::runtime(
                    name.line,
                    format!("Undefined property '{}'.", name.lexeme),
                )
                .into()),
            },

            _ => Err(LoxError::runtime(name.line, "Only instances have properties.").into()),
        }
    }

    fn evaluate_set(&mut self, object: &Expr, name: &Token, value: &Expr) -> Exec<Value> {
        let object_value = self.evaluate(object)?;

        match object_value {
            Value::Instance(instance) => {
                let value = self.evaluate(value)?;

                instance
                    .borrow_mut()
                    .fields
                    .insert(name.lexeme.clone(), value.clone());

                Ok(value)
            }

            Value::List(_) | Value::ListMethod(_) => Err(LoxError::runtime(
                name.line,
                "Can't set properties on a native instance.",
            )
            .into()),

            _ => Err(LoxError::runtime(name.line, "Only instances have fields.").into()),
        }
    }

    fn evaluate_super(&mut self, id: usize, keyword: &Token, method: &Token) -> Exec<Value> {
        let distance = *self
            .locals
            .get(&id)
            .expect("resolver records a distance for every 'super'");

        let superclass = Environment::get_at(&self.environment, distance, "super", keyword.line)?;
        let instance = Environment::get_at(&self.environment, distance - 1, "this", keyword.line)?;

        let Value::Class(superclass) = superclass else {
            unreachable!("'super' always binds a class value");
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),

            None => Err(LoxError::runtime(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            )
            .into()),
        }
    }

    fn look_up_variable(&self, name: &Token, id: usize) -> Result<Value> {
        match self.locals.get(&id) {
            Some(distance) => {
                Environment::get_at(&self.environment, *distance, &name.lexeme, name.line)
            }

            None => self.globals.borrow().get(&name.lexeme, name.line),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Call dispatch
    // ─────────────────────────────────────────────────────────────────────

    fn call_value(&mut self, callee: Value, arguments: Vec<Value>, paren: &Token) -> Exec<Value> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;

                self.call_function(&function, arguments)
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;

                self.construct(class, arguments)
            }

            Value::Native(native) => {
                check_arity(native.arity, arguments.len(), paren)?;

                (native.func)(&arguments)
                    .map_err(|msg| LoxError::runtime(paren.line, msg).into())
            }

            Value::ListMethod(method) => {
                check_arity(method.op.arity(), arguments.len(), paren)?;

                method
                    .call(&arguments)
                    .map_err(|msg| LoxError::runtime(paren.line, msg).into())
            }

            _ => {
                Err(LoxError::runtime(paren.line, "Can only call functions and classes.").into())
            }
        }
    }

    fn call_function(&mut self, function: &LoxFunction, arguments: Vec<Value>) -> Exec<Value> {
        let environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &function.closure,
        ))));

        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        match self.execute_block(&function.declaration.body, environment) {
            // An initializer always evaluates to the instance, even on an
            // early bare `return`.
            Ok(()) | Err(Interrupt::Return(_)) if function.is_initializer => {
                Ok(self.initializer_this(function)?)
            }

            Ok(()) => Ok(Value::Nil),

            Err(Interrupt::Return(value)) => Ok(value),

            Err(err) => Err(err),
        }
    }

    fn construct(&mut self, class: Rc<LoxClass>, arguments: Vec<Value>) -> Exec<Value> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));

        if let Some(initializer) = class.find_method("init") {
            let bound = initializer.bind(Value::Instance(Rc::clone(&instance)));
            self.call_function(&bound, arguments)?;
        }

        Ok(Value::Instance(instance))
    }

    fn initializer_this(&self, function: &LoxFunction) -> Result<Value> {
        Environment::get_at(
            &function.closure,
            0,
            "this",
            function.declaration.name.line,
        )
    }
}

fn literal_value(lit: &LiteralValue) -> Value {
    match lit {
        LiteralValue::True => Value::Bool(true),

        LiteralValue::False => Value::Bool(false),

        LiteralValue::Nil => Value::Nil,

        LiteralValue::Number(n) => Value::Number(*n),

        LiteralValue::Str(s) => Value::String(s.clone()),
    }
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Exec<()> {
    if expected != got {
        return Err(LoxError::runtime(
            paren.line,
            format!("Expected {} arguments but got {}.", expected, got),
        )
        .into());
    }

    Ok(())
}

fn numbers_expected(operator: &Token) -> Interrupt {
    LoxError::runtime(operator.line, "Operands must be numbers.").into()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Nil => false,

        Value::Bool(b) => *b,

        _ => true,
    }
}
