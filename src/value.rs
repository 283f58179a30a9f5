use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::native::{BoundListMethod, ListInstance, NativeFunction};
use crate::parser::FunctionDecl;

/// A Lox runtime value.  Primitives compare by value; functions, classes
/// and instances compare by identity (`Rc::ptr_eq`).
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Native(Rc<NativeFunction>),
    Instance(Rc<RefCell<Instance>>),
    List(Rc<ListInstance>),
    ListMethod(Rc<BoundListMethod>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,

            (Value::Bool(a), Value::Bool(b)) => a == b,

            (Value::Number(a), Value::Number(b)) => a == b,

            (Value::String(a), Value::String(b)) => a == b,

            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),

            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),

            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),

            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),

            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),

            (Value::ListMethod(a), Value::ListMethod(b)) => Rc::ptr_eq(a, b),

            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::Function(func) => write!(f, "<fn {}>", func.name()),

            Value::Class(class) => write!(f, "{} class", class.name),

            Value::Native(native) => write!(f, "{}", native),

            Value::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class.name)
            }

            Value::List(_) => write!(f, "list instance"),

            Value::ListMethod(_) => write!(f, "<native fn>"),
        }
    }
}

/// A user-declared function together with the environment that was active
/// where it was declared.
pub struct LoxFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl LoxFunction {
    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Re-bind `this`: a fresh function whose closure has a one-scope
    /// wrapper defining `this` as the given instance.
    pub fn bind(&self, instance: Value) -> LoxFunction {
        let env = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &self.closure,
        ))));
        env.borrow_mut().define("this", instance);

        LoxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: env,
            is_initializer: self.is_initializer,
        }
    }
}

// Closures reference their environments which may reference the function
// again; keep Debug shallow so the cycle is never walked.
impl fmt::Debug for LoxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

/// A class: immutable method table, optional superclass.  Classes are
/// callable; calling one constructs an instance.
pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    pub methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    /// Method lookup walks the inheritance chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// A class's arity is its initializer's, or zero without one.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|s| s.name.clone()),
            )
            .finish()
    }
}

/// An instance: a class reference plus mutable fields, created on first
/// assignment.
pub struct Instance {
    pub class: Rc<LoxClass>,
    pub fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Instance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property access: fields shadow methods; a method is returned
    /// freshly bound to this instance.
    pub fn get(instance: &Rc<RefCell<Instance>>, name: &str) -> Option<Value> {
        if let Some(value) = instance.borrow().fields.get(name) {
            return Some(value.clone());
        }

        let class = Rc::clone(&instance.borrow().class);
        class
            .find_method(name)
            .map(|method| Value::Function(Rc::new(method.bind(Value::Instance(Rc::clone(instance))))))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .finish()
    }
}
