//! Native (host-provided) callables: `clock` and the `list` constructor.
//!
//! Natives return `Result<Value, String>`; the call site in the
//! interpreter attaches the line of the call's closing parenthesis when
//! converting a message into a runtime error.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::value::Value;

/// A host function exposed to Lox programs.
#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value, String>,
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `list` constructs instances, so it prints as a class.
        if self.name == "list" {
            write!(f, "<native class>")
        } else {
            write!(f, "<native fn>")
        }
    }
}

pub fn clock_native(_args: &[Value]) -> Result<Value, String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

pub fn list_native(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::List(Rc::new(ListInstance::default())))
}

/// The backing store of a `list()` instance.  Fields cannot be set on it;
/// property access yields one-shot bound methods instead.
#[derive(Default)]
pub struct ListInstance {
    items: RefCell<Vec<Value>>,
}

impl ListInstance {
    fn render(&self) -> String {
        let parts: Vec<String> = self
            .items
            .borrow()
            .iter()
            .map(|item| item.to_string())
            .collect();

        format!("[{}]", parts.join(", "))
    }
}

// A list may contain itself; keep Debug shallow.
impl fmt::Debug for ListInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListInstance")
            .field("len", &self.items.borrow().len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOp {
    Add,
    Clear,
    Get,
    Length,
    Remove,
    Set,
    ToString,
}

impl ListOp {
    pub fn from_name(name: &str) -> Option<ListOp> {
        match name {
            "add" => Some(ListOp::Add),
            "clear" => Some(ListOp::Clear),
            "get" => Some(ListOp::Get),
            "length" => Some(ListOp::Length),
            "remove" => Some(ListOp::Remove),
            "set" => Some(ListOp::Set),
            "toString" => Some(ListOp::ToString),
            _ => None,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            ListOp::Add | ListOp::Get | ListOp::Remove => 1,
            ListOp::Set => 2,
            ListOp::Clear | ListOp::Length | ListOp::ToString => 0,
        }
    }
}

/// A list method already bound to its instance, produced by property
/// access and consumed by a call.
#[derive(Debug)]
pub struct BoundListMethod {
    pub list: Rc<ListInstance>,
    pub op: ListOp,
}

impl BoundListMethod {
    /// Mutating methods return the instance so calls can chain.
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        match self.op {
            ListOp::Add => {
                self.list.items.borrow_mut().push(args[0].clone());
                Ok(Value::List(Rc::clone(&self.list)))
            }

            ListOp::Clear => {
                self.list.items.borrow_mut().clear();
                Ok(Value::List(Rc::clone(&self.list)))
            }

            ListOp::Get => {
                let items = self.list.items.borrow();
                let index = checked_index(&args[0], items.len())?;
                Ok(items[index].clone())
            }

            ListOp::Length => Ok(Value::Number(self.list.items.borrow().len() as f64)),

            ListOp::Remove => {
                let mut items = self.list.items.borrow_mut();
                let index = checked_index(&args[0], items.len())?;
                items.remove(index);
                Ok(Value::List(Rc::clone(&self.list)))
            }

            ListOp::Set => {
                let mut items = self.list.items.borrow_mut();
                let index = checked_index(&args[0], items.len())?;
                items[index] = args[1].clone();
                Ok(Value::List(Rc::clone(&self.list)))
            }

            ListOp::ToString => Ok(Value::String(self.list.render())),
        }
    }
}

// Fractional, negative and non-number indexes are all "not an integer";
// only a well-formed index past the end is "out of range".
fn checked_index(value: &Value, len: usize) -> Result<usize, String> {
    let n = match value {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => *n,
        _ => return Err("Index must be an integer.".to_string()),
    };

    if n >= len as f64 {
        return Err("Index out of range.".to_string());
    }

    Ok(n as usize)
}
