#![allow(dead_code)]

// Test-side S-expression reader. The production crate consumes IR from an
// external parser; tests build that IR from a textual form so programs stay
// readable. `;` comments run to end of line.

use std::collections::VecDeque;
use std::rc::Rc;

use jsir::num_bigint::BigInt;
use jsir::{Cell, JSEnvPtr, JSError, Symbol, Value, evaluate_program, new_environment};

#[derive(Debug)]
enum Token {
    Open,
    Close,
    Atom(String),
    Str(String),
}

fn tokenize(src: &str) -> VecDeque<Token> {
    let mut tokens = VecDeque::new();
    let mut chars = src.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ';' => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => {
                chars.next();
                tokens.push_back(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push_back(Token::Close);
            }
            '"' => {
                chars.next();
                let mut s = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some('n') => s.push('\n'),
                            Some('t') => s.push('\t'),
                            Some(other) => s.push(other),
                            None => break,
                        },
                        other => s.push(other),
                    }
                }
                tokens.push_back(Token::Str(s));
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut atom = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' || c == ';' {
                        break;
                    }
                    atom.push(c);
                    chars.next();
                }
                tokens.push_back(Token::Atom(atom));
            }
        }
    }
    tokens
}

fn atom_value(atom: &str) -> Value {
    match atom {
        "null" => return Value::Null,
        "true" => return Value::Boolean(true),
        "false" => return Value::Boolean(false),
        _ => {}
    }
    if let Some(digits) = atom.strip_suffix('n')
        && let Ok(i) = digits.parse::<i128>()
    {
        return Value::BigInt(BigInt::from(i));
    }
    // numbers win over symbols; anything unparseable is a name
    if atom.parse::<f64>().is_ok() && atom.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.') {
        if let Ok(n) = atom.parse::<f64>() {
            // a lone sign is an operator symbol, not a number
            if atom != "-" && atom != "+" {
                return Value::Number(n);
            }
        }
    }
    Value::Symbol(Symbol::intern(atom))
}

fn parse_form(tokens: &mut VecDeque<Token>) -> Value {
    match tokens.pop_front() {
        Some(Token::Open) => {
            let mut items = Vec::new();
            loop {
                match tokens.front() {
                    Some(Token::Close) => {
                        tokens.pop_front();
                        break;
                    }
                    Some(_) => items.push(parse_form(tokens)),
                    None => panic!("unterminated list"),
                }
            }
            match Cell::list(items) {
                Some(list) => Value::Cell(list),
                None => Value::Null, // () is the empty marker
            }
        }
        Some(Token::Close) => panic!("unexpected )"),
        Some(Token::Atom(atom)) => atom_value(&atom),
        Some(Token::Str(s)) => Value::str(&s),
        None => panic!("unexpected end of input"),
    }
}

/// Read a whole program: a list of top-level statement forms.
pub fn parse_program(src: &str) -> Option<Rc<Cell>> {
    let mut tokens = tokenize(src);
    let mut forms = Vec::new();
    while !tokens.is_empty() {
        forms.push(parse_form(&mut tokens));
    }
    Cell::list(forms)
}

pub fn run(src: &str) -> Result<Value, JSError> {
    let env = new_environment(None, false);
    evaluate_program(parse_program(src).as_ref(), &env)
}

pub fn run_with_env(src: &str, env: &JSEnvPtr) -> Result<Value, JSError> {
    evaluate_program(parse_program(src).as_ref(), env)
}

pub fn eval_number(src: &str) -> f64 {
    match run(src) {
        Ok(Value::Number(n)) => n,
        other => panic!("expected a number, got {other:?}"),
    }
}

pub fn eval_string(src: &str) -> String {
    match run(src) {
        Ok(Value::String(s)) => s.to_string(),
        other => panic!("expected a string, got {other:?}"),
    }
}

pub fn eval_bool(src: &str) -> bool {
    match run(src) {
        Ok(Value::Boolean(b)) => b,
        other => panic!("expected a boolean, got {other:?}"),
    }
}

pub fn eval_bigint(src: &str) -> BigInt {
    match run(src) {
        Ok(Value::BigInt(b)) => b,
        other => panic!("expected a bigint, got {other:?}"),
    }
}

/// The `name` property of the error object behind an expected throw that
/// escaped to the program boundary.
pub fn eval_uncaught_name(src: &str) -> String {
    match run(src) {
        Err(JSError::UncaughtThrow { value, .. }) => match &value {
            Value::Object(obj) => match jsir::obj_get_own(obj, "name") {
                Some(Value::String(name)) => name.to_string(),
                other => panic!("thrown object without a name: {other:?}"),
            },
            other => panic!("expected a thrown error object, got {other:?}"),
        },
        other => panic!("expected an uncaught throw, got {other:?}"),
    }
}
