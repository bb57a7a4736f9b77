//! Helper functions installed into every template.
//!
//! Each helper is available both as a Tera function and as a filter:
//!
//! ```text
//! {{ plural(word="example", count=n) }}   {{ "example" | plural(count=n) }}
//! {{ simpleformat(text=body) }}           {{ body | simpleformat }}
//! {{ mailto(email=address) }}             {{ address | mailto }}
//! ```

use std::collections::HashMap;

use tera::{Filter, Function, Result, Tera, Value};

/// Names of every installed helper.
pub const HELPER_NAMES: [&str; 3] = ["plural", "simpleformat", "mailto"];

/// Register every helper on `tera`.
pub(crate) fn install(tera: &mut Tera) {
    tera.register_function("plural", Plural);
    tera.register_filter("plural", Plural);
    tera.register_function("simpleformat", SimpleFormat);
    tera.register_filter("simpleformat", SimpleFormat);
    tera.register_function("mailto", MailTo);
    tera.register_filter("mailto", MailTo);
}

/// `word` unchanged when `count` is 1, otherwise `word` + `s`.
///
/// Irregular plurals are not handled.
pub fn pluralize(word: &str, count: i64) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// One escaped `<p>` per non-blank line.
pub fn simple_format(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", tera::escape_html(line)))
        .collect()
}

/// Script that writes a `mailto:` anchor client-side, percent-encoded so the
/// address never appears in the page source.
pub fn mailto(email: &str) -> String {
    let inner = format!("document.write('<a href=\"mailto:{email}\">{email}</a>');");
    let encoded: String = inner.bytes().map(|b| format!("%{b:02x}")).collect();
    format!(
        "<script type=\"text/javascript\">eval(decodeURIComponent('{encoded}'))</script>"
    )
}

fn str_arg<'a>(helper: &str, arg: &str, value: Option<&'a Value>) -> Result<&'a str> {
    value
        .ok_or_else(|| tera::Error::msg(format!("{helper} requires a `{arg}` argument")))?
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{helper} expects `{arg}` to be a string")))
}

fn count_arg(args: &HashMap<String, Value>) -> Result<i64> {
    args.get("count")
        .ok_or_else(|| tera::Error::msg("plural requires a `count` argument"))?
        .as_i64()
        .ok_or_else(|| tera::Error::msg("plural expects `count` to be an integer"))
}

struct Plural;

impl Function for Plural {
    fn call(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let word = str_arg("plural", "word", args.get("word"))?;
        Ok(Value::String(pluralize(word, count_arg(args)?)))
    }
}

impl Filter for Plural {
    fn filter(&self, value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
        let word = str_arg("plural", "word", Some(value))?;
        Ok(Value::String(pluralize(word, count_arg(args)?)))
    }
}

struct SimpleFormat;

impl Function for SimpleFormat {
    fn call(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let text = str_arg("simpleformat", "text", args.get("text"))?;
        Ok(Value::String(simple_format(text)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl Filter for SimpleFormat {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
        let text = str_arg("simpleformat", "text", Some(value))?;
        Ok(Value::String(simple_format(text)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct MailTo;

impl Function for MailTo {
    fn call(&self, args: &HashMap<String, Value>) -> Result<Value> {
        let email = str_arg("mailto", "email", args.get("email"))?;
        Ok(Value::String(mailto(email)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl Filter for MailTo {
    fn filter(&self, value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
        let email = str_arg("mailto", "email", Some(value))?;
        Ok(Value::String(mailto(email)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
