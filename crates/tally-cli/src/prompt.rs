//! Line-oriented console input with re-prompting.
//!
//! Required fields are asked again until they are non-empty and parse.
//! Optional fields accept a blank line as "no change". End of input surfaces
//! as an `UnexpectedEof` I/O error so menus can treat it like "exit".

use std::io::{self, BufRead, Write};
use std::str::FromStr;

const EMPTY_FIELD: &str = "Error: Este campo no puede estar vacío.";
const BAD_INTEGER: &str = "Error: Ingrese un número entero válido.";
const BAD_DECIMAL: &str = "Error: Ingrese un número decimal válido (mayor o igual a 0).";

/// Reads answers from `input` and writes questions and notices to `output`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// The console output, for menus and reports.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// One trimmed line, possibly empty.
    pub fn line(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.output)?;
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(buf.trim().to_string())
    }

    /// Non-empty text.
    pub fn text(&mut self, question: &str) -> io::Result<String> {
        loop {
            let answer = self.line(question)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            writeln!(self.output, "{EMPTY_FIELD}")?;
        }
    }

    /// A non-negative whole number.
    pub fn integer<T: FromStr>(&mut self, question: &str) -> io::Result<T> {
        self.required(question, BAD_INTEGER, parse_integer)
    }

    /// A non-negative whole number, or `None` for a blank answer.
    pub fn optional_integer<T: FromStr>(&mut self, question: &str) -> io::Result<Option<T>> {
        self.optional(question, BAD_INTEGER, parse_integer)
    }

    /// A finite, non-negative decimal.
    pub fn decimal(&mut self, question: &str) -> io::Result<f64> {
        self.required(question, BAD_DECIMAL, parse_decimal)
    }

    /// A finite, non-negative decimal, or `None` for a blank answer.
    pub fn optional_decimal(&mut self, question: &str) -> io::Result<Option<f64>> {
        self.optional(question, BAD_DECIMAL, parse_decimal)
    }

    fn required<T>(
        &mut self,
        question: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<T> {
        loop {
            let answer = self.line(question)?;
            if answer.is_empty() {
                writeln!(self.output, "{EMPTY_FIELD}")?;
                continue;
            }
            match parse(&answer) {
                Some(value) => return Ok(value),
                None => writeln!(self.output, "{invalid}")?,
            }
        }
    }

    fn optional<T>(
        &mut self,
        question: &str,
        invalid: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> io::Result<Option<T>> {
        loop {
            let answer = self.line(question)?;
            if answer.is_empty() {
                return Ok(None);
            }
            match parse(&answer) {
                Some(value) => return Ok(Some(value)),
                None => writeln!(self.output, "{invalid}")?,
            }
        }
    }
}

fn parse_integer<T: FromStr>(text: &str) -> Option<T> {
    text.parse().ok()
}

fn parse_decimal(text: &str) -> Option<f64> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Whether `err` means the console input has ended.
pub fn is_end_of_input(err: &anyhow::Error) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(p: Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(p.into_output()).unwrap()
    }

    #[test]
    fn text_reprompts_until_non_empty() {
        let mut p = prompter("\n   \nWidget\n");
        assert_eq!(p.text("Nombre: ").unwrap(), "Widget");
        let out = output(p);
        assert_eq!(out.matches(EMPTY_FIELD).count(), 2);
        assert_eq!(out.matches("Nombre: ").count(), 3);
    }

    #[test]
    fn integer_rejects_garbage_and_negatives() {
        let mut p = prompter("abc\n-4\n2.5\n7\n");
        assert_eq!(p.integer::<u32>("Cantidad: ").unwrap(), 7);
        assert_eq!(output(p).matches(BAD_INTEGER).count(), 3);
    }

    #[test]
    fn decimal_rejects_negative_and_non_finite() {
        let mut p = prompter("-1\nNaN\ninf\n2.50\n");
        assert_eq!(p.decimal("Precio: ").unwrap(), 2.5);
        assert_eq!(output(p).matches(BAD_DECIMAL).count(), 3);
    }

    #[test]
    fn optional_blank_means_none() {
        let mut p = prompter("\nx\n12\n");
        assert_eq!(p.optional_integer::<u32>("Cantidad: ").unwrap(), None);
        assert_eq!(p.optional_integer::<u32>("Cantidad: ").unwrap(), Some(12));
        assert!(output(p).contains(BAD_INTEGER));
    }

    #[test]
    fn optional_decimal_accepts_value() {
        let mut p = prompter("3.75\n");
        assert_eq!(p.optional_decimal("Precio: ").unwrap(), Some(3.75));
    }

    #[test]
    fn end_of_input_is_reported() {
        let mut p = prompter("\n");
        let err = p.text("Nombre: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert!(is_end_of_input(&anyhow::Error::from(err)));
        assert!(!is_end_of_input(&anyhow::anyhow!("other")));
    }

    #[test]
    fn line_trims_whitespace() {
        let mut p = prompter("  5 \r\n");
        assert_eq!(p.line("> ").unwrap(), "5");
    }
}
