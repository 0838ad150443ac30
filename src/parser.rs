use crate::comparison::CmpOp;
use crate::criteria::Criteria;
use crate::errors::{Error, Result};
use crate::registry::Registry;
use crate::value::Value;

/// Parse an infix criteria expression against a registry, so function-call
/// syntax can build custom literals. Everything outside the supported
/// grammar fails here with a syntax error, never later at evaluation time.
pub(crate) fn parse_with(registry: &Registry, text: &str) -> Result<Criteria> {
    let mut p = Parser::new(text, registry);
    p.skip_ws();
    let term = p.parse_or()?;
    p.skip_ws();
    if !p.eof() {
        return Err(Error::Syntax("trailing input".into()));
    }
    into_criteria(term)
}

/// Reinterpret a whole string as a single literal: `True`, `-3`, `18.8`,
/// `'NY'`. Used by the context accessor as the fallback for unresolvable
/// string keys.
pub(crate) fn literal_from_str(s: &str) -> Option<Value> {
    let registry = Registry::default();
    let mut p = Parser::new(s, &registry);
    p.skip_ws();
    let value = match p.peek_char()? {
        '\'' | '"' => Value::Str(p.parse_quoted_string().ok()?),
        c if c == '-' || c.is_ascii_digit() => p.parse_number_literal().ok()?,
        _ => match p.parse_identifier().ok()?.as_str() {
            "True" => Value::Bool(true),
            "False" => Value::Bool(false),
            _ => return None,
        },
    };
    p.skip_ws();
    if p.eof() {
        Some(value)
    } else {
        None
    }
}

/// Intermediate parse result: a sub-expression is either already a
/// predicate, a bare value awaiting its role, or a tuple of candidates.
enum Term {
    Value(Value),
    Node(Criteria),
    Tuple(Vec<Value>),
}

/// A bare value in boolean position becomes a truthiness test.
fn into_criteria(term: Term) -> Result<Criteria> {
    match term {
        Term::Node(criteria) => Ok(criteria),
        Term::Value(value) => Criteria::literal(value).map_err(as_syntax),
        Term::Tuple(_) => Err(Error::Syntax("a tuple is not a criteria".into())),
    }
}

fn value_of(term: Term) -> Result<Value> {
    match term {
        Term::Value(value) => Ok(value),
        Term::Node(criteria) => Err(Error::Syntax(format!(
            "'{criteria}' is not supported as an operand"
        ))),
        Term::Tuple(_) => Err(Error::Syntax(
            "a tuple is not supported as an operand".into(),
        )),
    }
}

/// Construction failures inside the parser are grammar problems to the caller.
fn as_syntax(err: Error) -> Error {
    match err {
        Error::Construction(msg) => Error::Syntax(msg),
        other => other,
    }
}

struct Parser<'a> {
    s: &'a str,
    i: usize,
    registry: &'a Registry,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str, registry: &'a Registry) -> Self {
        Self { s, i: 0, registry }
    }

    // ---- grammar ----

    fn parse_or(&mut self) -> Result<Term> {
        let mut operands = vec![self.parse_and()?];
        loop {
            self.skip_ws();
            if !self.eat_word("or") {
                break;
            }
            operands.push(self.parse_and()?);
        }
        combine(operands, Connective::Or)
    }

    fn parse_and(&mut self) -> Result<Term> {
        let mut operands = vec![self.parse_not()?];
        loop {
            self.skip_ws();
            if !self.eat_word("and") {
                break;
            }
            operands.push(self.parse_not()?);
        }
        combine(operands, Connective::And)
    }

    fn parse_not(&mut self) -> Result<Term> {
        self.skip_ws();
        if self.eat_word("not") {
            let inner = self.parse_not()?;
            return Ok(Term::Node(Criteria::not(into_criteria(inner)?)));
        }
        self.parse_comparison()
    }

    /// One operand, optionally followed by a membership test or a chain of
    /// one or two comparison operators. Longer chains are unsupported.
    fn parse_comparison(&mut self) -> Result<Term> {
        let left = self.parse_operand()?;
        self.skip_ws();

        if self.eat_word("in") {
            return self.finish_membership(left, false);
        }
        if self.peek_word() == Some("not") {
            let mark = self.i;
            self.i += 3;
            self.skip_ws();
            if self.eat_word("in") {
                return self.finish_membership(left, true);
            }
            self.i = mark;
        }

        let Some(op1) = self.peek_cmp_op() else {
            return Ok(left);
        };
        self.consume_cmp_op(op1);
        let middle = self.parse_operand()?;
        self.skip_ws();

        let Some(op2) = self.peek_cmp_op() else {
            let node = Criteria::cmp(value_of(left)?, op1, value_of(middle)?).map_err(as_syntax)?;
            return Ok(Term::Node(node));
        };
        self.consume_cmp_op(op2);
        let upper = self.parse_operand()?;
        self.skip_ws();
        if self.peek_cmp_op().is_some() {
            return Err(Error::Syntax(
                "comparison chains with more than 2 operators are not supported".into(),
            ));
        }
        let node = Criteria::between_ops(
            value_of(left)?,
            op1,
            value_of(middle)?,
            op2,
            value_of(upper)?,
        )
        .map_err(as_syntax)?;
        Ok(Term::Node(node))
    }

    fn finish_membership(&mut self, left: Term, negated: bool) -> Result<Term> {
        let key = value_of(left)?;
        let candidates = match self.parse_operand()? {
            Term::Tuple(values) => values,
            Term::Value(value) => vec![value],
            Term::Node(criteria) => {
                return Err(Error::Syntax(format!(
                    "'{criteria}' is not supported as a membership candidate"
                )))
            }
        };
        let node = if negated {
            Criteria::not_in(key, candidates)
        } else {
            Criteria::is_in(key, candidates)
        };
        Ok(Term::Node(node.map_err(as_syntax)?))
    }

    fn parse_operand(&mut self) -> Result<Term> {
        self.skip_ws();
        match self.peek_char() {
            Some('\'') | Some('"') => Ok(Term::Value(Value::Str(self.parse_quoted_string()?))),
            Some('(') => self.parse_group(),
            Some(c) if c == '-' || c.is_ascii_digit() => {
                Ok(Term::Value(self.parse_number_literal()?))
            }
            Some(c) if c == '_' || c.is_ascii_alphabetic() => self.parse_word_operand(),
            _ => Err(Error::Syntax("operand expected".into())),
        }
    }

    fn parse_word_operand(&mut self) -> Result<Term> {
        let name = self.parse_identifier()?;
        match name.as_str() {
            "True" => return Ok(Term::Value(Value::Bool(true))),
            "False" => return Ok(Term::Value(Value::Bool(false))),
            "and" | "or" | "not" | "in" => {
                return Err(Error::Syntax(format!(
                    "keyword '{name}' is not a valid operand"
                )))
            }
            _ => {}
        }
        if self.peek_char() == Some('(') {
            return self.parse_call(name);
        }
        Ok(Term::Value(Value::Str(name)))
    }

    /// `(` opens either a tuple of candidates or a parenthesized boolean
    /// group; the first comma decides.
    fn parse_group(&mut self) -> Result<Term> {
        self.expect('(')?;
        self.skip_ws();
        if self.consume_char(')') {
            return Ok(Term::Tuple(Vec::new()));
        }
        let first = self.parse_or()?;
        self.skip_ws();
        if !self.consume_char(',') {
            self.expect(')')?;
            return Ok(first);
        }
        let mut values = vec![value_of(first)?];
        loop {
            self.skip_ws();
            if self.consume_char(')') {
                return Ok(Term::Tuple(values));
            }
            values.push(value_of(self.parse_or()?)?);
            self.skip_ws();
            if self.consume_char(',') {
                continue;
            }
            self.expect(')')?;
            return Ok(Term::Tuple(values));
        }
    }

    /// `name(arg, key=value)`: resolve the name through the registry and let
    /// the extension deserialize its own literal.
    fn parse_call(&mut self, name: String) -> Result<Term> {
        let Some(ext) = self.registry.get(&name) else {
            return Err(Error::Syntax(format!("'{name}' is not supported")));
        };
        self.expect('(')?;
        let mut args = Vec::new();
        let mut kwargs: Vec<(String, Value)> = Vec::new();
        self.skip_ws();
        if !self.consume_char(')') {
            loop {
                self.skip_ws();
                if let Some(kwarg) = self.try_parse_kwarg()? {
                    kwargs.push(kwarg);
                } else {
                    args.push(value_of(self.parse_operand()?)?);
                }
                self.skip_ws();
                if self.consume_char(',') {
                    self.skip_ws();
                    if self.consume_char(')') {
                        break;
                    }
                    continue;
                }
                self.expect(')')?;
                break;
            }
        }
        let custom = ext.deserialize(&args, &kwargs)?;
        Ok(Term::Value(Value::Custom(custom)))
    }

    /// Word lookahead for `key=value`; restores the cursor when the `=` is
    /// missing or is really a `==` comparison.
    fn try_parse_kwarg(&mut self) -> Result<Option<(String, Value)>> {
        let mark = self.i;
        if !matches!(self.peek_char(), Some(c) if c == '_' || c.is_ascii_alphabetic()) {
            return Ok(None);
        }
        let name = self.parse_identifier()?;
        self.skip_ws();
        if self.peek_char() == Some('=') && !self.peek_str("==") {
            self.i += 1;
            self.skip_ws();
            let value = value_of(self.parse_operand()?)?;
            return Ok(Some((name, value)));
        }
        self.i = mark;
        Ok(None)
    }

    fn peek_cmp_op(&self) -> Option<CmpOp> {
        let rest = &self.s[self.i..];
        if rest.starts_with("==") {
            Some(CmpOp::Eq)
        } else if rest.starts_with("!=") {
            Some(CmpOp::Ne)
        } else if rest.starts_with("<=") {
            Some(CmpOp::Le)
        } else if rest.starts_with(">=") {
            Some(CmpOp::Ge)
        } else if rest.starts_with('<') {
            Some(CmpOp::Lt)
        } else if rest.starts_with('>') {
            Some(CmpOp::Gt)
        } else {
            None
        }
    }

    fn consume_cmp_op(&mut self, op: CmpOp) {
        self.i += op.symbol().len();
    }

    // ---- cursor ----

    fn parse_identifier(&mut self) -> Result<String> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '_' || c.is_ascii_alphanumeric() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(Error::Syntax("identifier expected".into()));
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn parse_number_literal(&mut self) -> Result<Value> {
        let start = self.i;
        if self.peek_char() == Some('-') {
            self.i += 1;
        }
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        let mut is_float = false;
        if self.peek_char() == Some('.') {
            is_float = true;
            self.i += 1;
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.i += 1;
                } else {
                    break;
                }
            }
        }
        let s = &self.s[start..self.i];
        if s.is_empty() || s == "-" {
            return Err(Error::Syntax("number expected".into()));
        }
        if is_float {
            let x: f64 = s
                .parse()
                .map_err(|_| Error::Syntax(format!("bad float '{s}'")))?;
            Ok(Value::Float(x))
        } else {
            let i: i64 = s
                .parse()
                .map_err(|_| Error::Syntax(format!("bad integer '{s}'")))?;
            Ok(Value::Int(i))
        }
    }

    fn parse_quoted_string(&mut self) -> Result<String> {
        let quote = self
            .peek_char()
            .ok_or_else(|| Error::Syntax("string expected".into()))?;
        if quote != '\'' && quote != '"' {
            return Err(Error::Syntax("quoted string expected".into()));
        }
        self.i += 1;
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            self.i += c.len_utf8();
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                if let Some(nc) = self.peek_char() {
                    self.i += nc.len_utf8();
                    match nc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        _ => {
                            out.push('\\');
                            out.push(nc);
                        }
                    }
                } else {
                    break;
                }
            } else {
                out.push(c);
            }
        }
        Err(Error::Syntax("unterminated string".into()))
    }

    fn peek_word(&self) -> Option<&'a str> {
        let rest = &self.s[self.i..];
        let end = rest
            .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
            .unwrap_or(rest.len());
        if end == 0 {
            None
        } else {
            Some(&rest[..end])
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word() == Some(word) {
            self.i += word.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(Error::Syntax(format!("expected '{c}'")))
        }
    }

    fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn peek_str(&self, lit: &str) -> bool {
        self.s[self.i..].starts_with(lit)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.i += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

#[derive(Clone, Copy)]
enum Connective {
    And,
    Or,
}

/// Two operands make the binary form, three or more the n-ary one — the
/// flattened multi-operand source form stays observable through serialization.
fn combine(mut operands: Vec<Term>, kind: Connective) -> Result<Term> {
    if operands.len() == 1 {
        // not a connective at all; the single term keeps its role
        return match operands.pop() {
            Some(term) => Ok(term),
            None => Err(Error::Syntax("empty expression".into())),
        };
    }
    let many: Vec<Criteria> = operands
        .into_iter()
        .map(into_criteria)
        .collect::<Result<_>>()?;
    let node = if many.len() == 2 {
        let mut it = many.into_iter();
        match (it.next(), it.next()) {
            (Some(left), Some(right)) => match kind {
                Connective::And => Criteria::and(left, right),
                Connective::Or => Criteria::or(left, right),
            },
            _ => return Err(Error::Syntax("empty expression".into())),
        }
    } else {
        match kind {
            Connective::And => Criteria::all(many).map_err(as_syntax)?,
            Connective::Or => Criteria::any(many).map_err(as_syntax)?,
        }
    };
    Ok(Term::Node(node))
}
