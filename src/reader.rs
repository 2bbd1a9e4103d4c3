use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till, take_while1},
    character::complete::char,
    combinator::{cut, value},
    error::ErrorKind,
    multi::{many0, many0_count},
    sequence::preceded,
};

use crate::ast::{Map, MapKey, NumberType, Symbol, Value, sym};
use crate::{Error, MAX_PARSE_DEPTH, ParseError, ParseErrorKind, STACK_GROWTH, STACK_RED_ZONE};

/// Characters that end a symbol or number token.
const DELIMITERS: &str = "[]{}()'\"`,;";

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || DELIMITERS.contains(c)
}

fn fail<T>(input: &str, code: ErrorKind) -> IResult<&str, T> {
    Err(nom::Err::Failure(nom::error::Error::new(input, code)))
}

/// Convert nom parsing errors to structured reader errors
fn parse_error_from_nom(input: &str, error: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let e = match error {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => {
            return ParseError::from_message(ParseErrorKind::Incomplete, "unexpected EOF");
        }
    };

    let position = input.len().saturating_sub(e.input.len());
    let offset = input.get(..position).map_or(0, |s| s.chars().count());
    let at_end = e.input.is_empty();

    let (kind, message) = match e.code {
        ErrorKind::TooLarge => (
            ParseErrorKind::TooDeeplyNested,
            format!("expression too deeply nested (max depth: {MAX_PARSE_DEPTH})"),
        ),
        ErrorKind::Digit => (
            ParseErrorKind::ImplementationLimit,
            format!("integer literal out of range at position {position}"),
        ),
        ErrorKind::Escaped => (
            ParseErrorKind::InvalidSyntax,
            format!("invalid escape sequence in string at position {position}"),
        ),
        ErrorKind::Count => (
            ParseErrorKind::InvalidSyntax,
            "map literal must have an even number of forms".to_owned(),
        ),
        ErrorKind::Verify => (
            ParseErrorKind::InvalidSyntax,
            "map keys must be strings, keywords or numbers".to_owned(),
        ),
        _ if at_end => (
            ParseErrorKind::Incomplete,
            "unexpected EOF, input is unbalanced".to_owned(),
        ),
        _ => {
            let found: String = e.input.chars().take(1).collect();
            (
                ParseErrorKind::InvalidSyntax,
                format!("unexpected '{found}' at position {position}"),
            )
        }
    };

    ParseError::with_context(kind, message, input, offset)
}

/// Skip whitespace, commas and `;` comments
fn skip_ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            take_while1(|c: char| c.is_whitespace() || c == ','),
            preceded(char(';'), take_till(|c: char| c == '\n')),
        ))),
    )
    .parse(input)
}

/// Classify a bare token: integer, `nil`/`true`/`false`, keyword or symbol
fn parse_atom(input: &str) -> IResult<&str, Value> {
    let (remaining, token) = take_while1(|c: char| !is_delimiter(c)).parse(input)?;

    let digits = token.strip_prefix('-').unwrap_or(token);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return match token.parse::<NumberType>() {
            Ok(n) => Ok((remaining, Value::Number(n))),
            Err(_) => fail(input, ErrorKind::Digit),
        };
    }

    let atom = match token {
        "nil" => Value::Nil,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match token.strip_prefix(':') {
            Some(name) => Value::Keyword(Symbol::intern(name)),
            None => Value::Symbol(Symbol::intern(token)),
        },
    };
    Ok((remaining, atom))
}

/// Parse a string literal
fn parse_string(input: &str) -> IResult<&str, Value> {
    let (mut remaining, _) = char('"').parse(input)?;
    let mut text = String::new();

    loop {
        let mut char_iter = remaining.chars();
        match char_iter.next() {
            Some('"') => return Ok((char_iter.as_str(), Value::from(text))),
            Some('\\') => {
                match char_iter.next() {
                    Some('n') => text.push('\n'),
                    Some('\\') => text.push('\\'),
                    Some('"') => text.push('"'),
                    Some(_) => return fail(remaining, ErrorKind::Escaped),
                    // Backslash at end of input
                    None => return fail(char_iter.as_str(), ErrorKind::Eof),
                }
                remaining = char_iter.as_str();
            }
            Some(ch) => {
                text.push(ch);
                remaining = char_iter.as_str();
            }
            None => return fail(remaining, ErrorKind::Eof),
        }
    }
}

/// Parse forms up to the `close` delimiter, after `open` has matched
fn parse_delimited(
    input: &str,
    open: char,
    close: char,
    depth: usize,
) -> IResult<&str, Vec<Value>> {
    let (input, _) = char(open).parse(input)?;
    let (input, items) = many0(preceded(skip_ws, |i| parse_form(i, depth + 1))).parse(input)?;
    let (input, _) = skip_ws(input)?;
    let (input, _) = cut(char(close)).parse(input)?;
    Ok((input, items))
}

fn parse_list(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, items) = parse_delimited(input, '(', ')', depth)?;
    Ok((input, Value::list(items)))
}

fn parse_vector(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, items) = parse_delimited(input, '[', ']', depth)?;
    Ok((input, Value::vector(items)))
}

fn parse_map(input: &str, depth: usize) -> IResult<&str, Value> {
    let start = input;
    let (input, items) = parse_delimited(input, '{', '}', depth)?;
    if items.len() % 2 != 0 {
        return fail(start, ErrorKind::Count);
    }

    let mut entries = Map::new();
    for pair in items.chunks_exact(2) {
        let Ok(key) = MapKey::try_from(&pair[0]) else {
            return fail(start, ErrorKind::Verify);
        };
        entries.insert(key, pair[1].clone());
    }
    Ok((input, Value::map(entries)))
}

/// Parse `'x`, `` `x ``, `~x`, `~@x` and `@x` into their long forms
fn parse_reader_macro(input: &str, depth: usize) -> IResult<&str, Value> {
    let (input, name) = alt((
        value("quote", char('\'')),
        value("quasiquote", char('`')),
        value("splice-unquote", tag("~@")),
        value("unquote", char('~')),
        value("deref", char('@')),
    ))
    .parse(input)?;
    let (input, form) = cut(|i| parse_form(i, depth + 1)).parse(input)?;
    Ok((input, Value::list(vec![sym(name), form])))
}

/// Parse one form, skipping leading whitespace
fn parse_form(input: &str, depth: usize) -> IResult<&str, Value> {
    if depth >= MAX_PARSE_DEPTH {
        return fail(input, ErrorKind::TooLarge);
    }
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
        let (input, _) = skip_ws(input)?;
        if input.is_empty() {
            return fail(input, ErrorKind::Eof);
        }
        alt((
            |i| parse_reader_macro(i, depth),
            |i| parse_list(i, depth),
            |i| parse_vector(i, depth),
            |i| parse_map(i, depth),
            parse_string,
            parse_atom,
        ))
        .parse(input)
    })
}

/// Read exactly one form from `input`.
///
/// Whitespace and comments around the form are ignored; input holding no form
/// fails with [`ParseErrorKind::Empty`] and anything after the form with
/// [`ParseErrorKind::TrailingContent`].
pub fn read_str(input: &str) -> Result<Value, Error> {
    let to_error =
        |e: nom::Err<nom::error::Error<&str>>| Error::ParseError(parse_error_from_nom(input, e));

    let (rest, _) = skip_ws(input).map_err(to_error)?;
    if rest.is_empty() {
        return Err(ParseError::from_message(ParseErrorKind::Empty, "no form in input").into());
    }

    let (rest, form) = parse_form(rest, 0).map_err(to_error)?;
    let (rest, _) = skip_ws(rest).map_err(to_error)?;
    if !rest.is_empty() {
        let position = input.len() - rest.len();
        let offset = input.get(..position).map_or(0, |s| s.chars().count());
        return Err(ParseError::with_context(
            ParseErrorKind::TrailingContent,
            format!("unexpected trailing input: '{}'", rest.trim_end()),
            input,
            offset,
        )
        .into());
    }
    Ok(form)
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{kw, nil, val};
    use maplit::btreemap;
    use pretty_assertions::assert_eq;

    /// Test result variants for parsing tests
    #[derive(Debug)]
    enum ParseTestResult {
        Success(Value),               // Parsing should succeed with this value
        Printed(&'static str),        // Parsing should succeed and print like this
        Failure(ParseErrorKind),      // Parsing should fail with this kind
        SpecificError(&'static str),  // Parsing should fail with error containing this string
    }
    use ParseTestResult::*;

    fn success<T: Into<Value>>(value: T) -> ParseTestResult {
        Success(value.into())
    }

    fn run_parse_tests(test_cases: Vec<(&str, ParseTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Parse test #{}", i + 1);
            match (read_str(input), expected) {
                (Ok(actual), Success(expected_val)) => {
                    assert_eq!(&actual, expected_val, "{test_id}: {input}");
                }
                (Ok(actual), Printed(text)) => {
                    assert_eq!(actual.to_string(), *text, "{test_id}: {input}");
                }
                (Err(Error::ParseError(err)), Failure(kind)) => {
                    assert_eq!(err.kind, *kind, "{test_id}: {input} ({err})");
                }
                (Err(err), SpecificError(text)) => {
                    let message = err.to_string();
                    assert!(
                        message.contains(text),
                        "{test_id}: error for '{input}' should contain '{text}', got: {message}"
                    );
                }
                (result, expected) => {
                    panic!("{test_id}: '{input}' gave {result:?}, expected {expected:?}");
                }
            }
        }
    }

    #[test]
    fn test_atoms() {
        run_parse_tests(vec![
            ("42", success(42)),
            ("-17", success(-17)),
            ("0", success(0)),
            ("9223372036854775807", success(NumberType::MAX)),
            ("-9223372036854775808", success(NumberType::MIN)),
            ("nil", Success(Value::Nil)),
            ("true", success(true)),
            ("false", success(false)),
            (":kw", Success(kw("kw"))),
            ("abc", Success(sym("abc"))),
            ("-", Success(sym("-"))),
            ("-abc", Success(sym("-abc"))),
            ("1abc", Success(sym("1abc"))),
            ("->>", Success(sym("->>"))),
            ("*host-language*", Success(sym("*host-language*"))),
            ("nil?", Success(sym("nil?"))),
            ("a~b@c", Success(sym("a~b@c"))),
        ]);
    }

    #[test]
    fn test_strings() {
        run_parse_tests(vec![
            ("\"\"", success("")),
            ("\"abc\"", success("abc")),
            ("\"a\\nb\"", success("a\nb")),
            ("\"q\\\"q\"", success("q\"q")),
            ("\"back\\\\slash\"", success("back\\slash")),
            ("\"with ; semicolon\"", success("with ; semicolon")),
            ("\"multi\nline\"", success("multi\nline")),
            ("\"abc", Failure(ParseErrorKind::Incomplete)),
            ("\"abc\\", Failure(ParseErrorKind::Incomplete)),
            ("\"\\t\"", Failure(ParseErrorKind::InvalidSyntax)),
            ("\"abc", SpecificError("EOF")),
        ]);
    }

    #[test]
    fn test_collections() {
        run_parse_tests(vec![
            ("()", Success(nil())),
            ("(1 2 3)", success([1, 2, 3])),
            ("( 1 , 2 ,3 )", success([1, 2, 3])),
            ("[1 \"a\" :b]", Printed("[1 \"a\" :b]")),
            ("[]", Success(Value::vector(vec![]))),
            ("(+ 1 (* 2 3))", Printed("(+ 1 (* 2 3))")),
            ("{}", Success(Value::map(Map::new()))),
            (
                "{\"a\" 1 :b [2]}",
                Success(Value::map(btreemap! {
                    MapKey::String("a".into()) => val(1),
                    MapKey::Keyword(Symbol::intern("b")) => Value::vector(vec![val(2)]),
                })),
            ),
            ("{1 one}", Printed("{1 one}")),
            ("{:a 1 :a 2}", Printed("{:a 2}")),
            ("{:a}", Failure(ParseErrorKind::InvalidSyntax)),
            ("{a 1}", SpecificError("map keys")),
        ]);
    }

    #[test]
    fn test_unbalanced_input() {
        run_parse_tests(vec![
            ("(1 2", Failure(ParseErrorKind::Incomplete)),
            ("[1 [2]", Failure(ParseErrorKind::Incomplete)),
            ("{:a 1", Failure(ParseErrorKind::Incomplete)),
            ("(1 2", SpecificError("unbalanced")),
            ("'", Failure(ParseErrorKind::Incomplete)),
            ("(1 ; comment )", Failure(ParseErrorKind::Incomplete)),
            ("(1]", Failure(ParseErrorKind::InvalidSyntax)),
            (")", Failure(ParseErrorKind::InvalidSyntax)),
            ("1)", Failure(ParseErrorKind::TrailingContent)),
            ("1 2", Failure(ParseErrorKind::TrailingContent)),
        ]);
    }

    #[test]
    fn test_reader_macros() {
        run_parse_tests(vec![
            ("'a", Success(val([sym("quote"), sym("a")]))),
            ("'(1 2)", Printed("(quote (1 2))")),
            ("`(1 ~a ~@b)", Printed("(quasiquote (1 (unquote a) (splice-unquote b)))")),
            ("@x", Success(val([sym("deref"), sym("x")]))),
            ("' a", Success(val([sym("quote"), sym("a")]))),
            ("''a", Printed("(quote (quote a))")),
            ("~@[1]", Printed("(splice-unquote [1])")),
        ]);
    }

    #[test]
    fn test_whitespace_and_comments() {
        run_parse_tests(vec![
            ("  42  ", success(42)),
            ("; leading comment\n42", success(42)),
            ("42 ; trailing comment", success(42)),
            ("(1 ; inner\n 2)", success([1, 2])),
            (",,,7,,,", success(7)),
            ("", Failure(ParseErrorKind::Empty)),
            ("   ", Failure(ParseErrorKind::Empty)),
            ("; only a comment", Failure(ParseErrorKind::Empty)),
        ]);
    }

    #[test]
    fn test_limits() {
        run_parse_tests(vec![
            ("9223372036854775808", Failure(ParseErrorKind::ImplementationLimit)),
            ("(1 99999999999999999999)", Failure(ParseErrorKind::ImplementationLimit)),
        ]);

        let nested_ok = format!("{}{}", "(".repeat(100), ")".repeat(100));
        assert!(read_str(&nested_ok).is_ok());

        let too_deep = format!(
            "{}{}",
            "(".repeat(MAX_PARSE_DEPTH + 1),
            ")".repeat(MAX_PARSE_DEPTH + 1)
        );
        let Err(Error::ParseError(err)) = read_str(&too_deep) else {
            panic!("expected nesting error");
        };
        assert_eq!(err.kind, ParseErrorKind::TooDeeplyNested);
    }

    #[test]
    fn test_error_context() {
        let Err(Error::ParseError(err)) = read_str("(+ 1 ]") else {
            panic!("expected parse error");
        };
        assert_eq!(err.found.as_deref(), Some("]"));
        assert!(err.context.unwrap().contains("(+ 1 ]"));
    }

    #[test]
    fn test_round_trip_through_printer() {
        let inputs = [
            "(1 \"two\\n\" :three [4 {\"k\" nil}] true)",
            "(quote (a b))",
            "[]",
            "{:a (1 2) :b \"\\\"\"}",
        ];
        for input in inputs {
            let first = read_str(input).unwrap();
            let second = read_str(&first.to_string()).unwrap();
            assert_eq!(first, second, "round trip of {input}");
            assert_eq!(first.to_string(), input);
        }
    }
}
