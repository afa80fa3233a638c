//! Translating command-line words into a Starlark call.
//!
//! `starish deploy.star deploy prod --region eu --dry_run` runs the script and then
//! calls `deploy("prod", region="eu", dry_run=True)`. Flag names are used verbatim as
//! keyword names.

/// Prefix marking a keyword argument.
pub const FLAG_PREFIX: &str = "--";

/// Build the source text of a call to `target` from command-line words.
///
/// - `["--", "(1, [2])"]` is passed through untouched: the result is `target(1, [2])`.
/// - `--key value` becomes `key="value"`.
/// - `--key` followed by another flag, or last, becomes `key=True`.
/// - Any other word, including a bare `--` outside passthrough, becomes a positional
///   string argument.
///
/// Values are always string literals; converting them is up to the called function.
/// No check is made that keywords follow positionals, the interpreter reports that
/// when the call is evaluated.
pub fn build(target: &str, args: &[String]) -> String {
    if let [marker, raw] = args {
        if marker == FLAG_PREFIX {
            return format!("{target}{raw}");
        }
    }

    let mut parts = Vec::new();
    let mut words = args.iter().peekable();
    while let Some(word) = words.next() {
        match word.strip_prefix(FLAG_PREFIX).filter(|key| !key.is_empty()) {
            Some(key) => match words.next_if(|next| !next.starts_with(FLAG_PREFIX)) {
                Some(value) => parts.push(format!("{key}={}", quote(value))),
                None => parts.push(format!("{key}=True")),
            },
            None => parts.push(quote(word)),
        }
    }
    format!("{target}({})", parts.join(", "))
}

/// Program that loads `target` from `file` and evaluates `call`.
pub fn program(file: &str, target: &str, call: &str) -> String {
    format!("load({}, {})\n{call}\n", quote(file), quote(target))
}

/// Render `s` as a double-quoted Starlark string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positionals_are_quoted() {
        assert_eq!(build("f", &words(&["1", "2"])), r#"f("1", "2")"#);
    }

    #[test]
    fn test_flag_with_value() {
        assert_eq!(build("f", &words(&["--x", "5"])), r#"f(x="5")"#);
    }

    #[test]
    fn test_trailing_flag_is_boolean() {
        assert_eq!(build("f", &words(&["--flag"])), "f(flag=True)");
    }

    #[test]
    fn test_flag_before_flag_is_boolean() {
        assert_eq!(
            build("f", &words(&["--verbose", "--level", "3"])),
            r#"f(verbose=True, level="3")"#
        );
    }

    #[test]
    fn test_raw_passthrough() {
        assert_eq!(build("f", &words(&["--", "(1,2)"])), "f(1,2)");
    }

    #[test]
    fn test_raw_marker_needs_exactly_two_words() {
        assert_eq!(
            build("f", &words(&["--", "(1,2)", "x"])),
            r#"f("--", "(1,2)", "x")"#
        );
    }

    #[test]
    fn test_bare_marker_elsewhere_is_positional() {
        assert_eq!(build("f", &words(&["--"])), r#"f("--")"#);
        assert_eq!(
            build("f", &words(&["--x", "--", "y"])),
            r#"f(x=True, "--", "y")"#
        );
    }

    #[test]
    fn test_no_arguments() {
        assert_eq!(build("f", &[]), "f()");
    }

    #[test]
    fn test_mixed_order_is_preserved() {
        assert_eq!(
            build("deploy", &words(&["--region", "eu", "prod", "--force"])),
            r#"deploy(region="eu", "prod", force=True)"#
        );
    }

    #[test]
    fn test_values_are_escaped() {
        assert_eq!(
            build("f", &words(&["say \"hi\"", "--path", "C:\\tmp\n"])),
            r#"f("say \"hi\"", path="C:\\tmp\n")"#
        );
    }

    #[test]
    fn test_program_loads_target() {
        assert_eq!(
            program("build.star", "f", "f()"),
            "load(\"build.star\", \"f\")\nf()\n"
        );
    }
}
