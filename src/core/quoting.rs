// src/core/quoting.rs

//! POSIX single-quote escaping for join mode.
//!
//! The output is meant for POSIX shells (`sh`, `bash`, `zsh`, `dash`, ...). PowerShell
//! quotes differently; arguments without embedded single quotes still come through intact,
//! anything with a `'` inside may not. That gap is accepted.

/// Wraps `arg` in single quotes, turning every embedded `'` into `'\''`.
pub fn quote(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    quoted.push_str(&arg.replace('\'', r"'\''"));
    quoted.push('\'');
    quoted
}

/// Quotes each argument independently and joins them with single spaces, preserving order.
pub fn join<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| quote(arg.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        let cases = [
            ("hello", "'hello'"),
            ("hello world", "'hello world'"),
            ("it's here", r"'it'\''s here'"),
            ("", "''"),
            ("$VAR", "'$VAR'"),
            ("a&b|c", "'a&b|c'"),
        ];
        for (input, expected) in cases {
            assert_eq!(quote(input), expected, "quote({:?})", input);
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(join::<&str>(&[]), "");
        assert_eq!(join(&["cmd"]), quote("cmd"));
        assert_eq!(join(&["echo", "hello world"]), "'echo' 'hello world'");
        assert_eq!(
            join(&["env", "echo", "it's fine"]),
            r"'env' 'echo' 'it'\''s fine'"
        );
    }

    #[test]
    fn test_quote_round_trips_through_posix_parsing() {
        let samples = ["", "'", "''", "a'b'c", "$(rm -rf /)", "tab\there", "new\nline", "ñandú"];
        for sample in samples {
            let parsed = shlex::split(&quote(sample)).unwrap();
            assert_eq!(parsed, vec![sample.to_string()], "round trip of {:?}", sample);
        }
    }

    #[test]
    fn test_join_preserves_count_and_order_when_resplit() {
        let args = ["printf", "%s\n", "", "two words", "it's", "a&b|c"];
        let parsed = shlex::split(&join(&args)).unwrap();
        assert_eq!(parsed, args);
    }
}
