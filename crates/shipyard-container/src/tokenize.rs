use regex::Regex;
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]+"|'[^']+'|\S+"#).expect("token pattern is valid"));

/// コマンド文字列を引数に分割する
///
/// 空白区切り。シングル／ダブルクォートで囲まれた部分は一つの引数として扱い、
/// クォート自体は残す（シェルを介さずに docker run へ渡すため）。
pub fn tokenize_command(command: &str) -> Vec<String> {
    TOKEN
        .find_iter(command)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(tokenize_command("npm test"), vec!["npm", "test"]);
        assert_eq!(tokenize_command("npm run --foo"), vec!["npm", "run", "--foo"]);
    }

    #[test]
    fn test_single_quotes_kept() {
        assert_eq!(
            tokenize_command("foo 'bar' test"),
            vec!["foo", "'bar'", "test"]
        );
    }

    #[test]
    fn test_quoted_json() {
        assert_eq!(
            tokenize_command(r#"npm run --foo '{"foo":123}'"#),
            vec!["npm", "run", "--foo", r#"'{"foo":123}'"#]
        );
    }

    #[test]
    fn test_double_quoted_segment_with_spaces() {
        assert_eq!(
            tokenize_command(r#"pytest -k "not slow""#),
            vec!["pytest", "-k", r#""not slow""#]
        );
    }

    #[test]
    fn test_empty() {
        assert!(tokenize_command("   ").is_empty());
    }
}
