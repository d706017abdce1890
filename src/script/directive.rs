/// One line of a benchmark driver script
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `compile <args...>` (also spelled `cc`)
    Compile(Vec<String>),
    /// `verify <args...>`
    Verify(Vec<String>),
    /// `expect --result <value>`
    Expect(String),
    /// `expect` with an option other than `--result <value>`
    BadExpect(String),
    /// Any other verb; carries the raw line
    Unknown(String),
    Blank,
}

impl Directive {
    pub fn parse(line: &str) -> Self {
        let mut tokens = line.split_whitespace();
        let Some(verb) = tokens.next() else {
            return Self::Blank;
        };
        let rest = || tokens.clone().map(str::to_string).collect::<Vec<_>>();

        match verb {
            "compile" | "cc" => Self::Compile(rest()),
            "verify" => Self::Verify(rest()),
            "expect" => {
                let args = rest();
                match args.as_slice() {
                    [option, value, ..] if option == "--result" => Self::Expect(value.clone()),
                    [option, ..] => Self::BadExpect(option.clone()),
                    [] => Self::BadExpect(String::new()),
                }
            }
            _ => Self::Unknown(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_verbs() {
        assert_eq!(
            Directive::parse("compile -O2  a.c\n"),
            Directive::Compile(strings(&["-O2", "a.c"]))
        );
        assert_eq!(
            Directive::parse("cc -o a.bc a.c"),
            Directive::Compile(strings(&["-o", "a.bc", "a.c"]))
        );
        assert_eq!(
            Directive::parse("verify --max-time 10 a.bc"),
            Directive::Verify(strings(&["--max-time", "10", "a.bc"]))
        );
        assert_eq!(Directive::parse("verify"), Directive::Verify(Vec::new()));
    }

    #[test]
    fn test_parse_expect() {
        assert_eq!(
            Directive::parse("expect --result error"),
            Directive::Expect("error".to_string())
        );
        assert_eq!(
            Directive::parse("expect --outcome error"),
            Directive::BadExpect("--outcome".to_string())
        );
        assert_eq!(
            Directive::parse("expect --result"),
            Directive::BadExpect("--result".to_string())
        );
        assert_eq!(Directive::parse("expect"), Directive::BadExpect(String::new()));
    }

    #[test]
    fn test_verbs_are_case_sensitive() {
        assert_eq!(
            Directive::parse("Verify a.bc\n"),
            Directive::Unknown("Verify a.bc".to_string())
        );
    }

    #[test]
    fn test_blank_lines() {
        assert_eq!(Directive::parse(""), Directive::Blank);
        assert_eq!(Directive::parse("   \t\n"), Directive::Blank);
    }
}
