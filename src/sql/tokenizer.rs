use super::error::Error;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Comma,
    SemiComma,
    RightPren,
    LeftPren,
    Star,
    Equals,
    Placeholder,
    String(String),
    Number(String),
    Ident(String),
    EOL,
}

impl Token {
    pub fn is_keyword(&self, keyword: &'static str) -> bool {
        match &self {
            Self::Ident(value) => value.eq_ignore_ascii_case(keyword),
            _ => false,
        }
    }

    pub fn is_token(&self, token: &Token) -> bool {
        self == token
    }

    pub fn get_identifer(&self) -> Option<String> {
        match self {
            Self::Ident(value) => Some(value.to_lowercase()),
            _ => None,
        }
    }
}

fn read_quoted(
    input: &mut std::iter::Peekable<std::str::Chars<'_>>,
    quote: char,
) -> Result<String, Error> {
    let mut value = String::default();
    loop {
        match input.next() {
            // a doubled quote is an escaped quote
            Some(c) if c == quote => {
                if input.peek() == Some(&quote) {
                    input.next();
                    value.push(quote);
                    continue;
                }
                return Ok(value);
            }
            Some(c) => value.push(c),
            None => return Err(Error::Systax("Unterminated string literal")),
        }
    }
}

fn read_number(first: char, input: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut value = String::default();
    value.push(first);

    let mut seen_period = false;
    while let Some(item) = input.peek() {
        match item {
            c if c.is_ascii_digit() => {}
            '.' if !seen_period => seen_period = true,
            _ => break,
        }

        if let Some(c) = input.next() {
            value.push(c);
        }
    }

    value
}

pub fn tokenizer(buffer: &str) -> Result<Vec<Token>, Error> {
    let mut input = buffer.chars().peekable();

    let mut tokens = vec![];
    while let Some(char) = input.next() {
        match char {
            e if e.is_control() => continue,
            e if e.is_whitespace() => continue,
            e if e.is_ascii_digit() => tokens.push(Token::Number(read_number(e, &mut input))),
            '-' if input.peek().is_some_and(|c| c.is_ascii_digit()) => {
                tokens.push(Token::Number(read_number(char, &mut input)))
            }
            'a'..='z' | 'A'..='Z' | '_' => {
                let mut value = String::default();

                value.push(char);

                while let Some(item) = input.peek() {
                    if !(item.is_alphanumeric() || item == &'_') {
                        break;
                    }
                    if let Some(c) = input.next() {
                        value.push(c);
                    }
                }

                tokens.push(Token::Ident(value));
            }
            '\'' | '\"' => tokens.push(Token::String(read_quoted(&mut input, char)?)),
            '(' => tokens.push(Token::LeftPren),
            ')' => tokens.push(Token::RightPren),
            '*' => tokens.push(Token::Star),
            '=' => tokens.push(Token::Equals),
            '?' => tokens.push(Token::Placeholder),
            ';' => tokens.push(Token::SemiComma),
            ',' => tokens.push(Token::Comma),
            _ => {
                return Err(Error::UnknownChar(format!(
                    "Unknown char: {}",
                    char.escape_debug()
                )))
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let input = "insert into users (user_id,name) values (1,'Al Dente');";

        let tokens = tokenizer(input).unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Ident("insert".into()),
                Token::Ident("into".into()),
                Token::Ident("users".into()),
                Token::LeftPren,
                Token::Ident("user_id".into()),
                Token::Comma,
                Token::Ident("name".into()),
                Token::RightPren,
                Token::Ident("values".into()),
                Token::LeftPren,
                Token::Number("1".into()),
                Token::Comma,
                Token::String("Al Dente".into()),
                Token::RightPren,
                Token::SemiComma,
            ]
        );
    }

    #[test]
    fn test_star_without_space() {
        let tokens = tokenizer("select *from users where user_id = ?;").unwrap();

        assert_eq!(tokens[1], Token::Star);
        assert_eq!(tokens[2], Token::Ident("from".into()));
        assert_eq!(tokens[6], Token::Equals);
        assert_eq!(tokens[7], Token::Placeholder);
    }

    #[test]
    fn test_escaped_quote_and_numbers() {
        let tokens = tokenizer("'it''s' -4 2.5").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::String("it's".into()),
                Token::Number("-4".into()),
                Token::Number("2.5".into()),
            ]
        );
    }

    #[test]
    fn test_unknown_char() {
        assert!(matches!(tokenizer("select #"), Err(Error::UnknownChar(_))));
        assert!(tokenizer("select 'open").is_err());
    }
}
