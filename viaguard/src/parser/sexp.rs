use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Unexpected token at position {0}: {1}")]
    UnexpectedToken(usize, String),
    #[error("Unterminated string starting at position {0}")]
    UnterminatedString(usize),
    #[error("Trailing content at position {0}")]
    TrailingContent(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExp::Atom(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExp]> {
        match self {
            SExp::List(items) => Some(items),
            _ => None,
        }
    }

    /// Head symbol of a list, e.g. `zone` for `(zone ...)`
    pub fn tag(&self) -> Option<&str> {
        self.as_list()
            .and_then(|items| items.first())
            .and_then(|first| first.as_atom())
    }

    /// First child list whose head is `key`
    pub fn find(&self, key: &str) -> Option<&SExp> {
        self.as_list()?
            .iter()
            .find(|item| item.tag() == Some(key))
    }

    /// Every child list whose head is `key`, in document order
    pub fn find_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SExp> + 'a {
        self.as_list()
            .unwrap_or(&[])
            .iter()
            .filter(move |item| item.tag() == Some(key))
    }

    /// Atom arguments after the head, e.g. `["F.Cu", "B.Cu"]` for `(layers F.Cu B.Cu)`
    pub fn args(&self) -> Vec<&str> {
        self.as_list()
            .map(|items| items.iter().skip(1).filter_map(|i| i.as_atom()).collect())
            .unwrap_or_default()
    }

    /// First atom argument of the child list `key`
    pub fn value(&self, key: &str) -> Option<&str> {
        self.find(key)
            .and_then(|child| child.as_list())
            .and_then(|items| items.get(1))
            .and_then(|v| v.as_atom())
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.value(key).and_then(|s| s.parse().ok())
    }

    pub fn int(&self, key: &str) -> Option<u32> {
        self.value(key).and_then(|s| s.parse().ok())
    }
}

pub struct SExpParser {
    input: Vec<char>,
    pos: usize,
}

impl SExpParser {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Parse exactly one expression; anything but whitespace after it is an error
    pub fn parse(&mut self) -> Result<SExp, ParseError> {
        let sexp = self.parse_sexp()?;
        self.skip_whitespace();
        if !self.is_eof() {
            return Err(ParseError::TrailingContent(self.pos));
        }
        Ok(sexp)
    }

    fn parse_sexp(&mut self) -> Result<SExp, ParseError> {
        self.skip_whitespace();

        match self.peek() {
            None => Err(ParseError::UnexpectedEof),
            Some('(') => self.parse_list(),
            Some(')') => Err(ParseError::UnexpectedToken(self.pos, ")".to_string())),
            Some('"') => self.parse_string(),
            Some(_) => self.parse_symbol(),
        }
    }

    fn parse_list(&mut self) -> Result<SExp, ParseError> {
        self.advance(); // '('
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();

            match self.peek() {
                None => return Err(ParseError::UnexpectedEof),
                Some(')') => {
                    self.advance();
                    break;
                }
                Some(_) => items.push(self.parse_sexp()?),
            }
        }

        Ok(SExp::List(items))
    }

    fn parse_string(&mut self) -> Result<SExp, ParseError> {
        let start = self.pos;
        self.advance(); // opening quote
        let mut s = String::new();

        while let Some(ch) = self.peek() {
            self.advance();
            match ch {
                '"' => return Ok(SExp::Atom(s)),
                '\\' => {
                    let escaped = self.peek().ok_or(ParseError::UnterminatedString(start))?;
                    self.advance();
                    s.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
                _ => s.push(ch),
            }
        }

        Err(ParseError::UnterminatedString(start))
    }

    fn parse_symbol(&mut self) -> Result<SExp, ParseError> {
        let mut s = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == '(' || ch == ')' || ch == '"' {
                break;
            }
            s.push(ch);
            self.advance();
        }

        Ok(SExp::Atom(s))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}
