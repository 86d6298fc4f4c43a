use tantivy::tokenizer::{Token, TokenStream, Tokenizer};

/// Name the tokenizer is registered under for the title and body fields
pub const NOTE_TOKENIZER: &str = "note";

/// Word tokenizer for note text. Latin-script words are split on anything that is
/// not alphanumeric and lowercased. Korean, Japanese and Chinese text has no spaces
/// between words, so each CJK character is a token and so is each adjacent pair.
#[derive(Clone, Default)]
pub struct NoteTokenizer;

impl Tokenizer for NoteTokenizer {
    type TokenStream<'a> = NoteTokenStream;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        NoteTokenStream {
            tokens: tokenize(text),
            index: 0,
            token: Token::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub text: String,
    pub offset_from: usize,
    pub offset_to: usize,
}

pub fn is_cjk_char(c: char) -> bool {
    let cp = c as u32;
    // CJK Unified Ideographs
    (0x4E00..=0x9FFF).contains(&cp)
    // Hangul Syllables
    || (0xAC00..=0xD7AF).contains(&cp)
    // Hangul Jamo
    || (0x1100..=0x11FF).contains(&cp)
    // Hangul Compatibility Jamo
    || (0x3130..=0x318F).contains(&cp)
    // Katakana
    || (0x30A0..=0x30FF).contains(&cp)
    // Hiragana
    || (0x3040..=0x309F).contains(&cp)
    // CJK Extension A
    || (0x3400..=0x4DBF).contains(&cp)
    // CJK Extension B
    || (0x20000..=0x2A6DF).contains(&cp)
}

pub fn tokenize(text: &str) -> Vec<TokenData> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, ch) = chars[i];

        if is_cjk_char(ch) {
            let end = start + ch.len_utf8();
            tokens.push(TokenData {
                text: text[start..end].to_lowercase(),
                offset_from: start,
                offset_to: end,
            });
            if let Some(&(next_start, next)) = chars.get(i + 1) {
                if is_cjk_char(next) {
                    let bigram_end = next_start + next.len_utf8();
                    tokens.push(TokenData {
                        text: text[start..bigram_end].to_lowercase(),
                        offset_from: start,
                        offset_to: bigram_end,
                    });
                }
            }
            i += 1;
        } else if ch.is_alphanumeric() {
            let mut end = start;
            while i < chars.len() && chars[i].1.is_alphanumeric() && !is_cjk_char(chars[i].1) {
                end = chars[i].0 + chars[i].1.len_utf8();
                i += 1;
            }
            tokens.push(TokenData {
                text: text[start..end].to_lowercase(),
                offset_from: start,
                offset_to: end,
            });
        } else {
            i += 1;
        }
    }

    tokens
}

pub struct NoteTokenStream {
    tokens: Vec<TokenData>,
    index: usize,
    token: Token,
}

impl TokenStream for NoteTokenStream {
    fn advance(&mut self) -> bool {
        if self.index < self.tokens.len() {
            let data = &self.tokens[self.index];
            self.token = Token {
                offset_from: data.offset_from,
                offset_to: data.offset_to,
                position: self.index,
                text: data.text.clone(),
                position_length: 1,
            };
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}
